//! Lead service: CRUD, status transitions, and conversion to client.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::client::Client;
use crate::models::lead::{CreateLead, Lead, LeadStatus, LeadSummary, UpdateLead};
use crate::models::pagination::{PagedResult, Pagination};

/// Filters for listing leads.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LeadFilters {
    pub status: Option<LeadStatus>,
    pub search: Option<String>,
}

/// Create a new lead owned by the requesting user.
pub async fn create(pool: &PgPool, user_id: Uuid, input: &CreateLead) -> Result<Lead, AppError> {
    let lead = sqlx::query_as::<_, Lead>(
        r#"
        INSERT INTO leads (first_name, last_name, company, email, phone, website,
            description, priority, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'Medium'), $9)
        RETURNING *
        "#,
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.company)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.website)
    .bind(&input.description)
    .bind(input.priority)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(lead)
}

/// Find a lead by ID, scoped to its owner.
pub async fn find_by_id(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Lead, AppError> {
    sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1 AND created_by = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))
}

/// List the user's leads with filters and pagination.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    filters: &LeadFilters,
    pagination: &Pagination,
) -> Result<PagedResult<LeadSummary>, AppError> {
    let mut conditions = vec!["created_by = $1".to_string()];
    let mut param_index = 1u32;

    if filters.status.is_some() {
        param_index += 1;
        conditions.push(format!("status = ${param_index}"));
    }
    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(first_name ILIKE ${param_index} OR last_name ILIKE ${param_index} OR company ILIKE ${param_index})"
        ));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));
    let count_sql = format!("SELECT COUNT(*) FROM leads {where_clause}");
    let data_sql = format!(
        "SELECT id, first_name, last_name, company, status, priority, created_at \
         FROM leads {where_clause} ORDER BY created_at DESC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
    let mut data_query = sqlx::query_as::<_, LeadSummary>(&data_sql).bind(user_id);

    if let Some(status) = filters.status {
        count_query = count_query.bind(status);
        data_query = data_query.bind(status);
    }
    if let Some(ref search) = filters.search {
        let pattern = format!("%{search}%");
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Update a lead's contact fields. Status is changed only via
/// [`update_status`].
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &UpdateLead,
) -> Result<Lead, AppError> {
    let existing = find_by_id(pool, user_id, id).await?;

    let lead = sqlx::query_as::<_, Lead>(
        r#"
        UPDATE leads SET
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            company = COALESCE($5, company),
            email = COALESCE($6, email),
            phone = COALESCE($7, phone),
            website = COALESCE($8, website),
            description = COALESCE($9, description),
            priority = COALESCE($10, priority),
            modified_at = NOW()
        WHERE id = $1 AND created_by = $2
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(user_id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.company)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.website)
    .bind(&input.description)
    .bind(input.priority)
    .fetch_one(pool)
    .await?;

    Ok(lead)
}

/// Explicit status transition.
pub async fn update_status(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    status: LeadStatus,
) -> Result<Lead, AppError> {
    sqlx::query_as::<_, Lead>(
        r#"
        UPDATE leads SET status = $3, modified_at = NOW()
        WHERE id = $1 AND created_by = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(status)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))
}

/// Delete a lead.
pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM leads WHERE id = $1 AND created_by = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Lead not found".to_string()));
    }
    Ok(())
}

/// Convert a lead into a client.
///
/// Carries the lead's contact fields onto a new client, links the
/// client back via `converted_from_lead`, and marks the lead Won —
/// one transaction so a half-converted lead can't be observed.
pub async fn convert(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Client, AppError> {
    let mut tx = pool.begin().await?;

    let lead = sqlx::query_as::<_, Lead>(
        "SELECT * FROM leads WHERE id = $1 AND created_by = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    let already_converted = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM clients WHERE converted_from_lead = $1)",
    )
    .bind(lead.id)
    .fetch_one(&mut *tx)
    .await?;
    if already_converted {
        return Err(AppError::Conflict("Lead already converted".to_string()));
    }

    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (first_name, last_name, company, email, phone, website,
            description, converted_from_lead, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&lead.first_name)
    .bind(&lead.last_name)
    .bind(&lead.company)
    .bind(&lead.email)
    .bind(&lead.phone)
    .bind(&lead.website)
    .bind(&lead.description)
    .bind(lead.id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE leads SET status = 'Won', modified_at = NOW() WHERE id = $1")
        .bind(lead.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(client)
}
