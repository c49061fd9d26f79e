//! Client service: CRUD and per-client purchase history.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::client::{Client, ClientSummary, CreateClient, UpdateClient};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::purchase::PurchaseDetail;

/// Filters for listing clients.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClientFilters {
    pub search: Option<String>,
}

/// Create a new client owned by the requesting user.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    input: &CreateClient,
) -> Result<Client, AppError> {
    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (first_name, last_name, company, email, phone, address,
            city, zipcode, country, website, description, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.company)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.address)
    .bind(&input.city)
    .bind(&input.zipcode)
    .bind(&input.country)
    .bind(&input.website)
    .bind(&input.description)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(client)
}

/// Find a client by ID, scoped to its owner.
pub async fn find_by_id(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<Client, AppError> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1 AND created_by = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
}

/// List the user's clients with search and pagination.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    filters: &ClientFilters,
    pagination: &Pagination,
) -> Result<PagedResult<ClientSummary>, AppError> {
    let mut conditions = vec!["created_by = $1".to_string()];
    let mut param_index = 1u32;

    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(first_name ILIKE ${param_index} OR last_name ILIKE ${param_index} OR company ILIKE ${param_index})"
        ));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));
    let count_sql = format!("SELECT COUNT(*) FROM clients {where_clause}");
    let data_sql = format!(
        "SELECT id, first_name, last_name, company, converted_from_lead, created_at \
         FROM clients {where_clause} ORDER BY created_at DESC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
    let mut data_query = sqlx::query_as::<_, ClientSummary>(&data_sql).bind(user_id);

    if let Some(ref search) = filters.search {
        let pattern = format!("%{search}%");
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Update a client by ID.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &UpdateClient,
) -> Result<Client, AppError> {
    let existing = find_by_id(pool, user_id, id).await?;

    let client = sqlx::query_as::<_, Client>(
        r#"
        UPDATE clients SET
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            company = COALESCE($5, company),
            email = COALESCE($6, email),
            phone = COALESCE($7, phone),
            address = COALESCE($8, address),
            city = COALESCE($9, city),
            zipcode = COALESCE($10, zipcode),
            country = COALESCE($11, country),
            website = COALESCE($12, website),
            description = COALESCE($13, description),
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
    .bind(&input.address)
    .bind(&input.city)
    .bind(&input.zipcode)
    .bind(&input.country)
    .bind(&input.website)
    .bind(&input.description)
    .fetch_one(pool)
    .await?;

    Ok(client)
}

/// Delete a client (purchases cascade).
pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND created_by = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Client not found".to_string()));
    }
    Ok(())
}

/// List a client's purchases with prices derived from the product's
/// current net price.
pub async fn list_purchases(
    pool: &PgPool,
    user_id: Uuid,
    client_id: Uuid,
) -> Result<Vec<PurchaseDetail>, AppError> {
    // 404 for a client the user doesn't own
    find_by_id(pool, user_id, client_id).await?;

    let rows = sqlx::query_as::<_, PurchaseDetail>(
        r#"
        SELECT
            pu.id,
            pu.client_id,
            pu.product_id,
            pr.name AS product_name,
            pu.quantity,
            pr.net_price AS unit_price,
            pu.quantity * pr.net_price AS line_total,
            pu.notes,
            pu.created_at
        FROM purchases pu
        JOIN products pr ON pr.id = pu.product_id
        WHERE pu.client_id = $1
        ORDER BY pu.created_at DESC
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
