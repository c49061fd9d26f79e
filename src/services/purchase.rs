//! Purchase service: transactional create/delete with the product's
//! running sold-quantity counter.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::purchase::{CreatePurchase, Purchase, PurchaseDetail};

/// Filters for listing purchases.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PurchaseFilters {
    pub product_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

/// Record a purchase and bump the product's sold-quantity counter.
///
/// The counter update is an atomic in-place increment inside the same
/// transaction as the INSERT; two concurrent purchases of one product
/// cannot lose an update.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    input: &CreatePurchase,
) -> Result<Purchase, AppError> {
    let mut tx = pool.begin().await?;

    // The client must belong to the requesting user; the product is
    // shared catalog.
    let client_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1 AND created_by = $2)",
    )
    .bind(input.client_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;
    if !client_exists {
        return Err(AppError::NotFound("Client not found".to_string()));
    }

    let purchase = sqlx::query_as::<_, Purchase>(
        r#"
        INSERT INTO purchases (client_id, product_id, quantity, notes, created_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(input.client_id)
    .bind(input.product_id)
    .bind(input.quantity)
    .bind(&input.notes)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound("Product not found".to_string())
        }
        _ => AppError::Database(e),
    })?;

    sqlx::query("UPDATE products SET sold_quantity = sold_quantity + $1 WHERE id = $2")
        .bind(input.quantity)
        .bind(input.product_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(purchase)
}

/// Delete a purchase, reversing the sold-quantity increment.
pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query_as::<_, Purchase>(
        "DELETE FROM purchases WHERE id = $1 AND created_by = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Purchase not found".to_string()))?;

    sqlx::query("UPDATE products SET sold_quantity = sold_quantity - $1 WHERE id = $2")
        .bind(deleted.quantity)
        .bind(deleted.product_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// List the user's purchases with derived prices.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    filters: &PurchaseFilters,
    pagination: &Pagination,
) -> Result<PagedResult<PurchaseDetail>, AppError> {
    let mut conditions = vec!["pu.created_by = $1".to_string()];
    let mut param_index = 1u32;

    if filters.product_id.is_some() {
        param_index += 1;
        conditions.push(format!("pu.product_id = ${param_index}"));
    }
    if filters.client_id.is_some() {
        param_index += 1;
        conditions.push(format!("pu.client_id = ${param_index}"));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));
    let count_sql = format!("SELECT COUNT(*) FROM purchases pu {where_clause}");
    let data_sql = format!(
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
        {where_clause}
        ORDER BY pu.created_at DESC
        LIMIT {} OFFSET {}
        "#,
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
    let mut data_query = sqlx::query_as::<_, PurchaseDetail>(&data_sql).bind(user_id);

    if let Some(product_id) = filters.product_id {
        count_query = count_query.bind(product_id);
        data_query = data_query.bind(product_id);
    }
    if let Some(client_id) = filters.client_id {
        count_query = count_query.bind(client_id);
        data_query = data_query.bind(client_id);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, pagination))
}
