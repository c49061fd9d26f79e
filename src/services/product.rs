//! Product catalog service.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::product::{CreateProduct, Product, UpdateProduct};

/// Create a new catalog product.
pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, AppError> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, net_price, description)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(input.net_price)
    .bind(&input.description)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

/// Find a product by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Product, AppError> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// List the catalog, newest first.
pub async fn list(
    pool: &PgPool,
    pagination: &Pagination,
) -> Result<PagedResult<Product>, AppError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Product>(
        "SELECT * FROM products ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Update a product by ID.
///
/// Changing `net_price` retroactively changes the displayed totals of
/// past purchases; prices are never snapshotted at purchase time.
pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateProduct) -> Result<Product, AppError> {
    let existing = find_by_id(pool, id).await?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products SET
            name = COALESCE($2, name),
            net_price = COALESCE($3, net_price),
            description = COALESCE($4, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(&input.name)
    .bind(input.net_price)
    .bind(&input.description)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

/// Delete a product (purchases cascade).
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    Ok(())
}
