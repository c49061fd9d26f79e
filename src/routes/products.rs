//! Product catalog routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::product::{CreateProduct, Product, UpdateProduct};
use crate::services::product as product_service;
use crate::AppState;

/// GET /api/v1/products — list the catalog.
pub async fn list(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<PagedResult<Product>>>, AppError> {
    let result = product_service::list(&state.db, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/products — create a catalog product.
pub async fn create(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(body): Json<CreateProduct>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    body.validate()?;
    let product = product_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(product))
}

/// GET /api/v1/products/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(product))
}

/// PUT /api/v1/products/:id
pub async fn update(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProduct>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    body.validate()?;
    let product = product_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/v1/products/:id
pub async fn delete(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    product_service::delete(&state.db, id).await?;
    Ok(ApiResponse::success("Product deleted"))
}
