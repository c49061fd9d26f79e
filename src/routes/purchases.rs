//! Purchase routes: recording and reversing sales.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::purchase::{CreatePurchase, Purchase, PurchaseDetail};
use crate::services::purchase::{self as purchase_service, PurchaseFilters};
use crate::AppState;

/// GET /api/v1/purchases — list the user's purchases.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<PurchaseFilters>,
) -> Result<Json<ApiResponse<PagedResult<PurchaseDetail>>>, AppError> {
    let result = purchase_service::list(&state.db, current_user.id, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/purchases — record a purchase (bumps sold_quantity).
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreatePurchase>,
) -> Result<Json<ApiResponse<Purchase>>, AppError> {
    body.validate()?;
    let purchase = purchase_service::create(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(purchase))
}

/// DELETE /api/v1/purchases/:id — delete a purchase (reverses sold_quantity).
pub async fn delete(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    purchase_service::delete(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success("Purchase deleted"))
}
