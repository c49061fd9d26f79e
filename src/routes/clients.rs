//! Client routes: CRUD and purchase history.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::client::{Client, ClientSummary, CreateClient, UpdateClient};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::purchase::PurchaseDetail;
use crate::services::client::{self as client_service, ClientFilters};
use crate::AppState;

/// GET /api/v1/clients — list the user's clients.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ClientFilters>,
) -> Result<Json<ApiResponse<PagedResult<ClientSummary>>>, AppError> {
    let result = client_service::list(&state.db, current_user.id, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/clients — create a new client.
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateClient>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    body.validate()?;
    let client = client_service::create(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(client))
}

/// GET /api/v1/clients/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let client = client_service::find_by_id(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success(client))
}

/// PUT /api/v1/clients/:id
pub async fn update(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClient>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    body.validate()?;
    let client = client_service::update(&state.db, current_user.id, id, &body).await?;
    Ok(ApiResponse::success(client))
}

/// DELETE /api/v1/clients/:id
pub async fn delete(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    client_service::delete(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success("Client deleted"))
}

/// GET /api/v1/clients/:id/purchases — purchase history with derived prices.
pub async fn list_purchases(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PurchaseDetail>>>, AppError> {
    let purchases = client_service::list_purchases(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success(purchases))
}
