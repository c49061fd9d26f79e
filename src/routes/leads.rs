//! Lead routes: CRUD, status transitions, and conversion.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::client::Client;
use crate::models::lead::{CreateLead, Lead, LeadStatus, LeadSummary, UpdateLead};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::lead::{self as lead_service, LeadFilters};
use crate::AppState;

/// GET /api/v1/leads — list the user's leads.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<LeadFilters>,
) -> Result<Json<ApiResponse<PagedResult<LeadSummary>>>, AppError> {
    let result = lead_service::list(&state.db, current_user.id, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/leads — create a new lead.
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateLead>,
) -> Result<Json<ApiResponse<Lead>>, AppError> {
    body.validate()?;
    let lead = lead_service::create(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(lead))
}

/// GET /api/v1/leads/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Lead>>, AppError> {
    let lead = lead_service::find_by_id(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success(lead))
}

/// PUT /api/v1/leads/:id
pub async fn update(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateLead>,
) -> Result<Json<ApiResponse<Lead>>, AppError> {
    body.validate()?;
    let lead = lead_service::update(&state.db, current_user.id, id, &body).await?;
    Ok(ApiResponse::success(lead))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: LeadStatus,
}

/// PATCH /api/v1/leads/:id/status — explicit status transition.
pub async fn update_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<ApiResponse<Lead>>, AppError> {
    let lead = lead_service::update_status(&state.db, current_user.id, id, body.status).await?;
    Ok(ApiResponse::success(lead))
}

/// POST /api/v1/leads/:id/convert — create a client from this lead.
pub async fn convert(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let client = lead_service::convert(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success(client))
}

/// DELETE /api/v1/leads/:id
pub async fn delete(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    lead_service::delete(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success("Lead deleted"))
}
