//! Dashboard route: the aggregated analytics payload.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::services::dashboard::{self, DashboardData, DashboardFilters};
use crate::AppState;

/// GET /api/v1/dashboard — chart series and summary scalars for the
/// requesting user.
///
/// Accepts `period`, `data_filter`, `purchase_period` and
/// `purchase_product` query parameters; all optional, all tolerant of
/// unrecognized values.
pub async fn show(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filters): Query<DashboardFilters>,
) -> Result<Json<ApiResponse<DashboardData>>, AppError> {
    let data = dashboard::build(&state.db, current_user.id, &filters).await?;
    Ok(ApiResponse::success(data))
}
