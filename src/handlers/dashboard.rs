use crate::{services::dashboard::DashboardStats, ApiResponse, ApiResult, AppState};
use axum::{extract::State, Json};

/// Project counts per status and the most recent projects
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    summary = "Dashboard statistics",
    responses(
        (status = 200, description = "Statistics", body = ApiResponse<DashboardStats>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let stats = state.services.dashboard.stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}
