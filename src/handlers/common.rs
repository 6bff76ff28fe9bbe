use crate::{entities::ProjectStatus, ApiResponse};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Query parameters for the project list
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectListQuery {
    /// Page number, starting at 1
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Page size, clamped to the configured maximum
    #[param(example = 20)]
    pub limit: Option<u64>,
    /// Only projects in this status
    pub status: Option<ProjectStatus>,
    /// Case-insensitive match on property or customer name
    pub search: Option<String>,
}

impl ProjectListQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Blank search terms are ignored.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
