use super::common::{created_response, ProjectListQuery};
use crate::{
    errors::ServiceError,
    services::projects::{
        CreateProjectRequest, ProjectDetailResponse, ProjectFilter, ProjectResponse,
        UpdateProjectRequest,
    },
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// List projects, newest first
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    summary = "List projects",
    description = "Paginated project list ordered by creation time (newest first). Optional status filter and case-insensitive search on property and customer names.",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "Projects returned", body = ApiResponse<PaginatedResponse<ProjectResponse>>,
            headers(("X-Request-Id" = String, description = "Unique request id for tracing"))
        ),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<PaginatedResponse<ProjectResponse>> {
    let limit = state.config.clamp_page_size(query.limit);
    let filter = ProjectFilter {
        status: query.status,
        search: query.search_term(),
    };

    let page = state
        .services
        .projects
        .list_projects(filter, query.page(), limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        page.projects,
        page.total,
        page.page,
        page.limit,
    ))))
}

/// Create a project in `draft` status
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    summary = "Create project",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ApiResponse<ProjectResponse>),
        (status = 400, description = "Property name missing or blank", body = crate::errors::ErrorResponse),
        (status = 409, description = "Project number already in use", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let project = state.services.projects.create_project(payload).await?;
    Ok(created_response(project))
}

/// Project with region, items and totals
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    summary = "Get project",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project returned", body = ApiResponse<ProjectDetailResponse>),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProjectDetailResponse> {
    let detail = state.services.projects.get_project_detail(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    summary = "Update project",
    description = "Only supplied fields change. A blank string clears an optional text field; null clears the region, measurements or estimate date.",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ApiResponse<ProjectResponse>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Project number already in use", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<ProjectResponse> {
    let project = state.services.projects.update_project(id, payload).await?;
    Ok(Json(ApiResponse::success(project)))
}

/// Delete a project together with its survey and items
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    summary = "Delete project",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.projects.delete_project(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
