use super::common::created_response;
use crate::{
    errors::ServiceError,
    services::project_items::{
        AddItemsRequest, EstimatePreview, ImportOutcome, ItemListResponse, ProjectItemResponse,
        ToggleResponse, UpdateItemRequest,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// Items in display order with live totals
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/items",
    summary = "List project items",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Items and totals", body = ApiResponse<ItemListResponse>),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ItemListResponse> {
    let items = state.services.items.list_items(id).await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/items",
    summary = "Add items",
    description = "Accepts a single item or an array. Lines go after the existing ones unless a sort order is given.",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = AddItemsRequest,
    responses(
        (status = 201, description = "Items created", body = ApiResponse<Vec<ProjectItemResponse>>),
        (status = 400, description = "Empty list or missing description", body = crate::errors::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Master item already on the project", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn add_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddItemsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .items
        .add_items(id, payload.into_vec())
        .await?;
    Ok(created_response(created))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/items/{item_id}",
    summary = "Update item",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<ProjectItemResponse>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found in project", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateItemRequest>,
) -> ApiResult<ProjectItemResponse> {
    let item = state
        .services
        .items
        .update_item(id, item_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Flip the item's selection flag
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/items/{item_id}/toggle",
    summary = "Toggle item selection",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item and recomputed totals", body = ApiResponse<ToggleResponse>),
        (status = 404, description = "Item not found in project", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn toggle_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<ToggleResponse> {
    let toggled = state.services.items.toggle_item(id, item_id).await?;
    Ok(Json(ApiResponse::success(toggled)))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/items/import",
    summary = "Import master items",
    description = "Adds every active master item for the project's region and municipality that is not already on the project. Repeating the call adds nothing.",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Import outcome with the full item list", body = ApiResponse<ImportOutcome>),
        (status = 400, description = "Project has no region or municipality", body = crate::errors::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn import_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ImportOutcome> {
    let outcome = state.services.items.import_master_items(id).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// Selected lines with amounts and formatted totals
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/estimate",
    summary = "Estimate preview",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Estimate preview", body = ApiResponse<EstimatePreview>),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Items"
)]
pub async fn estimate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<EstimatePreview> {
    let preview = state.services.items.estimate(id).await?;
    Ok(Json(ApiResponse::success(preview)))
}
