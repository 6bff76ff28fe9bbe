use crate::{
    errors::ServiceError,
    services::catalog::{MasterItemResponse, MunicipalityResponse, RegionResponse},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MasterItemQuery {
    /// Region (prefecture) ID; required
    pub region_id: Option<i32>,
    /// Municipality name; whitespace is ignored when matching
    pub municipality: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/regions",
    summary = "List regions",
    responses(
        (status = 200, description = "Active regions ordered by code", body = ApiResponse<Vec<RegionResponse>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn list_regions(State(state): State<AppState>) -> ApiResult<Vec<RegionResponse>> {
    let regions = state.services.catalog.list_regions().await?;
    Ok(Json(ApiResponse::success(regions)))
}

#[utoipa::path(
    get,
    path = "/api/v1/regions/{id}/municipalities",
    summary = "List municipalities of a region",
    params(("id" = i32, Path, description = "Region ID")),
    responses(
        (status = 200, description = "Active municipalities ordered by name", body = ApiResponse<Vec<MunicipalityResponse>>),
        (status = 404, description = "Region not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn list_municipalities(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<MunicipalityResponse>> {
    let municipalities = state.services.catalog.list_municipalities(id).await?;
    Ok(Json(ApiResponse::success(municipalities)))
}

#[utoipa::path(
    get,
    path = "/api/v1/master-items",
    summary = "Look up master items",
    params(MasterItemQuery),
    responses(
        (status = 200, description = "Active master items ordered by sort order", body = ApiResponse<Vec<MasterItemResponse>>),
        (status = 400, description = "region_id missing", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn list_master_items(
    State(state): State<AppState>,
    Query(query): Query<MasterItemQuery>,
) -> ApiResult<Vec<MasterItemResponse>> {
    let region_id = query
        .region_id
        .ok_or_else(|| ServiceError::BadRequest("region_id is required".to_string()))?;

    let items = state
        .services
        .catalog
        .list_master_items(region_id, query.municipality.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(items)))
}
