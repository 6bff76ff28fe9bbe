use crate::{
    errors::ServiceError,
    services::surveys::{SurveyFields, SurveyResponse},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// The project's survey, or `null` data when none has been saved
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/survey",
    summary = "Get survey",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Survey returned; data is null when the project has none", body = ApiResponse<SurveyResponse>),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Surveys"
)]
pub async fn get_survey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Option<SurveyResponse>> {
    let survey = state.services.surveys.get_survey(id).await?;
    Ok(Json(ApiResponse::success(survey)))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/survey",
    summary = "Save survey",
    description = "Replaces the questionnaire; fields left out are cleared. Creates the survey on first save.",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = SurveyFields,
    responses(
        (status = 201, description = "Survey created", body = ApiResponse<SurveyResponse>),
        (status = 200, description = "Survey replaced", body = ApiResponse<SurveyResponse>),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "Surveys"
)]
pub async fn save_survey(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SurveyFields>,
) -> Result<impl IntoResponse, ServiceError> {
    let saved = state.services.surveys.save_survey(id, payload).await?;
    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::success(saved.survey))))
}
