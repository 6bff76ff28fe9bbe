use crate::{
    errors::ServiceError,
    services::documents::{DocumentKind, CONTENT_TYPE},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// `estimate` (default) or `survey`
    #[serde(rename = "type")]
    #[param(example = "estimate")]
    pub kind: Option<String>,
}

impl ExportQuery {
    pub fn document_kind(&self) -> Result<DocumentKind, ServiceError> {
        match self.kind.as_deref() {
            None | Some("") => Ok(DocumentKind::Estimate),
            Some(kind) => kind.parse(),
        }
    }
}

/// Download the estimate or survey workbook
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/export",
    summary = "Export spreadsheet",
    description = "Returns an xlsx attachment. The filename is `<title>_<property name>.xlsx`, percent-encoded in `filename*`.",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ExportQuery
    ),
    responses(
        (status = 200, description = "Workbook bytes", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            headers(("Content-Disposition" = String, description = "attachment; filename*=UTF-8''..."))
        ),
        (status = 400, description = "Unknown export type", body = crate::errors::ErrorResponse),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Document generation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "Export"
)]
pub async fn export_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let kind = query.document_kind()?;
    let document = state.services.exports.export(id, kind).await?;

    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, document.content_disposition()),
        ],
        document.bytes,
    ))
}
