use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Site Survey API",
        version = "0.1.0",
        description = r#"
# Site Survey API

Project records for building-permit work: a municipal site survey per project,
estimate lines reconciled from a regional master catalog, and spreadsheet
export of the estimate (見積書) and survey (調査書).

## Envelopes

Successful JSON responses are wrapped as
`{ "success": true, "data": ..., "meta": { "request_id": ..., "timestamp": ... } }`.
Errors use:

```json
{
  "error": "Not Found",
  "message": "Not found: Project 550e8400-e29b-41d4-a716-446655440000 not found",
  "request_id": "req-abc123xyz",
  "timestamp": "2026-04-01T10:30:00Z"
}
```

## Pagination

`GET /api/v1/projects` accepts `page` (default 1) and `limit`
(default and maximum set by configuration).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Projects", description = "Project records"),
        (name = "Surveys", description = "Municipal site survey questionnaire"),
        (name = "Items", description = "Estimate lines, selection and catalog import"),
        (name = "Export", description = "Spreadsheet downloads"),
        (name = "Catalog", description = "Regions, municipalities and master items"),
        (name = "Dashboard", description = "Project statistics"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Projects
        crate::handlers::projects::list_projects,
        crate::handlers::projects::create_project,
        crate::handlers::projects::get_project,
        crate::handlers::projects::update_project,
        crate::handlers::projects::delete_project,

        // Survey
        crate::handlers::surveys::get_survey,
        crate::handlers::surveys::save_survey,

        // Items
        crate::handlers::items::list_items,
        crate::handlers::items::add_items,
        crate::handlers::items::update_item,
        crate::handlers::items::toggle_item,
        crate::handlers::items::import_items,
        crate::handlers::items::estimate,

        // Export
        crate::handlers::export::export_project,

        // Catalog
        crate::handlers::catalog::list_regions,
        crate::handlers::catalog::list_municipalities,
        crate::handlers::catalog::list_master_items,

        crate::handlers::dashboard::dashboard,

        crate::handlers::health::status,
        crate::handlers::health::health,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,
            crate::PaginatedResponse<serde_json::Value>,

            // Projects
            crate::entities::ProjectStatus,
            crate::services::projects::CreateProjectRequest,
            crate::services::projects::UpdateProjectRequest,
            crate::services::projects::ProjectResponse,
            crate::services::projects::ProjectDetailResponse,

            // Survey
            crate::services::surveys::SurveyFields,
            crate::services::surveys::SurveyResponse,

            // Items
            crate::services::project_items::ProjectItemResponse,
            crate::services::project_items::NewItemRequest,
            crate::services::project_items::AddItemsRequest,
            crate::services::project_items::UpdateItemRequest,
            crate::services::project_items::ItemListResponse,
            crate::services::project_items::ToggleResponse,
            crate::services::project_items::ImportOutcome,
            crate::services::project_items::FormattedTotals,
            crate::services::project_items::EstimatePreview,
            crate::services::aggregation::EstimateTotals,
            crate::services::aggregation::EstimateLine,
            crate::services::documents::DocumentKind,

            // Catalog
            crate::services::catalog::RegionResponse,
            crate::services::catalog::MunicipalityResponse,
            crate::services::catalog::MasterItemResponse,

            crate::services::dashboard::StatusCounts,
            crate::services::dashboard::DashboardStats,
            crate::handlers::health::ComponentStatus,
            crate::handlers::health::StatusResponse,
            crate::handlers::health::HealthResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
