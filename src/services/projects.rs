use crate::{
    db::DbPool,
    entities::{project, project_item, project_survey, region, ProjectStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::aggregation::{compute_totals, EstimateTotals},
    services::catalog::RegionResponse,
    services::project_items::{load_items, ProjectItemResponse},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn duplicate_project_number(number: &Option<String>) -> String {
    format!(
        "Project number {} is already in use",
        number.as_deref().unwrap_or_default()
    )
}

/// Blank strings are stored as NULL.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProjectRequest {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "山田様邸新築工事")]
    pub property_name: String,
    pub project_number: Option<String>,
    pub region_id: Option<i32>,
    #[schema(example = "大阪市")]
    pub municipality: Option<String>,
    pub lot_number: Option<String>,
    pub address_display: Option<String>,
    #[schema(value_type = Option<String>, example = "150.25")]
    pub site_area: Option<Decimal>,
    pub building_scale: Option<String>,
    pub city_planning_zone: Option<String>,
    pub fire_prevention: Option<String>,
    pub zoning: Option<String>,
    pub height_district: Option<String>,
    #[schema(value_type = Option<String>, example = "60")]
    pub building_coverage: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "200")]
    pub floor_area_ratio: Option<Decimal>,
    pub customer_name: Option<String>,
    pub estimate_number: Option<String>,
    pub estimate_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Marks a supplied key as `Some`, keeping an explicit `null` apart from an
/// absent one.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Only supplied fields change. A blank string clears an optional text field;
/// `null` clears a region, measurement or date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectRequest {
    #[validate(custom = "validate_not_blank")]
    pub property_name: Option<String>,
    pub project_number: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub region_id: Option<Option<i32>>,
    pub municipality: Option<String>,
    pub lot_number: Option<String>,
    pub address_display: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub site_area: Option<Option<Decimal>>,
    pub building_scale: Option<String>,
    pub city_planning_zone: Option<String>,
    pub fire_prevention: Option<String>,
    pub zoning: Option<String>,
    pub height_district: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub building_coverage: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub floor_area_ratio: Option<Option<Decimal>>,
    pub customer_name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub estimate_number: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<NaiveDate>)]
    pub estimate_date: Option<Option<NaiveDate>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub project_number: Option<String>,
    pub property_name: String,
    pub region_id: Option<i32>,
    pub municipality: Option<String>,
    pub lot_number: Option<String>,
    pub address_display: Option<String>,
    #[schema(value_type = Option<String>)]
    pub site_area: Option<Decimal>,
    pub building_scale: Option<String>,
    pub city_planning_zone: Option<String>,
    pub fire_prevention: Option<String>,
    pub zoning: Option<String>,
    pub height_district: Option<String>,
    #[schema(value_type = Option<String>)]
    pub building_coverage: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub floor_area_ratio: Option<Decimal>,
    pub customer_name: Option<String>,
    pub status: ProjectStatus,
    pub estimate_number: Option<String>,
    pub estimate_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<project::Model> for ProjectResponse {
    fn from(model: project::Model) -> Self {
        Self {
            id: model.id,
            project_number: model.project_number,
            property_name: model.property_name,
            region_id: model.region_id,
            municipality: model.municipality,
            lot_number: model.lot_number,
            address_display: model.address_display,
            site_area: model.site_area,
            building_scale: model.building_scale,
            city_planning_zone: model.city_planning_zone,
            fire_prevention: model.fire_prevention,
            zoning: model.zoning,
            height_district: model.height_district,
            building_coverage: model.building_coverage,
            floor_area_ratio: model.floor_area_ratio,
            customer_name: model.customer_name,
            status: model.status,
            estimate_number: model.estimate_number,
            estimate_date: model.estimate_date,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Project with its region, ordered lines and live totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub region: Option<RegionResponse>,
    pub items: Vec<ProjectItemResponse>,
    pub totals: EstimateTotals,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectPage {
    pub projects: Vec<ProjectResponse>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Loads a project or fails with `NotFound`.
pub async fn find_project<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
) -> Result<project::Model, ServiceError> {
    project::Entity::find_by_id(project_id)
        .one(db)
        .await
        .map_err(|e| {
            error!(error = %e, project_id = %project_id, "Failed to fetch project");
            ServiceError::DatabaseError(e)
        })?
        .ok_or_else(|| {
            warn!(project_id = %project_id, "Project not found");
            ServiceError::NotFound(format!("Project {} not found", project_id))
        })
}

fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", term.to_lowercase());
    Condition::any()
        .add(Expr::expr(Func::lower(Expr::col(project::Column::PropertyName))).like(pattern.clone()))
        .add(Expr::expr(Func::lower(Expr::col(project::Column::CustomerName))).like(pattern))
}

#[derive(Clone)]
pub struct ProjectService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProjectService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send project event");
            }
        }
    }

    /// Creates a project in `draft` status.
    #[instrument(skip(self, request), fields(property_name = %request.property_name))]
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> Result<ProjectResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let project_id = Uuid::new_v4();
        let project_number = non_blank(request.project_number);
        let active = project::ActiveModel {
            id: Set(project_id),
            project_number: Set(project_number.clone()),
            property_name: Set(request.property_name),
            region_id: Set(request.region_id),
            municipality: Set(non_blank(request.municipality)),
            lot_number: Set(non_blank(request.lot_number)),
            address_display: Set(non_blank(request.address_display)),
            site_area: Set(request.site_area),
            building_scale: Set(non_blank(request.building_scale)),
            city_planning_zone: Set(non_blank(request.city_planning_zone)),
            fire_prevention: Set(non_blank(request.fire_prevention)),
            zoning: Set(non_blank(request.zoning)),
            height_district: Set(non_blank(request.height_district)),
            building_coverage: Set(request.building_coverage),
            floor_area_ratio: Set(request.floor_area_ratio),
            customer_name: Set(non_blank(request.customer_name)),
            status: Set(ProjectStatus::Draft),
            estimate_number: Set(non_blank(request.estimate_number)),
            estimate_date: Set(request.estimate_date),
            notes: Set(non_blank(request.notes)),
            ..Default::default()
        };

        let model = active.insert(db).await.map_err(|e| {
            error!(error = %e, project_id = %project_id, "Failed to create project");
            ServiceError::from_write(e, || duplicate_project_number(&project_number))
        })?;

        info!(project_id = %project_id, "Project created");
        self.emit(Event::ProjectCreated(project_id)).await;
        Ok(model.into())
    }

    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn get_project(&self, project_id: Uuid) -> Result<project::Model, ServiceError> {
        find_project(&*self.db_pool, project_id).await
    }

    /// Project plus region, ordered items and totals.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn get_project_detail(
        &self,
        project_id: Uuid,
    ) -> Result<ProjectDetailResponse, ServiceError> {
        let db = &*self.db_pool;
        let project = find_project(db, project_id).await?;

        let region = match project.region_id {
            Some(region_id) => region::Entity::find_by_id(region_id)
                .one(db)
                .await
                .map_err(|e| {
                    error!(error = %e, region_id, "Failed to fetch project region");
                    ServiceError::DatabaseError(e)
                })?
                .map(RegionResponse::from),
            None => None,
        };

        let items = load_items(db, project_id).await?;
        let totals = compute_totals(&items);

        Ok(ProjectDetailResponse {
            project: project.into(),
            region,
            items: items.into_iter().map(ProjectItemResponse::from).collect(),
            totals,
        })
    }

    /// Newest first. `page` is 1-based.
    #[instrument(skip(self))]
    pub async fn list_projects(
        &self,
        filter: ProjectFilter,
        page: u64,
        limit: u64,
    ) -> Result<ProjectPage, ServiceError> {
        let db = &*self.db_pool;
        let page = page.max(1);
        let limit = limit.max(1);

        let mut query = project::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(project::Column::Status.eq(status));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(search_condition(term));
        }

        let paginator = query
            .order_by_desc(project::Column::CreatedAt)
            .order_by_desc(project::Column::Id)
            .paginate(db, limit);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count projects");
            ServiceError::DatabaseError(e)
        })?;
        let projects = paginator.fetch_page(page - 1).await.map_err(|e| {
            error!(error = %e, page, limit, "Failed to fetch projects page");
            ServiceError::DatabaseError(e)
        })?;

        Ok(ProjectPage {
            projects: projects.into_iter().map(ProjectResponse::from).collect(),
            total,
            page,
            limit,
        })
    }

    #[instrument(skip(self, request), fields(project_id = %project_id))]
    pub async fn update_project(
        &self,
        project_id: Uuid,
        request: UpdateProjectRequest,
    ) -> Result<ProjectResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = find_project(db, project_id).await?;
        let mut active: project::ActiveModel = existing.into();

        if let Some(name) = request.property_name {
            active.property_name = Set(name);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(region_id) = request.region_id {
            active.region_id = Set(region_id);
        }
        if let Some(area) = request.site_area {
            active.site_area = Set(area);
        }
        if let Some(coverage) = request.building_coverage {
            active.building_coverage = Set(coverage);
        }
        if let Some(ratio) = request.floor_area_ratio {
            active.floor_area_ratio = Set(ratio);
        }
        if let Some(date) = request.estimate_date {
            active.estimate_date = Set(date);
        }

        let text_fields = [
            (request.project_number, &mut active.project_number),
            (request.municipality, &mut active.municipality),
            (request.lot_number, &mut active.lot_number),
            (request.address_display, &mut active.address_display),
            (request.building_scale, &mut active.building_scale),
            (request.city_planning_zone, &mut active.city_planning_zone),
            (request.fire_prevention, &mut active.fire_prevention),
            (request.zoning, &mut active.zoning),
            (request.height_district, &mut active.height_district),
            (request.customer_name, &mut active.customer_name),
            (request.estimate_number, &mut active.estimate_number),
            (request.notes, &mut active.notes),
        ];
        for (value, slot) in text_fields {
            if let Some(value) = value {
                *slot = Set(non_blank(Some(value)));
            }
        }

        let project_number = active.project_number.clone().take().flatten();
        let model = active.update(db).await.map_err(|e| {
            error!(error = %e, project_id = %project_id, "Failed to update project");
            ServiceError::from_write(e, || duplicate_project_number(&project_number))
        })?;

        info!(project_id = %project_id, status = %model.status, "Project updated");
        self.emit(Event::ProjectUpdated(project_id)).await;
        Ok(model.into())
    }

    /// Removes the project together with its survey and items.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn delete_project(&self, project_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for project deletion");
            ServiceError::DatabaseError(e)
        })?;

        find_project(&txn, project_id).await?;

        project_item::Entity::delete_many()
            .filter(project_item::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, project_id = %project_id, "Failed to delete project items");
                ServiceError::DatabaseError(e)
            })?;
        project_survey::Entity::delete_many()
            .filter(project_survey::Column::ProjectId.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, project_id = %project_id, "Failed to delete project survey");
                ServiceError::DatabaseError(e)
            })?;
        project::Entity::delete_by_id(project_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, project_id = %project_id, "Failed to delete project");
                ServiceError::DatabaseError(e)
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, project_id = %project_id, "Failed to commit project deletion");
            ServiceError::DatabaseError(e)
        })?;

        info!(project_id = %project_id, "Project deleted");
        self.emit(Event::ProjectDeleted(project_id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::documents::fixtures::project;
    use assert_matches::assert_matches;

    #[test]
    fn blank_names_fail_validation() {
        let request = CreateProjectRequest {
            property_name: "  ".into(),
            ..Default::default()
        };
        assert!(request.validate().is_err());

        let patch = UpdateProjectRequest {
            property_name: Some(String::new()),
            ..Default::default()
        };
        assert_matches!(
            patch.validate().map_err(ServiceError::from),
            Err(ServiceError::ValidationError(_))
        );

        assert!(UpdateProjectRequest::default().validate().is_ok());
    }

    #[test]
    fn patch_tells_null_apart_from_absent() {
        let patch: UpdateProjectRequest = serde_json::from_value(serde_json::json!({
            "region_id": null,
            "site_area": "120.5",
            "estimate_date": "2024-04-01"
        }))
        .unwrap();
        assert_eq!(patch.region_id, Some(None));
        assert_eq!(patch.site_area, Some(Some(Decimal::new(1205, 1))));
        assert_eq!(patch.estimate_date, NaiveDate::from_ymd_opt(2024, 4, 1).map(Some));
        assert_eq!(patch.building_coverage, None);
        assert_eq!(patch.floor_area_ratio, None);
    }

    #[test]
    fn blank_optionals_become_null() {
        assert_eq!(non_blank(Some(" ".into())), None);
        assert_eq!(non_blank(Some("地番".into())), Some("地番".to_string()));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn response_copies_every_field() {
        let model = project("テスト邸");
        let response = ProjectResponse::from(model.clone());
        assert_eq!(response.id, model.id);
        assert_eq!(response.customer_name, model.customer_name);
        assert_eq!(response.status, ProjectStatus::Draft);
        assert_eq!(response.estimate_number.as_deref(), Some("E-0001"));
    }

    #[tokio::test]
    async fn service_builds_without_events() {
        let db = Arc::new(sea_orm::DatabaseConnection::Disconnected);
        let service = ProjectService::new(db, None);
        let result = service
            .create_project(CreateProjectRequest::default())
            .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }
}
