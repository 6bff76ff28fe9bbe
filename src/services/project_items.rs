use crate::{
    db::DbPool,
    entities::project_item,
    errors::ServiceError,
    events::{Event, EventSender},
    services::aggregation::{compute_totals, estimate_lines, EstimateLine, EstimateTotals},
    services::catalog::find_master_items,
    services::pricing::{format_currency, format_rate, line_amount, parse_amount},
    services::projects::find_project,
    services::reconciliation::{build_import_records, missing_master_items, sort_order_at},
};
use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, TryInsertResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const DEFAULT_UNIT: &str = "式";
pub const DEFAULT_QUANTITY: &str = "1";

fn validate_description(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("description_required"));
    }
    Ok(())
}

/// Quantities are kept as text; numbers are written in their JSON form.
fn quantity_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectItemResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub source_item_id: Option<i32>,
    pub description: String,
    pub quantity: String,
    pub unit: String,
    pub cost_price: i64,
    pub selling_price: i64,
    /// `selling_price × quantity`, whole yen
    pub amount: i64,
    pub is_selected: bool,
    pub sort_order: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<project_item::Model> for ProjectItemResponse {
    fn from(model: project_item::Model) -> Self {
        Self {
            amount: line_amount(model.selling_price, &model.quantity),
            id: model.id,
            project_id: model.project_id,
            source_item_id: model.source_item_id,
            description: model.description,
            quantity: model.quantity,
            unit: model.unit,
            cost_price: model.cost_price,
            selling_price: model.selling_price,
            is_selected: model.is_selected,
            sort_order: model.sort_order,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// New line. Prices and quantity accept numbers or numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewItemRequest {
    #[serde(default)]
    #[validate(custom = "validate_description")]
    pub description: String,
    pub source_item_id: Option<i32>,
    #[schema(value_type = Option<String>, example = "1")]
    pub quantity: Option<Value>,
    #[schema(example = "式")]
    pub unit: Option<String>,
    #[schema(value_type = Option<i64>)]
    pub cost_price: Option<Value>,
    #[schema(value_type = Option<i64>)]
    pub selling_price: Option<Value>,
    pub is_selected: Option<bool>,
    pub sort_order: Option<i32>,
    pub notes: Option<String>,
}

/// A single line or a batch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AddItemsRequest {
    Many(Vec<NewItemRequest>),
    One(NewItemRequest),
}

impl AddItemsRequest {
    pub fn into_vec(self) -> Vec<NewItemRequest> {
        match self {
            AddItemsRequest::Many(items) => items,
            AddItemsRequest::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[validate(custom = "validate_description")]
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub quantity: Option<Value>,
    pub unit: Option<String>,
    #[schema(value_type = Option<i64>)]
    pub cost_price: Option<Value>,
    #[schema(value_type = Option<i64>)]
    pub selling_price: Option<Value>,
    pub is_selected: Option<bool>,
    pub sort_order: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemListResponse {
    pub items: Vec<ProjectItemResponse>,
    pub totals: EstimateTotals,
}

impl ItemListResponse {
    fn from_models(items: Vec<project_item::Model>) -> Self {
        let totals = compute_totals(&items);
        Self {
            items: items.into_iter().map(ProjectItemResponse::from).collect(),
            totals,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToggleResponse {
    pub item: ProjectItemResponse,
    pub totals: EstimateTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportOutcome {
    /// Master items that were not yet on the project
    pub candidates: usize,
    /// Rows actually written; lower than `candidates` when a concurrent import won
    pub imported: u64,
    pub items: Vec<ProjectItemResponse>,
    pub totals: EstimateTotals,
}

/// Totals rendered the way the printed estimate shows them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormattedTotals {
    #[schema(example = "￥55,000")]
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    #[schema(example = "30.0%")]
    pub margin_rate: String,
}

impl From<&EstimateTotals> for FormattedTotals {
    fn from(totals: &EstimateTotals) -> Self {
        Self {
            subtotal: format_currency(totals.subtotal),
            tax: format_currency(totals.tax),
            total: format_currency(totals.total),
            margin_rate: format_rate(totals.margin_rate),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EstimatePreview {
    pub project_id: Uuid,
    pub property_name: String,
    pub customer_name: Option<String>,
    pub lines: Vec<EstimateLine>,
    pub totals: EstimateTotals,
    pub formatted: FormattedTotals,
}

/// Items of a project ordered by `(sort_order, created_at)`.
pub async fn load_items<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
) -> Result<Vec<project_item::Model>, ServiceError> {
    project_item::Entity::find()
        .filter(project_item::Column::ProjectId.eq(project_id))
        .order_by_asc(project_item::Column::SortOrder)
        .order_by_asc(project_item::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| {
            error!(error = %e, project_id = %project_id, "Failed to fetch project items");
            ServiceError::DatabaseError(e)
        })
}

async fn find_item<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
    item_id: Uuid,
) -> Result<project_item::Model, ServiceError> {
    project_item::Entity::find_by_id(item_id)
        .filter(project_item::Column::ProjectId.eq(project_id))
        .one(db)
        .await
        .map_err(|e| {
            error!(error = %e, item_id = %item_id, "Failed to fetch project item");
            ServiceError::DatabaseError(e)
        })?
        .ok_or_else(|| {
            warn!(project_id = %project_id, item_id = %item_id, "Project item not found");
            ServiceError::NotFound(format!(
                "Item {} not found in project {}",
                item_id, project_id
            ))
        })
}

#[derive(Clone)]
pub struct ProjectItemService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProjectItemService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send project item event");
            }
        }
    }

    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn list_items(&self, project_id: Uuid) -> Result<ItemListResponse, ServiceError> {
        let db = &*self.db_pool;
        find_project(db, project_id).await?;
        let items = load_items(db, project_id).await?;
        Ok(ItemListResponse::from_models(items))
    }

    /// Appends lines after the existing ones. Every entry is validated before
    /// anything is written.
    #[instrument(skip(self, requests), fields(project_id = %project_id, count = requests.len()))]
    pub async fn add_items(
        &self,
        project_id: Uuid,
        requests: Vec<NewItemRequest>,
    ) -> Result<Vec<ProjectItemResponse>, ServiceError> {
        if requests.is_empty() {
            return Err(ServiceError::ValidationError(
                "At least one item is required".to_string(),
            ));
        }
        for request in &requests {
            request.validate()?;
        }

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for item insert");
            ServiceError::DatabaseError(e)
        })?;

        find_project(&txn, project_id).await?;
        let existing = load_items(&txn, project_id).await?.len();

        let mut created = Vec::with_capacity(requests.len());
        for (idx, request) in requests.into_iter().enumerate() {
            let source_item_id = request.source_item_id;
            let active = project_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                project_id: Set(project_id),
                source_item_id: Set(source_item_id),
                description: Set(request.description),
                quantity: Set(request
                    .quantity
                    .as_ref()
                    .and_then(quantity_text)
                    .unwrap_or_else(|| DEFAULT_QUANTITY.to_string())),
                unit: Set(request
                    .unit
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_UNIT.to_string())),
                cost_price: Set(request.cost_price.as_ref().map(parse_amount).unwrap_or(0)),
                selling_price: Set(request
                    .selling_price
                    .as_ref()
                    .map(parse_amount)
                    .unwrap_or(0)),
                is_selected: Set(request.is_selected.unwrap_or(true)),
                sort_order: Set(request
                    .sort_order
                    .unwrap_or_else(|| sort_order_at(existing, idx))),
                notes: Set(request.notes.filter(|n| !n.trim().is_empty())),
                ..Default::default()
            };
            let model = active.insert(&txn).await.map_err(|e| {
                error!(error = %e, project_id = %project_id, "Failed to insert project item");
                ServiceError::from_write(e, || match source_item_id {
                    Some(id) => format!("Master item {} is already on this project", id),
                    None => "Item conflicts with an existing line".to_string(),
                })
            })?;
            created.push(model);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, project_id = %project_id, "Failed to commit item insert");
            ServiceError::DatabaseError(e)
        })?;

        info!(project_id = %project_id, count = created.len(), "Project items added");
        self.emit(Event::ItemsAdded {
            project_id,
            count: created.len(),
        })
        .await;
        Ok(created.into_iter().map(ProjectItemResponse::from).collect())
    }

    #[instrument(skip(self, request), fields(project_id = %project_id, item_id = %item_id))]
    pub async fn update_item(
        &self,
        project_id: Uuid,
        item_id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<ProjectItemResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = find_item(db, project_id, item_id).await?;
        let mut active: project_item::ActiveModel = existing.into();

        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(quantity) = request.quantity.as_ref().and_then(quantity_text) {
            active.quantity = Set(quantity);
        }
        if let Some(unit) = request.unit.filter(|u| !u.trim().is_empty()) {
            active.unit = Set(unit);
        }
        if let Some(cost) = &request.cost_price {
            active.cost_price = Set(parse_amount(cost));
        }
        if let Some(selling) = &request.selling_price {
            active.selling_price = Set(parse_amount(selling));
        }
        if let Some(selected) = request.is_selected {
            active.is_selected = Set(selected);
        }
        if let Some(sort_order) = request.sort_order {
            active.sort_order = Set(sort_order);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes).filter(|n| !n.trim().is_empty()));
        }

        let model = active.update(db).await.map_err(|e| {
            error!(error = %e, item_id = %item_id, "Failed to update project item");
            ServiceError::DatabaseError(e)
        })?;

        info!(project_id = %project_id, item_id = %item_id, "Project item updated");
        self.emit(Event::ItemUpdated {
            project_id,
            item_id,
        })
        .await;
        Ok(model.into())
    }

    /// Flips `is_selected` on the one row matching both ids.
    #[instrument(skip(self), fields(project_id = %project_id, item_id = %item_id))]
    pub async fn toggle_item(
        &self,
        project_id: Uuid,
        item_id: Uuid,
    ) -> Result<ToggleResponse, ServiceError> {
        let db = &*self.db_pool;
        let existing = find_item(db, project_id, item_id).await?;
        let is_selected = !existing.is_selected;

        let mut active: project_item::ActiveModel = existing.into();
        active.is_selected = Set(is_selected);
        let model = active.update(db).await.map_err(|e| {
            error!(error = %e, item_id = %item_id, "Failed to toggle project item");
            ServiceError::DatabaseError(e)
        })?;

        let items = load_items(db, project_id).await?;
        let totals = compute_totals(&items);

        info!(project_id = %project_id, item_id = %item_id, is_selected, "Item selection toggled");
        self.emit(Event::ItemSelectionToggled {
            project_id,
            item_id,
            is_selected,
        })
        .await;
        Ok(ToggleResponse {
            item: model.into(),
            totals,
        })
    }

    /// Copies every catalog item of the project's region and municipality
    /// that the project does not have yet. Safe to repeat.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn import_master_items(&self, project_id: Uuid) -> Result<ImportOutcome, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for catalog import");
            ServiceError::DatabaseError(e)
        })?;

        let project = find_project(&txn, project_id).await?;
        let (region_id, municipality) = match (project.region_id, project.municipality.as_deref()) {
            (Some(region_id), Some(municipality)) if !municipality.trim().is_empty() => {
                (region_id, municipality)
            }
            _ => {
                return Err(ServiceError::ValidationError(
                    "Project region and municipality must be set before importing items"
                        .to_string(),
                ))
            }
        };

        let masters = find_master_items(&txn, region_id, Some(municipality)).await?;
        let existing = load_items(&txn, project_id).await?;
        let missing = missing_master_items(&masters, &existing);
        let candidates = missing.len();

        let imported = if missing.is_empty() {
            0
        } else {
            let records = build_import_records(project_id, &missing, existing.len(), Utc::now());
            let result = project_item::Entity::insert_many(records)
                .on_conflict(
                    OnConflict::columns([
                        project_item::Column::ProjectId,
                        project_item::Column::SourceItemId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .do_nothing()
                .exec_without_returning(&txn)
                .await
                .map_err(|e| {
                    error!(error = %e, project_id = %project_id, "Failed to insert imported items");
                    ServiceError::DatabaseError(e)
                })?;
            match result {
                TryInsertResult::Inserted(rows) => rows,
                TryInsertResult::Empty | TryInsertResult::Conflicted => 0,
            }
        };

        txn.commit().await.map_err(|e| {
            error!(error = %e, project_id = %project_id, "Failed to commit catalog import");
            ServiceError::DatabaseError(e)
        })?;

        counter!("site_survey.items.imported", imported);
        info!(project_id = %project_id, candidates, imported, "Catalog import finished");
        if imported > 0 {
            self.emit(Event::ItemsImported {
                project_id,
                imported,
            })
            .await;
        }

        let ItemListResponse { items, totals } =
            ItemListResponse::from_models(load_items(db, project_id).await?);
        Ok(ImportOutcome {
            candidates,
            imported,
            items,
            totals,
        })
    }

    /// Selected lines with amounts, plus totals.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn estimate(&self, project_id: Uuid) -> Result<EstimatePreview, ServiceError> {
        let db = &*self.db_pool;
        let project = find_project(db, project_id).await?;
        let items = load_items(db, project_id).await?;
        let totals = compute_totals(&items);

        Ok(EstimatePreview {
            project_id,
            property_name: project.property_name,
            customer_name: project.customer_name,
            lines: estimate_lines(&items),
            formatted: FormattedTotals::from(&totals),
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn add_request_accepts_one_or_many() {
        let one: AddItemsRequest =
            serde_json::from_value(json!({"description": "道路台帳", "selling_price": "10,000"}))
                .unwrap();
        assert_eq!(one.into_vec().len(), 1);

        let many: AddItemsRequest = serde_json::from_value(json!([
            {"description": "a"},
            {"description": "b", "quantity": 2}
        ]))
        .unwrap();
        let many = many.into_vec();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].quantity.as_ref().and_then(quantity_text), Some("2".into()));
    }

    #[test]
    fn quantity_text_keeps_the_written_form() {
        assert_eq!(quantity_text(&json!("1.5")), Some("1.5".into()));
        assert_eq!(quantity_text(&json!(3)), Some("3".into()));
        assert_eq!(quantity_text(&json!("")), None);
        assert_eq!(quantity_text(&json!(null)), None);
    }

    #[test]
    fn blank_description_is_rejected() {
        let request = NewItemRequest {
            description: " ".into(),
            ..Default::default()
        };
        assert_matches!(
            request.validate().map_err(ServiceError::from),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn formatted_totals_use_yen_and_percent() {
        let totals = EstimateTotals {
            subtotal: 55_000,
            tax: 5_500,
            total: 60_500,
            total_cost: 38_500,
            margin_rate: 30.0,
            selected_count: 3,
            item_count: 3,
        };
        let formatted = FormattedTotals::from(&totals);
        assert_eq!(formatted.total, "￥60,500");
        assert_eq!(formatted.margin_rate, "30.0%");
    }

    #[test]
    fn item_response_carries_line_amount() {
        let mut model = crate::services::reconciliation::fixtures::project_line(Some(1), 0);
        model.quantity = "2".into();
        let response = ProjectItemResponse::from(model);
        assert_eq!(response.amount, 20_000);
    }
}
