use crate::{
    db::DbPool,
    entities::{master_item, municipality, region},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

/// Comparison key for municipality names: every Unicode whitespace character
/// (ideographic space included) is dropped.
pub fn municipality_key(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegionResponse {
    pub id: i32,
    pub code: i32,
    pub name: String,
    pub short_name: String,
}

impl From<region::Model> for RegionResponse {
    fn from(model: region::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            short_name: model.short_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MunicipalityResponse {
    pub id: i32,
    pub region_id: i32,
    pub name: String,
}

impl From<municipality::Model> for MunicipalityResponse {
    fn from(model: municipality::Model) -> Self {
        Self {
            id: model.id,
            region_id: model.region_id,
            name: model.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MasterItemResponse {
    pub id: i32,
    pub region_id: i32,
    pub municipality_name: String,
    pub description: String,
    #[schema(example = "1")]
    pub quantity: String,
    #[schema(example = "式")]
    pub unit: String,
    pub cost_price: i64,
    pub selling_price: i64,
    pub lead_time_days: Option<i32>,
    pub sort_order: i32,
}

impl From<master_item::Model> for MasterItemResponse {
    fn from(model: master_item::Model) -> Self {
        Self {
            id: model.id,
            region_id: model.region_id,
            municipality_name: model.municipality_name,
            description: model.description,
            quantity: model.quantity,
            unit: model.unit,
            cost_price: model.cost_price,
            selling_price: model.selling_price,
            lead_time_days: model.lead_time_days,
            sort_order: model.sort_order,
        }
    }
}

/// Active master items of a region in catalog order, optionally narrowed to
/// one municipality by [`municipality_key`].
pub async fn find_master_items<C: ConnectionTrait>(
    db: &C,
    region_id: i32,
    municipality: Option<&str>,
) -> Result<Vec<master_item::Model>, ServiceError> {
    let items = master_item::Entity::find()
        .filter(master_item::Column::RegionId.eq(region_id))
        .filter(master_item::Column::IsActive.eq(true))
        .order_by_asc(master_item::Column::SortOrder)
        .order_by_asc(master_item::Column::Id)
        .all(db)
        .await
        .map_err(|e| {
            error!(error = %e, region_id, "Failed to fetch master items");
            ServiceError::DatabaseError(e)
        })?;

    Ok(match municipality {
        Some(name) => {
            let key = municipality_key(name);
            items
                .into_iter()
                .filter(|item| municipality_key(&item.municipality_name) == key)
                .collect()
        }
        None => items,
    })
}

/// Read-only access to regions, municipalities and the master catalog.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_regions(&self) -> Result<Vec<RegionResponse>, ServiceError> {
        let db = &*self.db_pool;
        let regions = region::Entity::find()
            .filter(region::Column::IsActive.eq(true))
            .order_by_asc(region::Column::Code)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch regions");
                ServiceError::DatabaseError(e)
            })?;

        Ok(regions.into_iter().map(RegionResponse::from).collect())
    }

    #[instrument(skip(self), fields(region_id = %region_id))]
    pub async fn get_region(&self, region_id: i32) -> Result<region::Model, ServiceError> {
        let db = &*self.db_pool;
        region::Entity::find_by_id(region_id)
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, region_id, "Failed to fetch region");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| {
                warn!(region_id, "Region not found");
                ServiceError::NotFound(format!("Region {} not found", region_id))
            })
    }

    #[instrument(skip(self), fields(region_id = %region_id))]
    pub async fn list_municipalities(
        &self,
        region_id: i32,
    ) -> Result<Vec<MunicipalityResponse>, ServiceError> {
        self.get_region(region_id).await?;

        let db = &*self.db_pool;
        let municipalities = municipality::Entity::find()
            .filter(municipality::Column::RegionId.eq(region_id))
            .filter(municipality::Column::IsActive.eq(true))
            .order_by_asc(municipality::Column::Name)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, region_id, "Failed to fetch municipalities");
                ServiceError::DatabaseError(e)
            })?;

        info!(region_id, count = municipalities.len(), "Municipalities retrieved");
        Ok(municipalities
            .into_iter()
            .map(MunicipalityResponse::from)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_master_items(
        &self,
        region_id: i32,
        municipality: Option<&str>,
    ) -> Result<Vec<MasterItemResponse>, ServiceError> {
        let db = &*self.db_pool;
        let items = find_master_items(db, region_id, municipality).await?;
        Ok(items.into_iter().map(MasterItemResponse::from).collect())
    }
}
