use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, nullable)]
    pub project_number: Option<String>,
    pub property_name: String,
    #[sea_orm(nullable)]
    pub region_id: Option<i32>,
    #[sea_orm(nullable)]
    pub municipality: Option<String>,
    #[sea_orm(nullable)]
    pub lot_number: Option<String>,
    #[sea_orm(nullable)]
    pub address_display: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub site_area: Option<Decimal>,
    #[sea_orm(nullable)]
    pub building_scale: Option<String>,
    #[sea_orm(nullable)]
    pub city_planning_zone: Option<String>,
    #[sea_orm(nullable)]
    pub fire_prevention: Option<String>,
    #[sea_orm(nullable)]
    pub zoning: Option<String>,
    #[sea_orm(nullable)]
    pub height_district: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub building_coverage: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub floor_area_ratio: Option<Decimal>,
    #[sea_orm(nullable)]
    pub customer_name: Option<String>,
    pub status: ProjectStatus,
    #[sea_orm(nullable)]
    pub estimate_number: Option<String>,
    #[sea_orm(nullable)]
    pub estimate_date: Option<NaiveDate>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::RegionId",
        to = "super::region::Column::Id"
    )]
    Region,
    #[sea_orm(has_one = "super::project_survey::Entity")]
    Survey,
    #[sea_orm(has_many = "super::project_item::Entity")]
    Items,
}

impl Related<super::region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Region.def()
    }
}

impl Related<super::project_survey::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Survey.def()
    }
}

impl Related<super::project_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        if insert && self.created_at.is_not_set() {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}

/// Informal progression; transitions are not enforced.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "investigating")]
    Investigating,
    #[sea_orm(string_value = "estimated")]
    Estimated,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Investigating => "investigating",
            Self::Estimated => "estimated",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "investigating" => Ok(Self::Investigating),
            "estimated" => Ok(Self::Estimated),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown project status '{}'", other)),
        }
    }
}
