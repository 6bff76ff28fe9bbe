use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

/// Municipal survey questionnaire, at most one per project.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_surveys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub project_id: Uuid,

    // zoning overlays
    pub district_plan: Option<String>,
    pub district_plan_notes: Option<String>,
    pub building_agreement: Option<String>,
    pub building_agreement_notes: Option<String>,
    pub landscape: Option<String>,
    pub landscape_notes: Option<String>,
    pub buried_cultural: Option<String>,
    pub buried_cultural_notes: Option<String>,

    // connecting roads
    pub road1_type: Option<String>,
    pub road1_side: Option<String>,
    pub road1_name: Option<String>,
    pub road1_character: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub road1_width: Option<Decimal>,
    pub road1_demarcation: Option<String>,
    pub road2_type: Option<String>,
    pub road2_side: Option<String>,
    pub road2_name: Option<String>,
    pub road2_character: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub road2_width: Option<Decimal>,
    pub road2_demarcation: Option<String>,
    pub road3_type: Option<String>,
    pub road3_side: Option<String>,
    pub road3_name: Option<String>,
    pub road3_character: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub road3_width: Option<Decimal>,
    pub road3_demarcation: Option<String>,

    // utilities
    pub public_sewerage: Option<String>,
    pub sewerage_ledger: Option<bool>,
    pub sewerage_notes: Option<String>,
    pub water_supply: Option<String>,
    pub water_ledger: Option<bool>,
    pub water_notes: Option<String>,
    pub gas: Option<String>,
    pub gas_notes: Option<String>,

    // regulations and hazards
    pub scenic_district: Option<String>,
    pub scenic_notes: Option<String>,
    pub wall_setback_road: Option<String>,
    pub wall_setback_adjacent: Option<String>,
    pub retaining_wall_regulation: Option<String>,
    pub retaining_wall_notes: Option<String>,
    pub sediment_control: Option<String>,
    pub sediment_notes: Option<String>,
    pub river_conservation: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub river_width: Option<Decimal>,
    pub river_notes: Option<String>,
    pub landslide: Option<String>,
    pub steep_slope: Option<String>,
    pub disaster_warning: Option<String>,
    pub fire_department: Option<String>,
    pub intermediate_inspection: Option<String>,
    pub highrise_related: Option<String>,
    pub development_guidelines: Option<String>,
    pub city_planning_facility: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub extra_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
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

/// One connecting road as printed on the survey sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Road<'a> {
    pub kind: Option<&'a str>,
    pub side: Option<&'a str>,
    pub name: Option<&'a str>,
    pub width: Option<Decimal>,
}

impl Road<'_> {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.side.is_none() && self.name.is_none() && self.width.is_none()
    }
}

impl Model {
    /// Roads 1..=3 in order.
    pub fn roads(&self) -> [Road<'_>; 3] {
        [
            Road {
                kind: self.road1_type.as_deref(),
                side: self.road1_side.as_deref(),
                name: self.road1_name.as_deref(),
                width: self.road1_width,
            },
            Road {
                kind: self.road2_type.as_deref(),
                side: self.road2_side.as_deref(),
                name: self.road2_name.as_deref(),
                width: self.road2_width,
            },
            Road {
                kind: self.road3_type.as_deref(),
                side: self.road3_side.as_deref(),
                name: self.road3_name.as_deref(),
                width: self.road3_width,
            },
        ]
    }
}
