use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Prefecture-level region that scopes the master catalog
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: i32,
    pub name: String,
    pub short_name: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::municipality::Entity")]
    Municipalities,
    #[sea_orm(has_many = "super::master_item::Entity")]
    MasterItems,
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,
}

impl Related<super::municipality::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Municipalities.def()
    }
}

impl Related<super::master_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MasterItems.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
