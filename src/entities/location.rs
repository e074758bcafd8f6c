//! Location entity: one club location, keyed by its per-location spreadsheet id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    /// The location's own spreadsheet id, used as the business key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub state: String,
    pub city: String,
    pub display_name: String,
    pub address: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::saint::Entity")]
    Saints,
    #[sea_orm(has_many = "super::event::Entity")]
    Events,
}

impl Related<super::saint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Saints.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
