//! Calendar events derived from saint data (currently only feast days).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub saint_id: Uuid,
    pub location_id: Option<String>,
    pub title: String,
    pub month: i32,
    pub day: i32,
    pub event_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::saint::Entity",
        from = "Column::SaintId",
        to = "super::saint::Column::Id",
        on_delete = "Cascade"
    )]
    Saint,
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id",
        on_delete = "SetNull"
    )]
    Location,
}

impl Related<super::saint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Saint.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
