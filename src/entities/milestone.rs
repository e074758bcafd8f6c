use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "milestones")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub saint_id: Uuid,
    pub count: i32,
    pub date: String,
    pub sticker: Option<String>,
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
}

impl Related<super::saint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Saint.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
