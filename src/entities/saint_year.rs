//! Historical data for one saint in one year. `(saint_id, year)` is unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "saint_years")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub saint_id: Uuid,
    pub year: i32,
    pub burger: String,
    pub tap_beers: String,        // JSON-encoded list of beer names
    pub can_bottle_beers: String, // JSON-encoded list of beer names
    pub facebook_event: Option<String>,
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

impl Model {
    /// Decode the tap beer list, treating malformed JSON as empty.
    pub fn tap_beer_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tap_beers).unwrap_or_default()
    }

    /// Decode the can/bottle beer list, treating malformed JSON as empty.
    pub fn can_bottle_beer_list(&self) -> Vec<String> {
        serde_json::from_str(&self.can_bottle_beers).unwrap_or_default()
    }
}
