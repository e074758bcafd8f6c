//! Location repository for database operations.

use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ConnectionTrait, EntityTrait};

use crate::entities::location;
use crate::sync::LocationRecord;

/// Repository for location-related database operations.
pub struct LocationRepository;

impl LocationRepository {
    /// Get a single location by its spreadsheet id.
    pub async fn get_by_id<C>(conn: &C, id: &str) -> Result<Option<location::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(location::Entity::find_by_id(id.to_string()).one(conn).await?)
    }

    /// Insert or update a location from its master-sheet row.
    pub async fn upsert<C>(conn: &C, record: &LocationRecord) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let model = location::ActiveModel {
            id: ActiveValue::Set(record.sheet_id.clone()),
            state: ActiveValue::Set(record.state.clone()),
            city: ActiveValue::Set(record.city.clone()),
            display_name: ActiveValue::Set(record.display_name()),
            address: ActiveValue::Set(record.address.clone()),
            is_active: ActiveValue::Set(record.is_active),
        };

        location::Entity::insert(model)
            .on_conflict(
                OnConflict::column(location::Column::Id)
                    .update_columns([
                        location::Column::State,
                        location::Column::City,
                        location::Column::DisplayName,
                        location::Column::Address,
                        location::Column::IsActive,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;

        Ok(())
    }
}
