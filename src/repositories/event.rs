//! Event repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::event;

/// Repository for calendar event operations.
pub struct EventRepository;

impl EventRepository {
    /// Check whether an event with the same saint, date and type already exists.
    pub async fn exists<C>(conn: &C, saint_id: Uuid, month: i32, day: i32, event_type: &str) -> Result<bool>
    where
        C: ConnectionTrait,
    {
        Ok(event::Entity::find()
            .filter(event::Column::SaintId.eq(saint_id))
            .filter(event::Column::Month.eq(month))
            .filter(event::Column::Day.eq(day))
            .filter(event::Column::EventType.eq(event_type))
            .one(conn)
            .await?
            .is_some())
    }

    /// Get all events for a saint.
    pub async fn get_for_saint<C>(conn: &C, saint_id: Uuid) -> Result<Vec<event::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(event::Entity::find()
            .filter(event::Column::SaintId.eq(saint_id))
            .all(conn)
            .await?)
    }

    pub async fn insert<C>(conn: &C, record: event::ActiveModel) -> Result<event::Model>
    where
        C: ConnectionTrait,
    {
        Ok(record.insert(conn).await?)
    }
}
