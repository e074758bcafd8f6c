//! Milestone repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::milestone;

/// Repository for milestone-related database operations.
pub struct MilestoneRepository;

impl MilestoneRepository {
    /// Find a milestone by saint, count and date.
    pub async fn get_by_key<C>(conn: &C, saint_id: Uuid, count: i32, date: &str) -> Result<Option<milestone::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(milestone::Entity::find()
            .filter(milestone::Column::SaintId.eq(saint_id))
            .filter(milestone::Column::Count.eq(count))
            .filter(milestone::Column::Date.eq(date))
            .one(conn)
            .await?)
    }

    /// Get all milestones for the given saints ordered by count.
    pub async fn get_for_saints<C>(conn: &C, saint_ids: &[Uuid]) -> Result<Vec<milestone::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(milestone::Entity::find()
            .filter(milestone::Column::SaintId.is_in(saint_ids.iter().copied()))
            .order_by_asc(milestone::Column::Count)
            .all(conn)
            .await?)
    }

    pub async fn insert<C>(conn: &C, record: milestone::ActiveModel) -> Result<milestone::Model>
    where
        C: ConnectionTrait,
    {
        Ok(record.insert(conn).await?)
    }

    pub async fn update<C>(conn: &C, record: milestone::ActiveModel) -> Result<milestone::Model>
    where
        C: ConnectionTrait,
    {
        Ok(record.update(conn).await?)
    }
}
