//! Saint year (historical data) repository.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::saint_year;

/// Repository for historical saint-year records.
pub struct SaintYearRepository;

impl SaintYearRepository {
    /// Get the record for a saint and year (composite business key).
    pub async fn get_by_key<C>(conn: &C, saint_id: Uuid, year: i32) -> Result<Option<saint_year::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(saint_year::Entity::find()
            .filter(saint_year::Column::SaintId.eq(saint_id))
            .filter(saint_year::Column::Year.eq(year))
            .one(conn)
            .await?)
    }

    /// Get all historical records for the given saints, ordered by year.
    pub async fn get_for_saints<C>(conn: &C, saint_ids: &[Uuid]) -> Result<Vec<saint_year::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(saint_year::Entity::find()
            .filter(saint_year::Column::SaintId.is_in(saint_ids.iter().copied()))
            .order_by_asc(saint_year::Column::Year)
            .all(conn)
            .await?)
    }

    /// Insert a new saint year.
    pub async fn insert<C>(conn: &C, record: saint_year::ActiveModel) -> Result<saint_year::Model>
    where
        C: ConnectionTrait,
    {
        Ok(record.insert(conn).await?)
    }

    /// Update an existing saint year.
    pub async fn update<C>(conn: &C, record: saint_year::ActiveModel) -> Result<saint_year::Model>
    where
        C: ConnectionTrait,
    {
        Ok(record.update(conn).await?)
    }
}
