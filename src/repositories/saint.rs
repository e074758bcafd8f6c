//! Saint repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::saint;

/// Repository for saint-related database operations.
pub struct SaintRepository;

impl SaintRepository {
    /// Get a single saint by its saint number (business key).
    pub async fn get_by_number<C>(conn: &C, saint_number: &str) -> Result<Option<saint::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(saint::Entity::find()
            .filter(saint::Column::SaintNumber.eq(saint_number))
            .one(conn)
            .await?)
    }

    /// Get all saints owned by a location, ordered by saint number.
    pub async fn get_for_location<C>(conn: &C, location_id: &str) -> Result<Vec<saint::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(saint::Entity::find()
            .filter(saint::Column::LocationId.eq(location_id))
            .order_by_asc(saint::Column::SaintNumber)
            .all(conn)
            .await?)
    }

    /// Get the first saint whose saint year equals `year`.
    ///
    /// Several saints can share a year, so this is only a best-effort match.
    pub async fn first_for_year<C>(conn: &C, year: i32) -> Result<Option<saint::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(saint::Entity::find()
            .filter(saint::Column::SaintYear.eq(year))
            .order_by_asc(saint::Column::SaintNumber)
            .one(conn)
            .await?)
    }

    /// Get the first saint of a location with at least `count` total beers.
    pub async fn first_with_total_beers<C>(conn: &C, location_id: &str, count: i32) -> Result<Option<saint::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(saint::Entity::find()
            .filter(saint::Column::LocationId.eq(location_id))
            .filter(saint::Column::TotalBeers.gte(count))
            .order_by_asc(saint::Column::SaintNumber)
            .one(conn)
            .await?)
    }

    /// Insert a new saint.
    pub async fn insert<C>(conn: &C, saint: saint::ActiveModel) -> Result<saint::Model>
    where
        C: ConnectionTrait,
    {
        Ok(saint.insert(conn).await?)
    }

    /// Update a saint in the database.
    pub async fn update<C>(conn: &C, saint: saint::ActiveModel) -> Result<saint::Model>
    where
        C: ConnectionTrait,
    {
        Ok(saint.update(conn).await?)
    }
}
