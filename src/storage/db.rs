use anyhow::{Context, Result};
use log::info;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

use crate::entities::{event, location, milestone, saint, saint_year};

/// Relational store handle shared by the sync pipelines.
///
/// The connection is created once by the hosting process and handed to every
/// pipeline invocation; cloning is cheap because the underlying pool is shared.
#[derive(Clone, Debug)]
pub struct Storage {
    pub conn: DatabaseConnection,
}

impl Storage {
    /// Connect to the database at `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let conn = Database::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;

        let storage = Self { conn };
        storage.init_schema().await?;
        info!("💾 Connected to database");
        Ok(storage)
    }

    /// Open a fresh in-memory SQLite database.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Create all tables and indexes if they do not exist yet.
    async fn init_schema(&self) -> Result<()> {
        self.create_table(location::Entity).await?;
        self.create_table(saint::Entity).await?;
        self.create_table(saint_year::Entity).await?;
        self.create_table(milestone::Entity).await?;
        self.create_table(event::Entity).await?;

        let backend = self.conn.get_database_backend();

        let saint_year_key = Index::create()
            .if_not_exists()
            .name("idx_saint_years_saint_year")
            .table(saint_year::Entity)
            .col(saint_year::Column::SaintId)
            .col(saint_year::Column::Year)
            .unique()
            .to_owned();
        self.conn
            .execute(backend.build(&saint_year_key))
            .await
            .context("Failed to create saint_years unique index")?;

        let milestone_key = Index::create()
            .if_not_exists()
            .name("idx_milestones_saint_count_date")
            .table(milestone::Entity)
            .col(milestone::Column::SaintId)
            .col(milestone::Column::Count)
            .col(milestone::Column::Date)
            .to_owned();
        self.conn
            .execute(backend.build(&milestone_key))
            .await
            .context("Failed to create milestones index")?;

        Ok(())
    }

    async fn create_table<E>(&self, entity: E) -> Result<()>
    where
        E: EntityTrait,
    {
        let table = entity.table_name().to_string();
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);
        let mut statement = schema.create_table_from_entity(entity);
        statement.if_not_exists();
        self.conn
            .execute(backend.build(&statement))
            .await
            .with_context(|| format!("Failed to create table {}", table))?;
        Ok(())
    }
}
