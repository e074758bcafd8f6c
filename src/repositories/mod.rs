//! Repository layer for database operations.
//!
//! This module provides repository structs that encapsulate database queries
//! and operations, following the Data Mapper pattern recommended by SeaORM.
//! Every method is generic over [`sea_orm::ConnectionTrait`] so the same query
//! runs against the plain connection or inside a per-location transaction.

pub mod event;
pub mod location;
pub mod milestone;
pub mod saint;
pub mod saint_year;

pub use event::EventRepository;
pub use location::LocationRepository;
pub use milestone::MilestoneRepository;
pub use saint::SaintRepository;
pub use saint_year::SaintYearRepository;
