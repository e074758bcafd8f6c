//! Relational storage for imported saint data
//!
//! This module owns the database connection and schema creation for:
//! - Locations
//! - Saints
//! - Saint years (historical data)
//! - Milestones
//! - Events

pub mod db;

pub use db::Storage;
