//! Saint Sync - Google Sheets import/export engine for the Saint Calendar
//!
//! This library moves club data between per-location Google Sheets and a
//! relational database. It normalizes inconsistent headers and date formats,
//! reconciles rows by business keys, detects saint number conflicts across
//! locations and applies each location's changes in one transaction, while
//! pacing every spreadsheet call to stay under the API quota.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`config`] - Application configuration management
//! * [`sheets`] - Spreadsheet client abstraction, Google client and rate limiting
//! * [`storage`] - Database connection and schema
//! * [`sync`] - Import, export and preview pipelines
//! * [`api`] - JSON HTTP API around the pipelines
//! * [`utils`] - Date and cell helpers

/// HTTP API exposing the sync pipelines
pub mod api;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Logging setup
pub mod logger;

/// Repository layer for database operations
pub mod repositories;

/// Spreadsheet clients and the rate-limited wrapper
pub mod sheets;

/// Database connection and schema management
pub mod storage;

/// Synchronization engine between spreadsheets and the database
pub mod sync;

/// Utility functions for dates and spreadsheet cells
pub mod utils;

// Re-export entity models for convenient access
pub use entities::{event, location, milestone, saint, saint_year};
