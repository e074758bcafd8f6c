//! Utility modules for the sync engine.
//!
//! - [`datetime`] - Saint date format detection and normalization
//! - [`text`] - Cell-level helpers shared by the tab parsers and the master resolver

pub mod datetime;
pub mod text;
