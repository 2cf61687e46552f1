//! opsdeck store - SQLite backing store for the dashboard's record tables
//!
//! Provides:
//! - Connection management and embedded, checksummed migrations
//! - The row source query: Tier 1 predicates translated into parameterized SQL
//! - YAML seed bundles for loading fixture data

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod seed;

pub use errors::Result;
pub use repo::{insert_row, query_rows};
