//! Shadow Store - SQLite persistence for the record/node mirror
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - `SqliteStore`, a `shadow_core::Store` implementation backed by one file

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use repo::SqliteStore;
