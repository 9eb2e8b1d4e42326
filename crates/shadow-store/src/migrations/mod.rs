//! Schema migrations for the SQLite store
//!
//! Migrations are embedded at compile time and applied in order inside one
//! transaction each. The SHA-256 of every applied migration is recorded, and
//! reopening a database whose recorded checksum no longer matches fails.

mod checksums;
mod embedded;
mod runner;

pub use embedded::{Migration, MIGRATIONS};
pub use runner::{applied_migrations, apply_migrations};
