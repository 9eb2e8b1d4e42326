//! SQLite-backed implementation of the `Store` contract

mod hydration;
mod sqlite_store;

pub use sqlite_store::SqliteStore;
