//! Error helpers for shadow-store
//!
//! Infrastructure failures surface as `ShadowError::Persistence` so callers of
//! the `Store` trait see one error type regardless of backend.

use shadow_core::errors::ShadowError;

pub use shadow_core::errors::Result;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ShadowError {
    ShadowError::Persistence {
        message: format!("Migration {} failed: {}", migration_id, reason),
    }
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ShadowError {
    ShadowError::Persistence {
        message: format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ),
    }
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ShadowError {
    ShadowError::Persistence {
        message: err.to_string(),
    }
}

/// A stored row that does not map back onto the model
pub fn corrupt_row(table: &str, reason: impl std::fmt::Display) -> ShadowError {
    ShadowError::Serialization {
        message: format!("Corrupt row in {}: {}", table, reason),
    }
}
