//! `shadow.toml` configuration
//!
//! ```toml
//! [store]
//! path = ".shadow/store.db"
//!
//! [logging]
//! profile = "development"
//!
//! [[relationship]]
//! source_kinds = ["actor"]
//! mirror_kind = "_actor"
//! consumer_kinds = ["movie"]
//! label = "Actors"
//! ```
//!
//! A missing file yields the defaults; a file that does not parse or fails
//! validation is a `Config` error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ShadowError};
use crate::logging_facility::Profile;
use crate::model::MirrorOptions;

pub const DEFAULT_CONFIG_FILE: &str = "shadow.toml";
pub const DEFAULT_STORE_PATH: &str = ".shadow/store.db";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default, rename = "relationship")]
    pub relationships: Vec<RelationshipConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `development`, `production` or `test`; unset means development
    pub profile: Option<String>,
}

impl LoggingConfig {
    /// # Errors
    ///
    /// `Config` when the profile name is not recognised.
    pub fn profile(&self) -> Result<Profile> {
        match self.profile.as_deref() {
            Some(name) => name.parse(),
            None => Ok(Profile::default()),
        }
    }
}

/// One `[[relationship]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipConfig {
    pub source_kinds: Vec<String>,
    pub mirror_kind: String,
    #[serde(default)]
    pub consumer_kinds: Vec<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub public: bool,
}

impl RelationshipConfig {
    pub fn options(&self) -> MirrorOptions {
        MirrorOptions {
            label: self.label.clone(),
            consumer_kinds: self.consumer_kinds.clone(),
            public: self.public,
        }
    }
}

impl ShadowConfig {
    /// Read and validate a config file; a missing file gives the defaults
    ///
    /// # Errors
    ///
    /// `Io` when the file exists but cannot be read, `Config` when it does not
    /// parse or validate.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|err| match err {
            ShadowError::Config { message } => ShadowError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// # Errors
    ///
    /// `Config` when the text does not parse or validate.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ShadowError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `Config` describing the first invalid entry.
    pub fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(config_error("store.path must not be empty"));
        }
        self.logging.profile()?;
        for (i, rel) in self.relationships.iter().enumerate() {
            if rel.mirror_kind.trim().is_empty() {
                return Err(config_error(format!(
                    "relationship[{}].mirror_kind must not be empty",
                    i
                )));
            }
            if rel.source_kinds.is_empty() || rel.source_kinds.iter().any(|k| k.trim().is_empty())
            {
                return Err(config_error(format!(
                    "relationship[{}].source_kinds must list at least one non-empty kind",
                    i
                )));
            }
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> ShadowError {
    ShadowError::Config {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ShadowConfig::load(&dir.path().join("shadow.toml")).unwrap();
        assert_eq!(config, ShadowConfig::default());
        assert_eq!(config.store.path, PathBuf::from(DEFAULT_STORE_PATH));
        assert!(config.relationships.is_empty());
    }

    #[test]
    fn test_full_file_parses() {
        let config = ShadowConfig::from_toml_str(
            r#"
[store]
path = "data/mirror.db"

[logging]
profile = "production"

[[relationship]]
source_kinds = ["actor"]
mirror_kind = "_actor"
consumer_kinds = ["movie"]
label = "Actors"
"#,
        )
        .unwrap();

        assert_eq!(config.store.path, PathBuf::from("data/mirror.db"));
        assert_eq!(config.logging.profile().unwrap(), Profile::Production);
        assert_eq!(config.relationships.len(), 1);
        let options = config.relationships[0].options();
        assert_eq!(options.label.as_deref(), Some("Actors"));
        assert_eq!(options.consumer_kinds, vec!["movie".to_string()]);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shadow.toml");
        std::fs::write(&path, "[store\npath = 1").unwrap();

        let err = ShadowConfig::load(&path).unwrap_err();
        assert!(matches!(err, ShadowError::Config { .. }));
        assert!(err.to_string().contains("shadow.toml"));
    }

    #[test]
    fn test_relationship_without_sources_rejected() {
        let err = ShadowConfig::from_toml_str(
            r#"
[[relationship]]
source_kinds = []
mirror_kind = "_actor"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ShadowError::Config { .. }));
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let err = ShadowConfig::from_toml_str("[logging]\nprofile = \"loud\"\n").unwrap_err();
        assert!(matches!(err, ShadowError::Config { .. }));
    }
}
