//! Subcommand implementations and the state they share

pub mod check;
pub mod sync;

use std::path::{Path, PathBuf};

use shadow_core::logging_facility::{self, Profile};
use shadow_core::{Notifier, Registry, ShadowConfig};
use shadow_core_types::RequestContext;
use shadow_store::SqliteStore;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Loaded configuration plus the resolved store path
pub struct Context {
    pub config: ShadowConfig,
    pub db: PathBuf,
    /// Root of every pass this invocation runs
    pub request: RequestContext,
    profile: Profile,
}

impl Context {
    /// Read the config file; `--db` wins over `[store] path`
    pub fn load(db: Option<PathBuf>, config_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let config = ShadowConfig::load(config_path)?;
        let profile = config.logging.profile()?;
        let db = db.unwrap_or_else(|| config.store.path.clone());
        Ok(Self {
            config,
            db,
            request: RequestContext::new(),
            profile,
        })
    }

    /// Start logging; quiet unless `verbose`, `RUST_LOG` overrides either way
    pub fn init_logging(&self, verbose: bool) {
        let filter = if verbose {
            "shadow_core=info,shadow_store=info,shadow_cli=info"
        } else {
            "warn"
        };
        logging_facility::init_with_filter(self.profile, filter);
    }

    /// Open the store and register every relationship the config declares
    pub fn open_store(&self) -> Result<(SqliteStore, Registry), Box<dyn std::error::Error>> {
        let store = SqliteStore::open(&self.db)?;
        let registry = Registry::from_config(&store, &self.config, Notifier::new())?;
        tracing::debug!(
            db = %self.db.display(),
            relationships = self.config.relationships.len(),
            "store opened"
        );
        Ok((store, registry))
    }
}
