//! Relationship registry: wires definitions to store events
//!
//! Registration happens once at startup. Each call registers the namespace
//! with the store and subscribes one [`MirrorSyncHandler`] per source kind to
//! both `Saved` and `Deleting`. Repeated calls are not de-duplicated; a second
//! registration of the same namespace adds its source kinds as extra triggers.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ShadowConfig;
use crate::errors::{Result, ShadowError};
use crate::handler::MirrorSyncHandler;
use crate::model::{MirrorOptions, RelationshipDefinition};
use crate::notify::Notifier;
use crate::store::{EventKind, Store};

#[derive(Debug, Default)]
pub struct Registry {
    definitions: BTreeMap<String, RelationshipDefinition>,
    notifier: Notifier,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers created by this registry emit through `notifier`
    pub fn with_notifier(notifier: Notifier) -> Self {
        Self {
            definitions: BTreeMap::new(),
            notifier,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Register a relationship and subscribe its handlers
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty mirror kind or source list,
    /// `UnknownRecordKind` when a source kind is not registered with the store.
    pub fn register_relationship(
        &mut self,
        store: &dyn Store,
        source_kinds: &[&str],
        mirror_kind: &str,
        options: MirrorOptions,
    ) -> Result<()> {
        if mirror_kind.trim().is_empty() {
            return Err(ShadowError::InvalidInput {
                reason: "mirror kind must not be empty".to_string(),
            });
        }
        if source_kinds.is_empty() {
            return Err(ShadowError::InvalidInput {
                reason: format!("no source kinds given for {}", mirror_kind),
            });
        }
        for kind in source_kinds {
            if !store.has_record_kind(kind)? {
                return Err(ShadowError::UnknownRecordKind {
                    kind: kind.to_string(),
                });
            }
        }

        store.register_mirror_kind(mirror_kind, &options)?;

        for kind in source_kinds {
            let handler = Arc::new(MirrorSyncHandler::new(
                *kind,
                mirror_kind,
                self.notifier.clone(),
            ));
            store.subscribe(EventKind::Saved, kind, handler.clone());
            store.subscribe(EventKind::Deleting, kind, handler);
        }

        let sources: Vec<String> = source_kinds.iter().map(|k| k.to_string()).collect();
        self.definitions
            .entry(mirror_kind.to_string())
            .and_modify(|def| def.absorb(&sources, &options.consumer_kinds))
            .or_insert_with(|| RelationshipDefinition {
                source_kinds: sources.clone(),
                mirror_kind: mirror_kind.to_string(),
                consumer_kinds: options.consumer_kinds.clone(),
            });

        tracing::info!(
            mirror_kind = %mirror_kind,
            source_kinds = ?sources,
            "relationship registered"
        );
        Ok(())
    }

    /// Merged definition of a namespace
    pub fn definition(&self, mirror_kind: &str) -> Option<&RelationshipDefinition> {
        self.definitions.get(mirror_kind)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &RelationshipDefinition> {
        self.definitions.values()
    }

    /// Register every `[[relationship]]` from the config
    ///
    /// # Errors
    ///
    /// The first registration error, see [`Registry::register_relationship`].
    pub fn from_config(store: &dyn Store, config: &ShadowConfig, notifier: Notifier) -> Result<Self> {
        let mut registry = Self::with_notifier(notifier);
        for rel in &config.relationships {
            let sources: Vec<&str> = rel.source_kinds.iter().map(String::as_str).collect();
            registry.register_relationship(store, &sources, &rel.mirror_kind, rel.options())?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Record, RecordId};
    use crate::notify::RecordingObserver;
    use crate::resolver::resolve_node_for_record;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.register_record_kind("actor").unwrap();
        store.register_record_kind("director").unwrap();
        store.register_record_kind("movie").unwrap();
        store
    }

    #[test]
    fn test_registered_kind_mirrors_on_save() {
        let store = store();
        let mut registry = Registry::new();
        registry
            .register_relationship(&store, &["actor"], "_actor", MirrorOptions::default())
            .unwrap();

        store
            .save_record(Record::new(42, "actor", "Jane Doe").with_slug("jane-doe"))
            .unwrap();

        let record = store.get_record(RecordId(42)).unwrap().unwrap();
        let node = resolve_node_for_record(&store, &record, "_actor")
            .unwrap()
            .unwrap();
        assert_eq!(node.name, "Jane Doe");
    }

    #[test]
    fn test_reregistration_adds_source_kinds() {
        let store = store();
        let mut registry = Registry::new();
        let options = MirrorOptions {
            consumer_kinds: vec!["movie".to_string()],
            ..MirrorOptions::default()
        };
        registry
            .register_relationship(&store, &["actor"], "_people", options.clone())
            .unwrap();
        registry
            .register_relationship(&store, &["director"], "_people", options)
            .unwrap();

        let def = registry.definition("_people").unwrap();
        assert!(def.mirrors("actor"));
        assert!(def.mirrors("director"));
        assert_eq!(def.consumer_kinds, vec!["movie".to_string()]);

        store
            .save_record(Record::new(7, "director", "Ann Lee"))
            .unwrap();
        assert_eq!(store.node_count("_people"), 1);
    }

    #[test]
    fn test_unknown_source_kind_rejected() {
        let store = store();
        let mut registry = Registry::new();
        let err = registry
            .register_relationship(&store, &["ghost"], "_ghost", MirrorOptions::default())
            .unwrap_err();
        assert!(matches!(err, ShadowError::UnknownRecordKind { .. }));
        assert!(!store.has_mirror_kind("_ghost").unwrap());
    }

    #[test]
    fn test_from_config_uses_notifier() {
        let store = store();
        let config = ShadowConfig::from_toml_str(
            r#"
[[relationship]]
source_kinds = ["actor"]
mirror_kind = "_actor"
label = "Actors"
"#,
        )
        .unwrap();
        let observer = RecordingObserver::new();
        let registry =
            Registry::from_config(&store, &config, Notifier::new().with_observer(observer.clone()))
                .unwrap();

        assert!(registry.definition("_actor").is_some());
        assert_eq!(
            store.mirror_options("_actor").and_then(|o| o.label),
            Some("Actors".to_string())
        );

        store.save_record(Record::new(1, "actor", "Jane")).unwrap();
        store.delete_record(RecordId(1)).unwrap();
        assert_eq!(observer.names(), vec!["node_created", "node_deleted"]);
    }
}
