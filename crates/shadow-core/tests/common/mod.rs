use std::sync::Arc;

use shadow_core::notify::RecordingObserver;
use shadow_core::resolver::resolve_node_for_record;
use shadow_core::{MemoryStore, MirrorOptions, Node, Notifier, Record, RecordId, Registry, Store};

/// Store with `actor` and `movie` kinds and nothing registered on `_actor`
#[allow(dead_code)]
pub fn bare_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.register_record_kind("actor").unwrap();
    store.register_record_kind("movie").unwrap();
    store
        .register_mirror_kind(
            "_actor",
            &MirrorOptions {
                label: Some("Actors".to_string()),
                consumer_kinds: vec!["movie".to_string()],
                public: false,
            },
        )
        .unwrap();
    store
}

/// Store with the actor → `_actor` relationship wired to live events
#[allow(dead_code)]
pub fn mirrored_store() -> (MemoryStore, Registry, Arc<RecordingObserver>) {
    let store = MemoryStore::new();
    store.register_record_kind("actor").unwrap();
    store.register_record_kind("movie").unwrap();
    let observer = RecordingObserver::new();
    let mut registry = Registry::with_notifier(Notifier::new().with_observer(observer.clone()));
    registry
        .register_relationship(
            &store,
            &["actor"],
            "_actor",
            MirrorOptions {
                label: Some("Actors".to_string()),
                consumer_kinds: vec!["movie".to_string()],
                public: false,
            },
        )
        .unwrap();
    (store, registry, observer)
}

/// Node the record currently points at, if any
#[allow(dead_code)]
pub fn node_of(store: &MemoryStore, id: u64) -> Option<Node> {
    let record = store.get_record(RecordId(id)).unwrap()?;
    resolve_node_for_record(store, &record, "_actor").unwrap()
}

/// Insert an actor without triggering any handler
#[allow(dead_code)]
pub fn put_actor(store: &MemoryStore, id: u64, title: &str) {
    store.put_record_silently(Record::new(id, "actor", title));
}
