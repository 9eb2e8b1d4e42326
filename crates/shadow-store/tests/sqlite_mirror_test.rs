// Live mirroring and reconciliation against the SQLite store

use serde_json::json;
use shadow_core::resolver::resolve_node_for_record;
use shadow_core::{
    check_node, check_record, reconcile, MirrorOptions, Node, Notifier, ReconcileMode,
    ReconcileOptions, Record, RecordId, Registry, Store,
};
use shadow_store::SqliteStore;

fn setup_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.register_record_kind("actor").unwrap();
    store.register_record_kind("movie").unwrap();
    store
}

fn register(store: &SqliteStore) -> Registry {
    let mut registry = Registry::new();
    registry
        .register_relationship(
            store,
            &["actor"],
            "_actor",
            MirrorOptions {
                label: Some("Actors".to_string()),
                consumer_kinds: vec!["movie".to_string()],
                public: false,
            },
        )
        .unwrap();
    registry
}

fn node_of(store: &SqliteStore, id: u64) -> Option<Node> {
    let record = store.get_record(RecordId(id)).unwrap()?;
    resolve_node_for_record(store, &record, "_actor").unwrap()
}

#[test]
fn test_save_rename_delete_keeps_one_node() {
    // Given: The actor relationship is registered
    let store = setup_store();
    let _registry = register(&store);

    // When: An actor is published
    let saved = store
        .save_record(Record::new(42, "actor", "Jane Doe").with_slug("jane-doe"))
        .unwrap();

    // Then: The returned record already carries the node pointer
    let node = node_of(&store, 42).expect("record should point at its node");
    assert_eq!(
        saved.metadata.pointer("shadow__actor_term_id"),
        Some(node.id.0)
    );
    assert_eq!(node.slug, "jane-doe");
    assert_eq!(store.node_count("_actor").unwrap(), 1);

    // When: The title changes
    store
        .save_record(Record::new(42, "actor", "Jane A. Doe").with_slug("jane-doe"))
        .unwrap();

    // Then: The same node is renamed
    let renamed = node_of(&store, 42).unwrap();
    assert_eq!(renamed.id, node.id);
    assert_eq!(renamed.name, "Jane A. Doe");
    assert!(check_record(&store, RecordId(42), "_actor").unwrap().passed());

    // When: The record is deleted
    store.delete_record(RecordId(42)).unwrap();

    // Then: The node is gone
    assert!(store.get_node("_actor", node.id).unwrap().is_none());
    assert_eq!(store.node_count("_actor").unwrap(), 0);
}

#[test]
fn test_reconcile_repairs_drift() {
    // Given: Records inserted before the relationship existed, plus an orphan
    let store = setup_store();
    store.save_record(Record::new(1, "actor", "Jane Doe")).unwrap();
    store.save_record(Record::new(2, "actor", "John Roe")).unwrap();
    let _registry = register(&store);
    let orphan = store.insert_node("_actor", "Ghost", None).unwrap();

    // When: A dry run is requested
    let dry = reconcile(
        &store,
        "actor",
        "_actor",
        ReconcileMode::Sync,
        ReconcileOptions::dry_run(),
        &Notifier::new(),
    )
    .unwrap();

    // Then: Nothing is written
    assert_eq!(dry.planned.create, 2);
    assert_eq!(dry.planned.delete, 1);
    assert_eq!(store.node_count("_actor").unwrap(), 1);

    // When: The live run follows
    let live = reconcile(
        &store,
        "actor",
        "_actor",
        ReconcileMode::Sync,
        ReconcileOptions::default(),
        &Notifier::new(),
    )
    .unwrap();

    // Then: Every record is paired and the orphan is gone
    assert_eq!(live.applied, dry.planned);
    assert!(store.get_node("_actor", orphan.id).unwrap().is_none());
    for id in [1, 2] {
        assert!(check_record(&store, RecordId(id), "_actor").unwrap().passed());
    }
}

#[test]
fn test_sync_terms_relinks_classified_node() {
    // Given: A node classified with a record but without pointers
    let store = setup_store();
    let _registry = register(&store);
    let node = store.insert_node("_actor", "Ann Lee", None).unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO records (id, kind, title, slug, status, updated_at)
             VALUES (3, 'actor', 'Ann Lee', NULL, 'publish', 0)",
            [],
        )
        .unwrap();
    store.classify("_actor", node.id, RecordId(3)).unwrap();

    // When: Mode B runs
    let report = reconcile(
        &store,
        "actor",
        "_actor",
        ReconcileMode::SyncTerms,
        ReconcileOptions::default(),
        &Notifier::new(),
    )
    .unwrap();

    // Then: Both pointers are repaired on the existing node
    assert_eq!(report.applied.repair_post_meta, 1);
    assert_eq!(report.applied.repair_term_meta, 1);
    assert_eq!(report.applied.create, 0);
    assert!(check_node(&store, node.id, "_actor", Some("actor"))
        .unwrap()
        .passed());
}

#[test]
fn test_string_pointers_are_honoured() {
    // Given: Pointers stored as numeric strings, the way hosts often write them
    let store = setup_store();
    let _registry = register(&store);
    store.save_record(Record::new(1, "actor", "Jane Doe")).unwrap();
    let node = node_of(&store, 1).unwrap();
    store
        .set_record_meta(RecordId(1), "shadow__actor_term_id", json!(node.id.0.to_string()))
        .unwrap();

    // Then: The pair still counts as linked
    let report = reconcile(
        &store,
        "actor",
        "_actor",
        ReconcileMode::Sync,
        ReconcileOptions::dry_run(),
        &Notifier::new(),
    )
    .unwrap();
    assert!(report.planned.is_empty());
}
