//! Incremental sync: one record event in, at most one node mutation out
//!
//! Write events walk the states `no node` → create, `node in sync` → nothing,
//! `node out of sync` → update. A node whose own record pointer does not lead
//! back to the saved record is left untouched; only reconciliation repairs it.
//!
//! Nothing here propagates an error: a failed mirror write is logged and the
//! record stays eligible for the next reconciliation pass.

use std::time::Instant;

use crate::errors::{Result, ShadowError};
use crate::model::Record;
use crate::notify::Notifier;
use crate::primitives::{create_mirror_node, delete_mirror_node, update_mirror_node};
use crate::resolver::{fields_in_sync, resolve_node_for_record, resolve_record_for_node};
use crate::store::{RecordEvent, RecordEventHandler, Store};
use crate::{log_op_end, log_op_error, log_op_start};

/// What a single event did to the mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    Deleted,
    InSync,
    /// Kind not mirrored, placeholder status, or nothing to delete
    Ignored,
    /// The node's record pointer does not lead back to this record
    StalePointer,
    Failed,
}

/// Handler bound to one source kind and one mirror namespace
#[derive(Debug, Clone)]
pub struct MirrorSyncHandler {
    source_kind: String,
    mirror_kind: String,
    notifier: Notifier,
}

impl MirrorSyncHandler {
    pub fn new(
        source_kind: impl Into<String>,
        mirror_kind: impl Into<String>,
        notifier: Notifier,
    ) -> Self {
        Self {
            source_kind: source_kind.into(),
            mirror_kind: mirror_kind.into(),
            notifier,
        }
    }

    pub fn source_kind(&self) -> &str {
        &self.source_kind
    }

    pub fn mirror_kind(&self) -> &str {
        &self.mirror_kind
    }

    /// Apply one event and report what happened
    pub fn apply(&self, store: &dyn Store, event: &RecordEvent) -> SyncOutcome {
        let record = event.record();
        if record.kind != self.source_kind {
            return SyncOutcome::Ignored;
        }

        let start = Instant::now();
        let op = match event {
            RecordEvent::Saved(_) => "mirror_save",
            RecordEvent::Deleting(_) => "mirror_delete",
        };
        log_op_start!(
            op,
            record_id = record.id.0,
            mirror_kind = %self.mirror_kind
        );

        let result = match event {
            RecordEvent::Saved(record) => self.on_saved(store, record),
            RecordEvent::Deleting(record) => self.on_deleting(store, record),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(outcome) => {
                log_op_end!(
                    op,
                    duration_ms = duration_ms,
                    record_id = record.id.0,
                    outcome = ?outcome
                );
                outcome
            }
            Err(err) => {
                log_op_error!(op, &err, duration_ms = duration_ms, record_id = record.id.0);
                if err.is_mutation_failure() {
                    tracing::warn!(
                        record_id = record.id.0,
                        mirror_kind = %self.mirror_kind,
                        error = %err,
                        "mirror node not written; left for reconciliation"
                    );
                }
                SyncOutcome::Failed
            }
        }
    }

    fn on_saved(&self, store: &dyn Store, event_record: &Record) -> Result<SyncOutcome> {
        if event_record.status.is_placeholder() {
            return Ok(SyncOutcome::Ignored);
        }

        // Re-read: another subscriber may have touched the record already
        let record = store
            .get_record(event_record.id)?
            .ok_or(ShadowError::RecordNotFound {
                record_id: event_record.id.0,
            })?;

        let Some(node) = resolve_node_for_record(store, &record, &self.mirror_kind)? else {
            create_mirror_node(store, &record, &self.mirror_kind, &self.notifier)?;
            return Ok(SyncOutcome::Created);
        };

        let paired = resolve_record_for_node(store, &node, &self.source_kind)?;
        if paired.as_ref().map(|r| r.id) != Some(record.id) {
            tracing::warn!(
                record_id = record.id.0,
                node_id = node.id.0,
                mirror_kind = %self.mirror_kind,
                "node does not point back to record; skipping until reconciled"
            );
            return Ok(SyncOutcome::StalePointer);
        }

        if fields_in_sync(&node, &record) {
            return Ok(SyncOutcome::InSync);
        }

        update_mirror_node(store, &node, &record, &self.notifier)?;
        Ok(SyncOutcome::Updated)
    }

    fn on_deleting(&self, store: &dyn Store, record: &Record) -> Result<SyncOutcome> {
        match resolve_node_for_record(store, record, &self.mirror_kind)? {
            Some(node) => {
                delete_mirror_node(store, &node, Some(record.id), &self.notifier)?;
                Ok(SyncOutcome::Deleted)
            }
            None => Ok(SyncOutcome::Ignored),
        }
    }
}

impl RecordEventHandler for MirrorSyncHandler {
    fn handle(&self, store: &dyn Store, event: &RecordEvent) {
        self.apply(store, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MirrorOptions, RecordId, RecordStatus};
    use crate::notify::RecordingObserver;
    use crate::store::MemoryStore;

    fn setup() -> (MemoryStore, MirrorSyncHandler) {
        let store = MemoryStore::new();
        store.register_record_kind("actor").unwrap();
        store.register_record_kind("movie").unwrap();
        store
            .register_mirror_kind("_actor", &MirrorOptions::default())
            .unwrap();
        let handler = MirrorSyncHandler::new("actor", "_actor", Notifier::new());
        (store, handler)
    }

    fn saved(store: &MemoryStore, record: Record) -> RecordEvent {
        RecordEvent::Saved(store.save_record(record).unwrap())
    }

    #[test]
    fn test_other_kind_ignored() {
        let (store, handler) = setup();
        let event = saved(&store, Record::new(1, "movie", "Heat"));
        assert_eq!(handler.apply(&store, &event), SyncOutcome::Ignored);
        assert_eq!(store.node_count("_actor"), 0);
    }

    #[test]
    fn test_placeholder_ignored() {
        let (store, handler) = setup();
        let event = saved(
            &store,
            Record::new(1, "actor", "Auto Draft").with_status(RecordStatus::AutoDraft),
        );
        assert_eq!(handler.apply(&store, &event), SyncOutcome::Ignored);
        assert_eq!(store.node_count("_actor"), 0);
    }

    #[test]
    fn test_create_then_in_sync_then_update() {
        let (store, handler) = setup();
        let record = Record::new(42, "actor", "Jane Doe").with_slug("jane-doe");
        let event = saved(&store, record.clone());
        assert_eq!(handler.apply(&store, &event), SyncOutcome::Created);

        let event = saved(&store, record.clone());
        assert_eq!(handler.apply(&store, &event), SyncOutcome::InSync);

        let renamed = Record {
            title: "Jane A. Doe".to_string(),
            ..record
        };
        let event = saved(&store, renamed);
        assert_eq!(handler.apply(&store, &event), SyncOutcome::Updated);
    }

    #[test]
    fn test_padded_title_resave_is_in_sync() {
        let (store, handler) = setup();
        let record = Record::new(7, "actor", "Jane Doe ").with_slug(" jane-doe");
        let event = saved(&store, record.clone());
        assert_eq!(handler.apply(&store, &event), SyncOutcome::Created);

        let event = saved(&store, record);
        assert_eq!(handler.apply(&store, &event), SyncOutcome::InSync);
    }

    #[test]
    fn test_stale_pointer_is_left_alone() {
        let (store, handler) = setup();
        let event = saved(&store, Record::new(1, "actor", "Jane").with_slug("jane"));
        handler.apply(&store, &event);

        // Point the node at a record that does not exist
        let record = store.get_record(RecordId(1)).unwrap().unwrap();
        let node = resolve_node_for_record(&store, &record, "_actor")
            .unwrap()
            .unwrap();
        store
            .set_node_meta("_actor", node.id, "shadow__actor_post_id", serde_json::json!(999))
            .unwrap();

        let event = saved(&store, Record::new(1, "actor", "Renamed").with_slug("jane"));
        assert_eq!(handler.apply(&store, &event), SyncOutcome::StalePointer);
        let node = store.get_node("_actor", node.id).unwrap().unwrap();
        assert_eq!(node.name, "Jane");
    }

    #[test]
    fn test_collision_is_non_fatal_and_leaves_record_unlinked() {
        let (store, handler) = setup();
        store.insert_node("_actor", "Someone", Some("jane-doe")).unwrap();
        let event = saved(&store, Record::new(1, "actor", "Jane Doe").with_slug("jane-doe"));

        assert_eq!(handler.apply(&store, &event), SyncOutcome::Failed);
        let record = store.get_record(RecordId(1)).unwrap().unwrap();
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn test_delete_without_node_is_ignored() {
        let (store, handler) = setup();
        let record = store
            .save_record(Record::new(1, "actor", "Jane"))
            .unwrap();
        let outcome = handler.apply(&store, &RecordEvent::Deleting(record));
        assert_eq!(outcome, SyncOutcome::Ignored);
    }

    #[test]
    fn test_delete_emits_notification() {
        let store = MemoryStore::new();
        store.register_record_kind("actor").unwrap();
        store
            .register_mirror_kind("_actor", &MirrorOptions::default())
            .unwrap();
        let observer = RecordingObserver::new();
        let handler =
            MirrorSyncHandler::new("actor", "_actor", Notifier::new().with_observer(observer.clone()));

        let event = saved(&store, Record::new(1, "actor", "Jane"));
        handler.apply(&store, &event);
        let record = store.get_record(RecordId(1)).unwrap().unwrap();
        let outcome = handler.apply(&store, &RecordEvent::Deleting(record));

        assert_eq!(outcome, SyncOutcome::Deleted);
        assert_eq!(observer.names(), vec!["node_created", "node_deleted"]);
        assert_eq!(store.node_count("_actor"), 0);
    }
}
