use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::{
    prepare_node_fields, EventKind, Page, PageRequest, RecordEvent, RecordEventHandler, Store,
    Subscribers,
};
use crate::errors::{Result, ShadowError};
use crate::model::{MirrorOptions, Node, NodeId, Record, RecordId};

#[derive(Debug, Default)]
struct MemoryState {
    record_kinds: BTreeSet<String>,
    mirrors: BTreeMap<String, MirrorOptions>,
    records: BTreeMap<RecordId, Record>,
    nodes: BTreeMap<NodeId, Node>,
    /// (mirror kind, node, record)
    memberships: BTreeSet<(String, NodeId, RecordId)>,
    next_node_id: u64,
}

impl MemoryState {
    fn require_mirror(&self, mirror_kind: &str) -> Result<()> {
        if self.mirrors.contains_key(mirror_kind) {
            Ok(())
        } else {
            Err(ShadowError::UnknownMirrorKind {
                mirror_kind: mirror_kind.to_string(),
            })
        }
    }

    fn node_in(&self, mirror_kind: &str, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).filter(|n| n.mirror_kind == mirror_kind)
    }

    fn node_in_mut(&mut self, mirror_kind: &str, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(&id)
            .filter(|n| n.mirror_kind == mirror_kind)
            .ok_or_else(|| ShadowError::NodeNotFound {
                node_id: id.0,
                mirror_kind: mirror_kind.to_string(),
            })
    }

    fn slug_taken(&self, mirror_kind: &str, slug: &str, except: Option<NodeId>) -> bool {
        self.nodes
            .values()
            .any(|n| n.mirror_kind == mirror_kind && n.slug == slug && Some(n.id) != except)
    }
}

/// In-memory store
///
/// A map-backed implementation of [`Store`] for tests and embedders that keep
/// their collections in process. Not thread-safe: interior mutability is a
/// `RefCell`, matching the single-threaded scheduling model.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<MemoryState>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.state.borrow().records.len()
    }

    /// Number of nodes in one namespace
    pub fn node_count(&self, mirror_kind: &str) -> usize {
        self.state
            .borrow()
            .nodes
            .values()
            .filter(|n| n.mirror_kind == mirror_kind)
            .count()
    }

    pub fn mirror_options(&self, mirror_kind: &str) -> Option<MirrorOptions> {
        self.state.borrow().mirrors.get(mirror_kind).cloned()
    }

    /// Insert or replace a record without notifying subscribers
    ///
    /// Test helper for staging drift the event path would never produce.
    pub fn put_record_silently(&self, record: Record) {
        self.state.borrow_mut().records.insert(record.id, record);
    }
}

impl Store for MemoryStore {
    fn register_record_kind(&self, kind: &str) -> Result<()> {
        self.state.borrow_mut().record_kinds.insert(kind.to_string());
        Ok(())
    }

    fn has_record_kind(&self, kind: &str) -> Result<bool> {
        Ok(self.state.borrow().record_kinds.contains(kind))
    }

    fn register_mirror_kind(&self, mirror_kind: &str, options: &MirrorOptions) -> Result<()> {
        self.state
            .borrow_mut()
            .mirrors
            .insert(mirror_kind.to_string(), options.clone());
        Ok(())
    }

    fn has_mirror_kind(&self, mirror_kind: &str) -> Result<bool> {
        Ok(self.state.borrow().mirrors.contains_key(mirror_kind))
    }

    fn get_record(&self, id: RecordId) -> Result<Option<Record>> {
        Ok(self.state.borrow().records.get(&id).cloned())
    }

    fn save_record(&self, record: Record) -> Result<Record> {
        if record.id.0 == 0 {
            return Err(ShadowError::InvalidInput {
                reason: "Record id must be positive".to_string(),
            });
        }

        let saved = {
            let mut state = self.state.borrow_mut();
            if !state.record_kinds.contains(&record.kind) {
                return Err(ShadowError::UnknownRecordKind { kind: record.kind });
            }
            let merged = match state.records.remove(&record.id) {
                Some(mut existing) => {
                    for key in record.metadata.keys() {
                        if let Some(value) = record.metadata.get(key) {
                            existing.metadata.set(key.clone(), value.clone());
                        }
                    }
                    Record {
                        metadata: existing.metadata,
                        ..record
                    }
                }
                None => record,
            };
            state.records.insert(merged.id, merged.clone());
            merged
        };

        self.subscribers
            .dispatch(self, &RecordEvent::Saved(saved.clone()));

        // Handlers may have attached metadata; hand back the committed state
        Ok(self.get_record(saved.id)?.unwrap_or(saved))
    }

    fn delete_record(&self, id: RecordId) -> Result<bool> {
        let Some(record) = self.get_record(id)? else {
            return Ok(false);
        };

        self.subscribers
            .dispatch(self, &RecordEvent::Deleting(record));

        let mut state = self.state.borrow_mut();
        state.records.remove(&id);
        state.memberships.retain(|(_, _, r)| *r != id);
        Ok(true)
    }

    fn set_record_meta(&self, id: RecordId, key: &str, value: serde_json::Value) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let record = state
            .records
            .get_mut(&id)
            .ok_or(ShadowError::RecordNotFound { record_id: id.0 })?;
        record.metadata.set(key, value);
        Ok(())
    }

    fn delete_record_meta(&self, id: RecordId, key: &str) -> Result<()> {
        if let Some(record) = self.state.borrow_mut().records.get_mut(&id) {
            record.metadata.remove(key);
        }
        Ok(())
    }

    fn records_missing_meta(
        &self,
        kind: &str,
        key: &str,
        page: PageRequest,
    ) -> Result<Page<Record>> {
        let state = self.state.borrow();
        let matching = state
            .records
            .values()
            .filter(|r| r.kind == kind && r.metadata.pointer(key).is_none())
            .cloned();
        Ok(Page::paginate(matching, page))
    }

    fn get_node(&self, mirror_kind: &str, id: NodeId) -> Result<Option<Node>> {
        Ok(self.state.borrow().node_in(mirror_kind, id).cloned())
    }

    fn insert_node(&self, mirror_kind: &str, name: &str, slug: Option<&str>) -> Result<Node> {
        let mut state = self.state.borrow_mut();
        state.require_mirror(mirror_kind)?;
        let (name, slug) = prepare_node_fields(name, slug)?;
        if state.slug_taken(mirror_kind, &slug, None) {
            return Err(ShadowError::DuplicateSlug {
                mirror_kind: mirror_kind.to_string(),
                slug,
            });
        }

        state.next_node_id += 1;
        let node = Node::new(state.next_node_id, mirror_kind, name, slug);
        state.nodes.insert(node.id, node.clone());
        Ok(node)
    }

    fn update_node(
        &self,
        mirror_kind: &str,
        id: NodeId,
        name: &str,
        slug: Option<&str>,
    ) -> Result<Node> {
        let mut state = self.state.borrow_mut();
        let (name, slug) = prepare_node_fields(name, slug)?;
        if state.slug_taken(mirror_kind, &slug, Some(id)) {
            return Err(ShadowError::DuplicateSlug {
                mirror_kind: mirror_kind.to_string(),
                slug,
            });
        }

        let node = state.node_in_mut(mirror_kind, id)?;
        node.name = name;
        node.slug = slug;
        Ok(node.clone())
    }

    fn delete_node(&self, mirror_kind: &str, id: NodeId) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        if state.node_in(mirror_kind, id).is_none() {
            return Ok(false);
        }
        state.nodes.remove(&id);
        state.memberships.retain(|(_, n, _)| *n != id);
        Ok(true)
    }

    fn set_node_meta(
        &self,
        mirror_kind: &str,
        id: NodeId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.node_in_mut(mirror_kind, id)?.metadata.set(key, value);
        Ok(())
    }

    fn delete_node_meta(&self, mirror_kind: &str, id: NodeId, key: &str) -> Result<()> {
        if let Ok(node) = self.state.borrow_mut().node_in_mut(mirror_kind, id) {
            node.metadata.remove(key);
        }
        Ok(())
    }

    fn list_nodes(&self, mirror_kind: &str, page: PageRequest) -> Result<Page<Node>> {
        let state = self.state.borrow();
        let nodes = state
            .nodes
            .values()
            .filter(|n| n.mirror_kind == mirror_kind)
            .cloned();
        Ok(Page::paginate(nodes, page))
    }

    fn find_node_by_slug(&self, mirror_kind: &str, slug: &str) -> Result<Option<Node>> {
        Ok(self
            .state
            .borrow()
            .nodes
            .values()
            .find(|n| n.mirror_kind == mirror_kind && n.slug == slug)
            .cloned())
    }

    fn classify(&self, mirror_kind: &str, node_id: NodeId, record_id: RecordId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.node_in(mirror_kind, node_id).is_none() {
            return Err(ShadowError::NodeNotFound {
                node_id: node_id.0,
                mirror_kind: mirror_kind.to_string(),
            });
        }
        if !state.records.contains_key(&record_id) {
            return Err(ShadowError::RecordNotFound {
                record_id: record_id.0,
            });
        }
        state
            .memberships
            .insert((mirror_kind.to_string(), node_id, record_id));
        Ok(())
    }

    fn nodes_of_record(&self, mirror_kind: &str, record_id: RecordId) -> Result<Vec<Node>> {
        let state = self.state.borrow();
        Ok(state
            .memberships
            .iter()
            .filter(|(m, _, r)| m == mirror_kind && *r == record_id)
            .filter_map(|(_, n, _)| state.node_in(mirror_kind, *n).cloned())
            .collect())
    }

    fn records_in_node(&self, mirror_kind: &str, node_id: NodeId) -> Result<Vec<Record>> {
        let state = self.state.borrow();
        Ok(state
            .memberships
            .iter()
            .filter(|(m, n, _)| m == mirror_kind && *n == node_id)
            .filter_map(|(_, _, r)| state.records.get(r).cloned())
            .collect())
    }

    fn subscribe(
        &self,
        event: EventKind,
        record_kind: &str,
        handler: Arc<dyn RecordEventHandler>,
    ) {
        self.subscribers.add(event, record_kind, handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with_kinds() -> MemoryStore {
        let store = MemoryStore::new();
        store.register_record_kind("actor").unwrap();
        store
            .register_mirror_kind("_actor", &MirrorOptions::default())
            .unwrap();
        store
    }

    #[test]
    fn test_save_requires_registered_kind() {
        let store = MemoryStore::new();
        let result = store.save_record(Record::new(1, "actor", "Jane"));
        assert!(matches!(result, Err(ShadowError::UnknownRecordKind { .. })));
    }

    #[test]
    fn test_save_rejects_zero_id() {
        let store = store_with_kinds();
        let result = store.save_record(Record::new(0, "actor", "Jane"));
        assert!(matches!(result, Err(ShadowError::InvalidInput { .. })));
    }

    #[test]
    fn test_save_keeps_existing_metadata() {
        let store = store_with_kinds();
        store.save_record(Record::new(1, "actor", "Jane")).unwrap();
        store
            .set_record_meta(RecordId(1), "shadow__actor_term_id", json!(5))
            .unwrap();

        // A stale copy without the pointer must not erase it
        let saved = store
            .save_record(Record::new(1, "actor", "Jane Doe"))
            .unwrap();
        assert_eq!(saved.title, "Jane Doe");
        assert_eq!(saved.metadata.pointer("shadow__actor_term_id"), Some(5));
    }

    #[test]
    fn test_insert_node_rejects_duplicate_slug_per_namespace() {
        let store = store_with_kinds();
        store
            .register_mirror_kind("_genre", &MirrorOptions::default())
            .unwrap();

        store.insert_node("_actor", "Jane Doe", None).unwrap();
        let dup = store.insert_node("_actor", "Someone", Some("jane-doe"));
        assert!(matches!(dup, Err(ShadowError::DuplicateSlug { .. })));

        // Other namespaces are independent
        assert!(store.insert_node("_genre", "Jane Doe", None).is_ok());
    }

    #[test]
    fn test_insert_node_unknown_mirror() {
        let store = store_with_kinds();
        let result = store.insert_node("_nope", "Jane", None);
        assert!(matches!(result, Err(ShadowError::UnknownMirrorKind { .. })));
    }

    #[test]
    fn test_get_node_is_scoped_to_namespace() {
        let store = store_with_kinds();
        store
            .register_mirror_kind("_genre", &MirrorOptions::default())
            .unwrap();
        let node = store.insert_node("_actor", "Jane", None).unwrap();

        assert!(store.get_node("_actor", node.id).unwrap().is_some());
        assert!(store.get_node("_genre", node.id).unwrap().is_none());
    }

    #[test]
    fn test_update_node_may_keep_own_slug() {
        let store = store_with_kinds();
        let node = store.insert_node("_actor", "Jane", Some("jane")).unwrap();
        let updated = store
            .update_node("_actor", node.id, "Jane D", Some("jane"))
            .unwrap();
        assert_eq!(updated.name, "Jane D");
    }

    #[test]
    fn test_missing_meta_paginates_in_id_order() {
        let store = store_with_kinds();
        for id in 1..=5 {
            store
                .save_record(Record::new(id, "actor", format!("A{}", id)))
                .unwrap();
        }
        store
            .set_record_meta(RecordId(2), "k", json!(9))
            .unwrap();
        store
            .set_record_meta(RecordId(3), "k", json!(0))
            .unwrap();

        let first = store
            .records_missing_meta("actor", "k", PageRequest::new(1, 2))
            .unwrap();
        let ids: Vec<u64> = first.items.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(first.has_more);

        let second = store
            .records_missing_meta("actor", "k", PageRequest::new(2, 2))
            .unwrap();
        let ids: Vec<u64> = second.items.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![4, 5]);
        assert!(!second.has_more);
    }

    #[test]
    fn test_membership_is_removed_with_either_side() {
        let store = store_with_kinds();
        store.save_record(Record::new(1, "actor", "Jane")).unwrap();
        let node = store.insert_node("_actor", "Jane", None).unwrap();
        store.classify("_actor", node.id, RecordId(1)).unwrap();
        store.classify("_actor", node.id, RecordId(1)).unwrap();

        assert_eq!(store.records_in_node("_actor", node.id).unwrap().len(), 1);
        assert_eq!(store.nodes_of_record("_actor", RecordId(1)).unwrap().len(), 1);

        store.delete_record(RecordId(1)).unwrap();
        assert!(store.records_in_node("_actor", node.id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_record_is_false() {
        let store = store_with_kinds();
        assert!(!store.delete_record(RecordId(99)).unwrap());
        assert!(!store.delete_node("_actor", NodeId(99)).unwrap());
    }
}
