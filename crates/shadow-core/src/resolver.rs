//! Record ↔ node lookups through pointer metadata
//!
//! Side-effect-free. "Not found" is `Ok(None)`; `Err` only carries store
//! failures. Callers that are about to mutate pass a freshly read record or
//! node, so these functions never cache.

use crate::errors::Result;
use crate::keys::{build_meta_key, PointerType};
use crate::model::{Node, NodeId, Record, RecordId};
use crate::store::Store;

/// Node the record's node pointer refers to, if it is live in `mirror_kind`
pub fn resolve_node_for_record(
    store: &dyn Store,
    record: &Record,
    mirror_kind: &str,
) -> Result<Option<Node>> {
    let key = build_meta_key(mirror_kind, PointerType::TermId);
    match record.metadata.pointer(&key) {
        Some(node_id) => store.get_node(mirror_kind, NodeId(node_id)),
        None => Ok(None),
    }
}

/// Record the node's record pointer refers to, if it is live and of `record_kind`
pub fn resolve_record_for_node(
    store: &dyn Store,
    node: &Node,
    record_kind: &str,
) -> Result<Option<Record>> {
    Ok(resolve_pointed_record(store, node)?.filter(|r| r.kind == record_kind))
}

/// Live record the node's record pointer refers to, whatever its kind
///
/// A namespace fed by several source kinds holds nodes owned by each of them.
pub fn resolve_pointed_record(store: &dyn Store, node: &Node) -> Result<Option<Record>> {
    let key = build_meta_key(&node.mirror_kind, PointerType::PostId);
    match node.metadata.pointer(&key) {
        Some(record_id) => store.get_record(RecordId(record_id)),
        None => Ok(None),
    }
}

/// Title as the store keeps it on a node
pub fn mirrored_name(record: &Record) -> &str {
    record.title.trim()
}

/// Explicit slug as the store keeps it on a node; blank counts as none
pub fn mirrored_slug(record: &Record) -> Option<&str> {
    record
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Name equals title and, when the record has a slug, slugs are equal
///
/// Compares against the trimmed forms the store writes.
pub fn fields_in_sync(node: &Node, record: &Record) -> bool {
    if node.name != mirrored_name(record) {
        return false;
    }
    match mirrored_slug(record) {
        Some(slug) if !node.slug.is_empty() => node.slug == slug,
        _ => true,
    }
}

/// Records of `consumer_kind` classified under `node`
pub fn associated_records(
    store: &dyn Store,
    node: &Node,
    consumer_kind: &str,
) -> Result<Vec<Record>> {
    Ok(store
        .records_in_node(&node.mirror_kind, node.id)?
        .into_iter()
        .filter(|r| r.kind == consumer_kind)
        .collect())
}

/// Nodes of `mirror_kind` the record is classified under
pub fn associated_nodes(
    store: &dyn Store,
    record: &Record,
    mirror_kind: &str,
) -> Result<Vec<Node>> {
    store.nodes_of_record(mirror_kind, record.id)
}
