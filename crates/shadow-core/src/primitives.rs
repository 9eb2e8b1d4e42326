//! Create/update/delete primitives shared by the event handler and the
//! reconciliation engine
//!
//! A full create writes, in order: the node, the node's record pointer, the
//! record's node pointer, and the record's membership in the node. If any
//! write after the node insert fails, the record's pointer and the node are
//! removed again so the record stays in the plain "no node" state.

use serde_json::Value;

use crate::errors::Result;
use crate::keys::{build_meta_key, PointerType};
use crate::model::{Node, NodeId, Record, RecordId};
use crate::notify::{MirrorEvent, Notifier};
use crate::store::Store;

/// Create the node mirroring `record` and link both pointers
///
/// # Errors
///
/// Mutation failures from the store (`DuplicateSlug`, `InvalidNodeName`) and
/// infrastructure failures. Nothing is left linked on error.
pub fn create_mirror_node(
    store: &dyn Store,
    record: &Record,
    mirror_kind: &str,
    notifier: &Notifier,
) -> Result<Node> {
    let node = store.insert_node(mirror_kind, &record.title, record.slug.as_deref())?;

    if let Err(err) = link(store, record.id, &node) {
        if let Err(rollback) = unlink(store, record.id, &node) {
            tracing::error!(
                component = module_path!(),
                node_id = node.id.0,
                record_id = record.id.0,
                error = %rollback,
                "failed to remove partially linked node"
            );
        }
        return Err(err);
    }

    let node = store.get_node(mirror_kind, node.id)?.unwrap_or(node);
    notifier.emit(MirrorEvent::NodeCreated {
        node: node.clone(),
        record_id: record.id,
        mirror_kind: mirror_kind.to_string(),
    });
    Ok(node)
}

fn link(store: &dyn Store, record_id: RecordId, node: &Node) -> Result<()> {
    write_node_pointer(store, &node.mirror_kind, node.id, record_id)?;
    write_record_pointer(store, record_id, node.id, &node.mirror_kind)?;
    store.classify(&node.mirror_kind, node.id, record_id)
}

/// Undo a partial `link`: drop the record's pointer if it names `node`, then the node
fn unlink(store: &dyn Store, record_id: RecordId, node: &Node) -> Result<()> {
    let key = build_meta_key(&node.mirror_kind, PointerType::TermId);
    let pointed = store
        .get_record(record_id)?
        .and_then(|record| record.metadata.pointer(&key));
    if pointed == Some(node.id.0) {
        store.delete_record_meta(record_id, &key)?;
    }
    store.delete_node(&node.mirror_kind, node.id)?;
    Ok(())
}

/// Copy the record's title and slug onto its node
pub fn update_mirror_node(
    store: &dyn Store,
    node: &Node,
    record: &Record,
    notifier: &Notifier,
) -> Result<Node> {
    let updated = store.update_node(
        &node.mirror_kind,
        node.id,
        &record.title,
        record.slug.as_deref(),
    )?;
    notifier.emit(MirrorEvent::NodeUpdated {
        node: updated.clone(),
        record: record.clone(),
        mirror_kind: node.mirror_kind.clone(),
    });
    Ok(updated)
}

/// Remove a node; emits `NodeDeleted` only when the node actually existed
pub fn delete_mirror_node(
    store: &dyn Store,
    node: &Node,
    record_id: Option<RecordId>,
    notifier: &Notifier,
) -> Result<bool> {
    let existed = store.delete_node(&node.mirror_kind, node.id)?;
    if existed {
        let record_id = record_id.unwrap_or_else(|| {
            RecordId(
                node.metadata
                    .pointer(&build_meta_key(&node.mirror_kind, PointerType::PostId))
                    .unwrap_or_default(),
            )
        });
        notifier.emit(MirrorEvent::NodeDeleted {
            node: node.clone(),
            record_id,
            mirror_kind: node.mirror_kind.clone(),
        });
    }
    Ok(existed)
}

/// Point the record at its node (record-side metadata)
pub fn write_record_pointer(
    store: &dyn Store,
    record_id: RecordId,
    node_id: NodeId,
    mirror_kind: &str,
) -> Result<()> {
    store.set_record_meta(
        record_id,
        &build_meta_key(mirror_kind, PointerType::TermId),
        Value::from(node_id.0),
    )
}

/// Point the node at its record (node-side metadata)
pub fn write_node_pointer(
    store: &dyn Store,
    mirror_kind: &str,
    node_id: NodeId,
    record_id: RecordId,
) -> Result<()> {
    store.set_node_meta(
        mirror_kind,
        node_id,
        &build_meta_key(mirror_kind, PointerType::PostId),
        Value::from(record_id.0),
    )
}
