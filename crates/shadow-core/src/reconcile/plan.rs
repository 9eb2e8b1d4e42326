//! Scan phase: walk both collections page by page and bucket ids by action
//!
//! The same classification functions run again in the apply phase on freshly
//! read entities, so an item that changed between scan and apply is judged on
//! its current state.

use super::report::{Action, ActionCounts};
use super::{ReconcileMode, PAGE_SIZE};
use crate::errors::Result;
use crate::keys::MetaKeys;
use crate::model::{Node, NodeId, Record, RecordId};
use crate::resolver::{mirrored_slug, resolve_node_for_record, resolve_pointed_record};
use crate::slug::slugify;
use crate::store::{PageRequest, Store};

/// What a candidate record needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Create,
    /// Natively classified under this node; only the record's pointer is missing
    RepairPostMeta(NodeId),
    Nothing,
}

/// What a node needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Delete,
    /// A source record is classified under the node; only the node's pointer is missing
    RepairTermMeta(RecordId),
    Nothing,
}

impl RecordAction {
    pub fn action(&self) -> Option<Action> {
        match self {
            RecordAction::Create => Some(Action::Create),
            RecordAction::RepairPostMeta(_) => Some(Action::RepairPostMeta),
            RecordAction::Nothing => None,
        }
    }
}

impl NodeAction {
    pub fn action(&self) -> Option<Action> {
        match self {
            NodeAction::Delete => Some(Action::Delete),
            NodeAction::RepairTermMeta(_) => Some(Action::RepairTermMeta),
            NodeAction::Nothing => None,
        }
    }
}

/// Id buckets produced by a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPlan {
    pub create: Vec<RecordId>,
    pub repair_post_meta: Vec<(RecordId, NodeId)>,
    pub delete: Vec<NodeId>,
    pub repair_term_meta: Vec<(NodeId, RecordId)>,
}

impl ActionPlan {
    pub fn counts(&self) -> ActionCounts {
        ActionCounts {
            create: self.create.len(),
            delete: self.delete.len(),
            repair_term_meta: self.repair_term_meta.len(),
            repair_post_meta: self.repair_post_meta.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().is_empty()
    }
}

/// Decide what a record needs under `mode`
pub fn classify_record(
    store: &dyn Store,
    record: &Record,
    mirror_kind: &str,
    mode: ReconcileMode,
) -> Result<RecordAction> {
    if record.status.is_placeholder() {
        return Ok(RecordAction::Nothing);
    }
    if resolve_node_for_record(store, record, mirror_kind)?.is_some() {
        return Ok(RecordAction::Nothing);
    }

    match mode {
        ReconcileMode::Sync => Ok(RecordAction::Create),
        ReconcileMode::SyncTerms => {
            let keys = MetaKeys::for_mirror(mirror_kind);
            // A node already claimed by another record is not this record's node
            let owned = store
                .nodes_of_record(mirror_kind, record.id)?
                .into_iter()
                .find(|node| match node.metadata.pointer(&keys.record_pointer) {
                    Some(owner) => owner == record.id.0,
                    None => true,
                });
            Ok(match owned {
                Some(node) => RecordAction::RepairPostMeta(node.id),
                None => RecordAction::Create,
            })
        }
        ReconcileMode::DeepSync => {
            let slug = effective_slug(record);
            if store.find_node_by_slug(mirror_kind, &slug)?.is_some() {
                Ok(RecordAction::Nothing)
            } else {
                Ok(RecordAction::Create)
            }
        }
    }
}

/// Decide what a node needs under `mode`
pub fn classify_node(
    store: &dyn Store,
    node: &Node,
    source_kind: &str,
    mode: ReconcileMode,
) -> Result<NodeAction> {
    // Owned by a live record of any kind: the namespace may have other sources
    if resolve_pointed_record(store, node)?.is_some() {
        return Ok(NodeAction::Nothing);
    }

    match mode {
        ReconcileMode::Sync => Ok(NodeAction::Delete),
        ReconcileMode::SyncTerms => {
            let keys = MetaKeys::for_mirror(&node.mirror_kind);
            let members = store.records_in_node(&node.mirror_kind, node.id)?;
            if let Some(record) = members.iter().find(|r| r.kind == source_kind) {
                return Ok(NodeAction::RepairTermMeta(record.id));
            }
            let claimed = members
                .iter()
                .any(|r| r.metadata.pointer(&keys.node_pointer) == Some(node.id.0));
            Ok(if claimed {
                NodeAction::Nothing
            } else {
                NodeAction::Delete
            })
        }
        ReconcileMode::DeepSync => Ok(NodeAction::Nothing),
    }
}

/// Slug a node created for `record` would get
pub fn effective_slug(record: &Record) -> String {
    match mirrored_slug(record) {
        Some(slug) => slug.to_string(),
        None => slugify(&record.title),
    }
}

/// Paginated scan of candidate records and, where the mode looks at them, nodes
pub fn scan(
    store: &dyn Store,
    source_kind: &str,
    mirror_kind: &str,
    mode: ReconcileMode,
) -> Result<ActionPlan> {
    let keys = MetaKeys::for_mirror(mirror_kind);
    let mut plan = ActionPlan::default();

    let mut request = PageRequest::first(PAGE_SIZE);
    loop {
        let page = store.records_missing_meta(source_kind, &keys.node_pointer, request)?;
        for record in &page.items {
            match classify_record(store, record, mirror_kind, mode)? {
                RecordAction::Create => plan.create.push(record.id),
                RecordAction::RepairPostMeta(node_id) => {
                    plan.repair_post_meta.push((record.id, node_id))
                }
                RecordAction::Nothing => {}
            }
        }
        if !page.has_more {
            break;
        }
        request = request.next();
    }

    if mode.scans_nodes() {
        let mut request = PageRequest::first(PAGE_SIZE);
        loop {
            let page = store.list_nodes(mirror_kind, request)?;
            for node in &page.items {
                match classify_node(store, node, source_kind, mode)? {
                    NodeAction::Delete => plan.delete.push(node.id),
                    NodeAction::RepairTermMeta(record_id) => {
                        plan.repair_term_meta.push((node.id, record_id))
                    }
                    NodeAction::Nothing => {}
                }
            }
            if !page.has_more {
                break;
            }
            request = request.next();
        }
    }

    tracing::debug!(
        mirror_kind = %mirror_kind,
        mode = %mode,
        create = plan.create.len(),
        delete = plan.delete.len(),
        repair_term_meta = plan.repair_term_meta.len(),
        repair_post_meta = plan.repair_post_meta.len(),
        "scan complete"
    );
    Ok(plan)
}
