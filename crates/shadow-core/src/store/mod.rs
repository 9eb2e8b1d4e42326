//! Store collaborator contract
//!
//! The mirror never owns data. Everything it reads or writes goes through the
//! [`Store`] trait, which a host implements over its own persistence. Two
//! implementations ship with the workspace: [`MemoryStore`] here and the
//! SQLite store in `shadow-store`.
//!
//! All methods take `&self`: implementations use interior mutability and
//! release every internal borrow before dispatching events, so handlers may
//! call back into the store.

pub mod memory;

use std::cell::RefCell;
use std::sync::Arc;

use crate::errors::{Result, ShadowError};
use crate::model::{MirrorOptions, Node, NodeId, Record, RecordId};
use crate::slug::slugify;

pub use memory::MemoryStore;

/// One page of a paginated query, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn first(per_page: usize) -> Self {
        Self::new(1, per_page)
    }

    pub fn next(&self) -> Self {
        Self::new(self.page + 1, self.per_page)
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Result page; `has_more` tells the caller whether to request the next one
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Cut one page out of an already-ordered iterator
    pub fn paginate<I>(iter: I, request: PageRequest) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut rest = iter.into_iter().skip(request.offset());
        let items: Vec<T> = rest.by_ref().take(request.per_page).collect();
        let has_more = rest.next().is_some();
        Self { items, has_more }
    }
}

/// Record lifecycle events a handler can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// After a create or update committed
    Saved,
    /// Before a record is removed
    Deleting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    Saved(Record),
    Deleting(Record),
}

impl RecordEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RecordEvent::Saved(_) => EventKind::Saved,
            RecordEvent::Deleting(_) => EventKind::Deleting,
        }
    }

    pub fn record(&self) -> &Record {
        match self {
            RecordEvent::Saved(r) | RecordEvent::Deleting(r) => r,
        }
    }
}

/// Receiver of record lifecycle events
///
/// Handlers must not fail the triggering write, so `handle` returns nothing.
pub trait RecordEventHandler: Send + Sync {
    fn handle(&self, store: &dyn Store, event: &RecordEvent);
}

/// Capabilities the mirror requires from the host store
///
/// Reads return `Ok(None)` / empty collections for absence; `Err` is reserved
/// for validation failures, rejected mutations and infrastructure problems.
pub trait Store {
    // ----- registration -----

    fn register_record_kind(&self, kind: &str) -> Result<()>;

    fn has_record_kind(&self, kind: &str) -> Result<bool>;

    /// Register a classification namespace; re-registering replaces options
    fn register_mirror_kind(&self, mirror_kind: &str, options: &MirrorOptions) -> Result<()>;

    fn has_mirror_kind(&self, mirror_kind: &str) -> Result<bool>;

    // ----- records -----

    fn get_record(&self, id: RecordId) -> Result<Option<Record>>;

    /// Insert or update a record, then notify `Saved` subscribers
    ///
    /// Metadata entries on `record` are upserted; entries already stored
    /// under other keys are kept.
    ///
    /// # Errors
    ///
    /// `UnknownRecordKind` for an unregistered kind, `InvalidInput` for id 0.
    fn save_record(&self, record: Record) -> Result<Record>;

    /// Notify `Deleting` subscribers, then remove the record and its
    /// memberships. Returns whether the record existed.
    fn delete_record(&self, id: RecordId) -> Result<bool>;

    fn set_record_meta(&self, id: RecordId, key: &str, value: serde_json::Value) -> Result<()>;

    fn delete_record_meta(&self, id: RecordId, key: &str) -> Result<()>;

    /// Records of `kind` without a usable pointer under `key`, ordered by id
    fn records_missing_meta(
        &self,
        kind: &str,
        key: &str,
        page: PageRequest,
    ) -> Result<Page<Record>>;

    // ----- nodes -----

    fn get_node(&self, mirror_kind: &str, id: NodeId) -> Result<Option<Node>>;

    /// Create a node; a missing slug is derived from the name
    ///
    /// # Errors
    ///
    /// `DuplicateSlug` when the namespace already holds the slug,
    /// `InvalidNodeName` for an empty name, `UnknownMirrorKind`.
    fn insert_node(&self, mirror_kind: &str, name: &str, slug: Option<&str>) -> Result<Node>;

    /// # Errors
    ///
    /// Same as [`Store::insert_node`], plus `NodeNotFound`.
    fn update_node(
        &self,
        mirror_kind: &str,
        id: NodeId,
        name: &str,
        slug: Option<&str>,
    ) -> Result<Node>;

    /// Remove a node and its memberships. Returns whether it existed.
    fn delete_node(&self, mirror_kind: &str, id: NodeId) -> Result<bool>;

    fn set_node_meta(
        &self,
        mirror_kind: &str,
        id: NodeId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<()>;

    fn delete_node_meta(&self, mirror_kind: &str, id: NodeId, key: &str) -> Result<()>;

    /// All nodes of a namespace, ordered by id
    fn list_nodes(&self, mirror_kind: &str, page: PageRequest) -> Result<Page<Node>>;

    fn find_node_by_slug(&self, mirror_kind: &str, slug: &str) -> Result<Option<Node>>;

    // ----- native membership -----

    /// Classify a record under a node (no-op when already classified)
    fn classify(&self, mirror_kind: &str, node_id: NodeId, record_id: RecordId) -> Result<()>;

    fn nodes_of_record(&self, mirror_kind: &str, record_id: RecordId) -> Result<Vec<Node>>;

    fn records_in_node(&self, mirror_kind: &str, node_id: NodeId) -> Result<Vec<Record>>;

    // ----- events -----

    fn subscribe(
        &self,
        event: EventKind,
        record_kind: &str,
        handler: Arc<dyn RecordEventHandler>,
    );
}

/// Validate a node name and settle its slug
///
/// Shared by the store implementations so both reject the same input. An
/// explicit slug is kept as given (trimmed); a missing one is derived from the
/// name.
///
/// # Errors
///
/// `InvalidNodeName` when the name is blank or yields no usable slug.
pub fn prepare_node_fields(name: &str, slug: Option<&str>) -> Result<(String, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShadowError::InvalidNodeName {
            reason: "Name cannot be empty or whitespace-only".to_string(),
        });
    }
    let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => slugify(name),
    };
    if slug.is_empty() {
        return Err(ShadowError::InvalidNodeName {
            reason: format!("Name '{}' yields an empty slug", name),
        });
    }
    Ok((name.to_string(), slug))
}

struct Subscription {
    event: EventKind,
    record_kind: String,
    handler: Arc<dyn RecordEventHandler>,
}

/// Subscriber list shared by the store implementations
#[derive(Default)]
pub struct Subscribers {
    entries: RefCell<Vec<Subscription>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, event: EventKind, record_kind: &str, handler: Arc<dyn RecordEventHandler>) {
        self.entries.borrow_mut().push(Subscription {
            event,
            record_kind: record_kind.to_string(),
            handler,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Deliver `event` to every matching handler, in subscription order
    ///
    /// The list is cloned first so handlers can subscribe or write re-entrantly.
    pub fn dispatch(&self, store: &dyn Store, event: &RecordEvent) {
        let kind = event.kind();
        let record_kind = &event.record().kind;
        let matching: Vec<Arc<dyn RecordEventHandler>> = self
            .entries
            .borrow()
            .iter()
            .filter(|s| s.event == kind && &s.record_kind == record_kind)
            .map(|s| s.handler.clone())
            .collect();

        for handler in matching {
            handler.handle(store, event);
        }
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .finish()
    }
}
