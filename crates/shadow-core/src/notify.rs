//! Notifications for external observers
//!
//! Emitted after each successful node mutation. Nothing inside the crate
//! consumes them.

use std::sync::{Arc, Mutex};

use crate::model::{Node, Record, RecordId};

#[derive(Debug, Clone, PartialEq)]
pub enum MirrorEvent {
    NodeCreated {
        node: Node,
        record_id: RecordId,
        mirror_kind: String,
    },
    NodeUpdated {
        node: Node,
        record: Record,
        mirror_kind: String,
    },
    NodeDeleted {
        node: Node,
        record_id: RecordId,
        mirror_kind: String,
    },
}

impl MirrorEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MirrorEvent::NodeCreated { .. } => "node_created",
            MirrorEvent::NodeUpdated { .. } => "node_updated",
            MirrorEvent::NodeDeleted { .. } => "node_deleted",
        }
    }

    pub fn node(&self) -> &Node {
        match self {
            MirrorEvent::NodeCreated { node, .. }
            | MirrorEvent::NodeUpdated { node, .. }
            | MirrorEvent::NodeDeleted { node, .. } => node,
        }
    }
}

pub trait MirrorObserver: Send + Sync {
    fn notify(&self, event: &MirrorEvent);
}

/// Fan-out to every attached observer
#[derive(Clone, Default)]
pub struct Notifier {
    observers: Vec<Arc<dyn MirrorObserver>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: Arc<dyn MirrorObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn attach(&mut self, observer: Arc<dyn MirrorObserver>) {
        self.observers.push(observer);
    }

    pub fn emit(&self, event: MirrorEvent) {
        tracing::debug!(
            component = module_path!(),
            notification = event.name(),
            node_id = event.node().id.0,
            mirror_kind = %event.node().mirror_kind
        );
        for observer in &self.observers {
            observer.notify(&event);
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Observer that keeps every event; for tests and diagnostics
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<MirrorEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<MirrorEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Names of the recorded events, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(MirrorEvent::name).collect()
    }
}

impl MirrorObserver for RecordingObserver {
    fn notify(&self, event: &MirrorEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
