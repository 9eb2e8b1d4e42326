//! Shadow Core - record/node mirror synchronization
//!
//! Keeps a 1:1 mirror between records of a source kind and nodes of a
//! classification namespace, linked by two pointer metadata entries:
//! - Incremental sync on every record save/delete (`handler`)
//! - Batch reconciliation with dry-run, in three modes (`reconcile`)
//! - Read-only single pair checks (`check`)
//! - The `Store` contract plus an in-memory implementation (`store`)

pub mod check;
pub mod config;
pub mod errors;
pub mod handler;
pub mod keys;
pub mod logging_facility;
pub mod model;
pub mod notify;
pub mod primitives;
pub mod reconcile;
pub mod registry;
pub mod resolver;
pub mod slug;
pub mod store;

// Re-export commonly used types
pub use check::{check_node, check_record, CheckProblem, CheckReport};
pub use config::ShadowConfig;
pub use errors::{ExError, ExErrorKind, Result, ShadowError};
pub use handler::{MirrorSyncHandler, SyncOutcome};
pub use keys::{build_meta_key, MetaKeys, PointerType};
pub use model::{Metadata, MirrorOptions, Node, NodeId, Record, RecordId, RecordStatus};
pub use notify::{MirrorEvent, MirrorObserver, Notifier};
pub use reconcile::{
    reconcile, reconcile_with_context, ReconcileMode, ReconcileOptions, ReconcileReport,
};
pub use registry::Registry;
pub use store::{MemoryStore, Store};
