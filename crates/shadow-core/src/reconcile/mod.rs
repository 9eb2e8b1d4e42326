//! Batch reconciliation
//!
//! Three modes share one pipeline: a paginated scan buckets ids by action,
//! then (unless dry-run) each item is re-read, re-classified and repaired.
//!
//! - [`ReconcileMode::Sync`] creates missing nodes and deletes orphans.
//! - [`ReconcileMode::SyncTerms`] also consults native membership, so a pair
//!   that lost only a pointer gets the pointer back instead of a new node.
//! - [`ReconcileMode::DeepSync`] only creates, and only when no node in the
//!   namespace already carries the record's slug.
//!
//! Per-item failures are collected in the report; only validation of the
//! kinds and store failures during the scan abort a pass.

mod apply;
pub mod plan;
pub mod report;

use std::fmt;
use std::time::Instant;

use serde::Serialize;
use shadow_core_types::RequestContext;

use crate::errors::{Result, ShadowError};
use crate::notify::Notifier;
use crate::store::Store;
use crate::{log_op_end, log_op_error, log_op_start};

pub use plan::{ActionPlan, NodeAction, RecordAction};
pub use report::{Action, ActionCounts, ReconcileReport, SkippedItem};

/// Page size for every scan
pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileMode {
    /// Mode A
    Sync,
    /// Mode B, the metadata-aware migration
    SyncTerms,
    /// Mode C, slug-guarded creation only
    DeepSync,
}

impl ReconcileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileMode::Sync => "sync",
            ReconcileMode::SyncTerms => "sync-terms",
            ReconcileMode::DeepSync => "deep-sync",
        }
    }

    /// Action categories this mode can produce, in report order
    pub fn actions(&self) -> &'static [Action] {
        match self {
            ReconcileMode::Sync => &[Action::Create, Action::Delete],
            ReconcileMode::SyncTerms => &[
                Action::Create,
                Action::Delete,
                Action::RepairTermMeta,
                Action::RepairPostMeta,
            ],
            ReconcileMode::DeepSync => &[Action::Create],
        }
    }

    pub fn scans_nodes(&self) -> bool {
        !matches!(self, ReconcileMode::DeepSync)
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Plan and count only
    pub dry_run: bool,
    /// Log each mutation at INFO instead of DEBUG
    pub verbose: bool,
}

impl ReconcileOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Run one reconciliation pass of `source_kind` against `mirror_kind`
///
/// # Errors
///
/// `UnknownRecordKind` / `UnknownMirrorKind` before anything is read, and
/// store failures during the scan. Failures while applying individual items
/// are reported in [`ReconcileReport::skipped`] instead.
pub fn reconcile(
    store: &dyn Store,
    source_kind: &str,
    mirror_kind: &str,
    mode: ReconcileMode,
    options: ReconcileOptions,
    notifier: &Notifier,
) -> Result<ReconcileReport> {
    reconcile_with_context(
        store,
        source_kind,
        mirror_kind,
        mode,
        options,
        notifier,
        &RequestContext::new(),
    )
}

/// [`reconcile`] under a caller-supplied correlation context
///
/// The pass logs `ctx`'s request id and, when set, its trace id, so several
/// passes started by one invocation can be joined.
pub fn reconcile_with_context(
    store: &dyn Store,
    source_kind: &str,
    mirror_kind: &str,
    mode: ReconcileMode,
    options: ReconcileOptions,
    notifier: &Notifier,
    ctx: &RequestContext,
) -> Result<ReconcileReport> {
    let trace_id = ctx.trace_id.as_ref().map(|t| t.as_str());
    let span = tracing::info_span!(
        "reconcile",
        request_id = %ctx.request_id,
        trace_id = trace_id,
        mode = %mode,
        mirror_kind = %mirror_kind
    );
    let _guard = span.enter();

    let start = Instant::now();
    log_op_start!(
        "reconcile",
        request_id = %ctx.request_id,
        trace_id = trace_id,
        record_kind = %source_kind,
        mirror_kind = %mirror_kind,
        mode = %mode,
        dry_run = options.dry_run
    );

    let result = run(store, source_kind, mirror_kind, mode, options, notifier);

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(report) => {
            log_op_end!(
                "reconcile",
                duration_ms = duration_ms,
                planned = report.planned.total(),
                applied = report.applied.total(),
                skipped = report.skipped.len()
            );
        }
        Err(err) => {
            log_op_error!("reconcile", err, duration_ms = duration_ms);
        }
    }
    result
}

fn run(
    store: &dyn Store,
    source_kind: &str,
    mirror_kind: &str,
    mode: ReconcileMode,
    options: ReconcileOptions,
    notifier: &Notifier,
) -> Result<ReconcileReport> {
    if !store.has_record_kind(source_kind)? {
        return Err(ShadowError::UnknownRecordKind {
            kind: source_kind.to_string(),
        });
    }
    if !store.has_mirror_kind(mirror_kind)? {
        return Err(ShadowError::UnknownMirrorKind {
            mirror_kind: mirror_kind.to_string(),
        });
    }

    let plan = plan::scan(store, source_kind, mirror_kind, mode)?;
    let mut report = ReconcileReport::new(mode, options.dry_run);
    report.planned = plan.counts();

    if options.dry_run || plan.is_empty() {
        return Ok(report);
    }

    apply::Applier {
        store,
        source_kind,
        mirror_kind,
        mode,
        options,
        notifier,
    }
    .apply(&plan, &mut report);

    Ok(report)
}
