//! Apply phase: re-read, re-classify, then mutate one item at a time
//!
//! Order is repairs, deletes, creates: removing an orphan can free the slug a
//! pending create needs. Each item is executed according to its classification
//! at apply time, not the one recorded by the scan.

use shadow_core_types::schema::{EVENT_MUTATION, EVENT_SKIPPED};

use super::plan::{classify_node, classify_record, ActionPlan, NodeAction, RecordAction};
use super::report::{Action, ReconcileReport, SkippedItem};
use super::{ReconcileMode, ReconcileOptions};
use crate::errors::Result;
use crate::model::{NodeId, RecordId};
use crate::notify::Notifier;
use crate::primitives::{
    create_mirror_node, delete_mirror_node, write_node_pointer, write_record_pointer,
};
use crate::store::Store;

pub(super) struct Applier<'a> {
    pub store: &'a dyn Store,
    pub source_kind: &'a str,
    pub mirror_kind: &'a str,
    pub mode: ReconcileMode,
    pub options: ReconcileOptions,
    pub notifier: &'a Notifier,
}

impl Applier<'_> {
    pub fn apply(&self, plan: &ActionPlan, report: &mut ReconcileReport) {
        for (record_id, node_id) in &plan.repair_post_meta {
            let outcome = self.apply_record(*record_id);
            self.settle(report, Action::RepairPostMeta, Some(*record_id), Some(*node_id), outcome);
        }
        for (node_id, record_id) in &plan.repair_term_meta {
            let outcome = self.apply_node(*node_id);
            self.settle(report, Action::RepairTermMeta, Some(*record_id), Some(*node_id), outcome);
        }
        for node_id in &plan.delete {
            let outcome = self.apply_node(*node_id);
            self.settle(report, Action::Delete, None, Some(*node_id), outcome);
        }
        for record_id in &plan.create {
            let outcome = self.apply_record(*record_id);
            self.settle(report, Action::Create, Some(*record_id), None, outcome);
        }
    }

    /// Count what was actually done; an earlier repair may have turned a
    /// planned create into a pointer repair
    fn settle(
        &self,
        report: &mut ReconcileReport,
        planned: Action,
        record_id: Option<RecordId>,
        node_id: Option<NodeId>,
        outcome: Result<Option<Action>>,
    ) {
        match outcome {
            Ok(Some(done)) => {
                report.applied.increment(done);
                self.log_mutation(done, record_id, node_id);
            }
            Ok(None) => {
                tracing::debug!(
                    action = planned.as_str(),
                    record_id = record_id.map(|id| id.0),
                    node_id = node_id.map(|id| id.0),
                    "no longer needed"
                );
            }
            Err(err) => {
                tracing::warn!(
                    event = EVENT_SKIPPED,
                    action = planned.as_str(),
                    record_id = record_id.map(|id| id.0),
                    node_id = node_id.map(|id| id.0),
                    error = %err,
                    "reconciliation item skipped"
                );
                report.skipped.push(SkippedItem {
                    action: planned,
                    record_id,
                    node_id,
                    reason: err.to_string(),
                });
            }
        }
    }

    fn log_mutation(&self, action: Action, record_id: Option<RecordId>, node_id: Option<NodeId>) {
        let record_id = record_id.map(|id| id.0);
        let node_id = node_id.map(|id| id.0);
        if self.options.verbose {
            tracing::info!(
                event = EVENT_MUTATION,
                action = action.as_str(),
                record_id,
                node_id,
                mirror_kind = %self.mirror_kind
            );
        } else {
            tracing::debug!(
                event = EVENT_MUTATION,
                action = action.as_str(),
                record_id,
                node_id,
                mirror_kind = %self.mirror_kind
            );
        }
    }

    fn apply_record(&self, record_id: RecordId) -> Result<Option<Action>> {
        let Some(record) = self.store.get_record(record_id)? else {
            return Ok(None);
        };
        match classify_record(self.store, &record, self.mirror_kind, self.mode)? {
            RecordAction::Create => {
                create_mirror_node(self.store, &record, self.mirror_kind, self.notifier)?;
                Ok(Some(Action::Create))
            }
            RecordAction::RepairPostMeta(node_id) => {
                write_record_pointer(self.store, record.id, node_id, self.mirror_kind)?;
                Ok(Some(Action::RepairPostMeta))
            }
            RecordAction::Nothing => Ok(None),
        }
    }

    fn apply_node(&self, node_id: NodeId) -> Result<Option<Action>> {
        let Some(node) = self.store.get_node(self.mirror_kind, node_id)? else {
            return Ok(None);
        };
        match classify_node(self.store, &node, self.source_kind, self.mode)? {
            NodeAction::Delete => {
                let existed = delete_mirror_node(self.store, &node, None, self.notifier)?;
                Ok(existed.then_some(Action::Delete))
            }
            NodeAction::RepairTermMeta(record_id) => {
                write_node_pointer(self.store, self.mirror_kind, node.id, record_id)?;
                Ok(Some(Action::RepairTermMeta))
            }
            NodeAction::Nothing => Ok(None),
        }
    }
}
