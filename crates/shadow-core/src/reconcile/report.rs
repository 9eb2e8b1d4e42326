//! Reconciliation results and their plain-text rendering

use std::fmt;

use serde::Serialize;

use super::ReconcileMode;
use crate::model::{NodeId, RecordId};

/// The four repair categories a pass can plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Delete,
    RepairTermMeta,
    RepairPostMeta,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Delete => "delete",
            Action::RepairTermMeta => "repair_term_meta",
            Action::RepairPostMeta => "repair_post_meta",
        }
    }

    /// Row label used in the count table
    pub fn label(&self) -> &'static str {
        match self {
            Action::Create => "Create",
            Action::Delete => "Delete",
            Action::RepairTermMeta => "Repair term meta",
            Action::RepairPostMeta => "Repair post meta",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub create: usize,
    pub delete: usize,
    pub repair_term_meta: usize,
    pub repair_post_meta: usize,
}

impl ActionCounts {
    pub fn get(&self, action: Action) -> usize {
        match action {
            Action::Create => self.create,
            Action::Delete => self.delete,
            Action::RepairTermMeta => self.repair_term_meta,
            Action::RepairPostMeta => self.repair_post_meta,
        }
    }

    pub fn increment(&mut self, action: Action) {
        match action {
            Action::Create => self.create += 1,
            Action::Delete => self.delete += 1,
            Action::RepairTermMeta => self.repair_term_meta += 1,
            Action::RepairPostMeta => self.repair_post_meta += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.create + self.delete + self.repair_term_meta + self.repair_post_meta
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// An item the pass meant to fix but could not
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    pub action: Action,
    pub record_id: Option<RecordId>,
    pub node_id: Option<NodeId>,
    pub reason: String,
}

impl fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action)?;
        if let Some(record_id) = self.record_id {
            write!(f, " record {}", record_id)?;
        }
        if let Some(node_id) = self.node_id {
            write!(f, " node {}", node_id)?;
        }
        write!(f, ": {}", self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub mode: ReconcileMode,
    pub dry_run: bool,
    pub planned: ActionCounts,
    pub applied: ActionCounts,
    pub skipped: Vec<SkippedItem>,
}

impl ReconcileReport {
    pub fn new(mode: ReconcileMode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            planned: ActionCounts::default(),
            applied: ActionCounts::default(),
            skipped: Vec::new(),
        }
    }

    /// Counts to show: planned for a dry run, applied otherwise
    pub fn counts(&self) -> &ActionCounts {
        if self.dry_run {
            &self.planned
        } else {
            &self.applied
        }
    }

    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "Dry run ({}): no changes written", self.mode)?;
        } else {
            writeln!(f, "Reconciled ({})", self.mode)?;
        }
        let counts = self.counts();
        for action in self.mode.actions() {
            writeln!(f, "{}: {}", action.label(), counts.get(*action))?;
        }
        if !self.skipped.is_empty() {
            writeln!(f, "Skipped: {}", self.skipped.len())?;
        }
        Ok(())
    }
}
