//! Single-pair consistency check, read-only

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::errors::{Result, ShadowError};
use crate::keys::MetaKeys;
use crate::model::{Node, NodeId, Record, RecordId};
use crate::resolver::{mirrored_name, mirrored_slug};
use crate::store::Store;
use crate::{log_op_end, log_op_error, log_op_start};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum CheckProblem {
    /// The record has no node pointer
    MissingNodePointer,
    /// The record's node pointer names a node that does not exist
    DanglingNodePointer { node_id: NodeId },
    /// The node has no record pointer
    MissingRecordPointer,
    /// The node's record pointer names no live record of the expected kind
    DanglingRecordPointer { record_id: RecordId },
    /// One side points somewhere other than its partner
    PointerMismatch {
        key: String,
        expected: u64,
        found: u64,
    },
    NameMismatch { title: String, name: String },
    SlugMismatch { record_slug: String, node_slug: String },
}

impl fmt::Display for CheckProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckProblem::MissingNodePointer => write!(f, "record has no node pointer"),
            CheckProblem::DanglingNodePointer { node_id } => {
                write!(f, "record points to missing node {}", node_id)
            }
            CheckProblem::MissingRecordPointer => write!(f, "node has no record pointer"),
            CheckProblem::DanglingRecordPointer { record_id } => {
                write!(f, "node points to missing record {}", record_id)
            }
            CheckProblem::PointerMismatch {
                key,
                expected,
                found,
            } => write!(f, "{} is {}, expected {}", key, found, expected),
            CheckProblem::NameMismatch { title, name } => {
                write!(f, "node name '{}' differs from record title '{}'", name, title)
            }
            CheckProblem::SlugMismatch {
                record_slug,
                node_slug,
            } => write!(
                f,
                "node slug '{}' differs from record slug '{}'",
                node_slug, record_slug
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub mirror_kind: String,
    pub record_id: Option<RecordId>,
    pub node_id: Option<NodeId>,
    pub problems: Vec<CheckProblem>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.problems.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed() { "PASS" } else { "FAIL" };
        write!(f, "{}", verdict)?;
        match self.record_id {
            Some(id) => write!(f, " record {}", id)?,
            None => write!(f, " record -")?,
        }
        match self.node_id {
            Some(id) => write!(f, " <-> node {}", id)?,
            None => write!(f, " <-> node -")?,
        }
        writeln!(f, " in {}", self.mirror_kind)?;
        for problem in &self.problems {
            writeln!(f, "  - {}", problem)?;
        }
        Ok(())
    }
}

/// Check the pair starting from a record
///
/// # Errors
///
/// `UnknownMirrorKind`, `RecordNotFound`, or a store failure.
pub fn check_record(store: &dyn Store, record_id: RecordId, mirror_kind: &str) -> Result<CheckReport> {
    timed("check_record", || {
        require_mirror(store, mirror_kind)?;
        let record = store
            .get_record(record_id)?
            .ok_or(ShadowError::RecordNotFound {
                record_id: record_id.0,
            })?;

        let keys = MetaKeys::for_mirror(mirror_kind);
        let mut report = CheckReport {
            mirror_kind: mirror_kind.to_string(),
            record_id: Some(record.id),
            node_id: None,
            problems: Vec::new(),
        };

        let Some(node_id) = record.metadata.pointer(&keys.node_pointer) else {
            report.problems.push(CheckProblem::MissingNodePointer);
            return Ok(report);
        };
        let node_id = NodeId(node_id);
        report.node_id = Some(node_id);
        let Some(node) = store.get_node(mirror_kind, node_id)? else {
            report.problems.push(CheckProblem::DanglingNodePointer { node_id });
            return Ok(report);
        };

        match node.metadata.pointer(&keys.record_pointer) {
            None => report.problems.push(CheckProblem::MissingRecordPointer),
            Some(found) if found != record.id.0 => {
                report.problems.push(CheckProblem::PointerMismatch {
                    key: keys.record_pointer.clone(),
                    expected: record.id.0,
                    found,
                })
            }
            Some(_) => {}
        }
        compare_fields(&node, &record, &mut report.problems);
        Ok(report)
    })
}

/// Check the pair starting from a node
///
/// With `record_kind` set, a record of another kind counts as missing.
///
/// # Errors
///
/// `UnknownMirrorKind`, `NodeNotFound`, or a store failure.
pub fn check_node(
    store: &dyn Store,
    node_id: NodeId,
    mirror_kind: &str,
    record_kind: Option<&str>,
) -> Result<CheckReport> {
    timed("check_node", || {
        require_mirror(store, mirror_kind)?;
        let node = store
            .get_node(mirror_kind, node_id)?
            .ok_or_else(|| ShadowError::NodeNotFound {
                node_id: node_id.0,
                mirror_kind: mirror_kind.to_string(),
            })?;

        let keys = MetaKeys::for_mirror(mirror_kind);
        let mut report = CheckReport {
            mirror_kind: mirror_kind.to_string(),
            record_id: None,
            node_id: Some(node.id),
            problems: Vec::new(),
        };

        let Some(record_id) = node.metadata.pointer(&keys.record_pointer) else {
            report.problems.push(CheckProblem::MissingRecordPointer);
            return Ok(report);
        };
        let record_id = RecordId(record_id);
        report.record_id = Some(record_id);
        let record = store
            .get_record(record_id)?
            .filter(|r| record_kind.map_or(true, |kind| r.kind == kind));
        let Some(record) = record else {
            report
                .problems
                .push(CheckProblem::DanglingRecordPointer { record_id });
            return Ok(report);
        };

        match record.metadata.pointer(&keys.node_pointer) {
            None => report.problems.push(CheckProblem::MissingNodePointer),
            Some(found) if found != node.id.0 => {
                report.problems.push(CheckProblem::PointerMismatch {
                    key: keys.node_pointer.clone(),
                    expected: node.id.0,
                    found,
                })
            }
            Some(_) => {}
        }
        compare_fields(&node, &record, &mut report.problems);
        Ok(report)
    })
}

fn compare_fields(node: &Node, record: &Record, problems: &mut Vec<CheckProblem>) {
    let title = mirrored_name(record);
    if node.name != title {
        problems.push(CheckProblem::NameMismatch {
            title: title.to_string(),
            name: node.name.clone(),
        });
    }
    if let Some(slug) = mirrored_slug(record) {
        if !node.slug.is_empty() && node.slug != slug {
            problems.push(CheckProblem::SlugMismatch {
                record_slug: slug.to_string(),
                node_slug: node.slug.clone(),
            });
        }
    }
}

fn require_mirror(store: &dyn Store, mirror_kind: &str) -> Result<()> {
    if store.has_mirror_kind(mirror_kind)? {
        Ok(())
    } else {
        Err(ShadowError::UnknownMirrorKind {
            mirror_kind: mirror_kind.to_string(),
        })
    }
}

fn timed(op: &str, f: impl FnOnce() -> Result<CheckReport>) -> Result<CheckReport> {
    let start = Instant::now();
    log_op_start!(op);
    let result = f();
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(report) => {
            log_op_end!(op, duration_ms = duration_ms, passed = report.passed());
        }
        Err(err) => {
            log_op_error!(op, err, duration_ms = duration_ms);
        }
    }
    result
}
