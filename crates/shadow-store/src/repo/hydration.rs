//! Row ↔ model conversion

use rusqlite::Row;
use shadow_core::errors::ShadowError;
use shadow_core::model::{Metadata, Node, NodeId, Record, RecordId, RecordStatus};

use crate::errors::{corrupt_row, Result};

pub(crate) const RECORD_COLUMNS: &str = "id, kind, title, slug, status";
pub(crate) const NODE_COLUMNS: &str = "id, mirror_kind, name, slug";

/// Raw `records` row before metadata is attached
pub(crate) struct RecordRow {
    id: i64,
    kind: String,
    title: String,
    slug: Option<String>,
    status: String,
}

impl RecordRow {
    /// Expects the columns of [`RECORD_COLUMNS`], in order
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            title: row.get(2)?,
            slug: row.get(3)?,
            status: row.get(4)?,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn into_record(self, metadata: Metadata) -> Result<Record> {
        let status = RecordStatus::parse(&self.status)
            .ok_or_else(|| corrupt_row("records", format!("unknown status '{}'", self.status)))?;
        Ok(Record {
            id: RecordId(from_sql_id("records", self.id)?),
            kind: self.kind,
            title: self.title,
            slug: self.slug,
            status,
            metadata,
        })
    }
}

/// Raw `nodes` row before metadata is attached
pub(crate) struct NodeRow {
    id: i64,
    mirror_kind: String,
    name: String,
    slug: String,
}

impl NodeRow {
    /// Expects the columns of [`NODE_COLUMNS`], in order
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            mirror_kind: row.get(1)?,
            name: row.get(2)?,
            slug: row.get(3)?,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn into_node(self, metadata: Metadata) -> Result<Node> {
        Ok(Node {
            id: NodeId(from_sql_id("nodes", self.id)?),
            mirror_kind: self.mirror_kind,
            name: self.name,
            slug: self.slug,
            metadata,
        })
    }
}

/// SQLite integers are signed; ids above `i64::MAX` cannot be stored
pub(crate) fn to_sql_id(id: u64) -> Result<i64> {
    i64::try_from(id).map_err(|_| ShadowError::InvalidInput {
        reason: format!("id {} is out of range", id),
    })
}

fn from_sql_id(table: &str, id: i64) -> Result<u64> {
    u64::try_from(id).map_err(|_| corrupt_row(table, format!("negative id {}", id)))
}
