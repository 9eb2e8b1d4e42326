//! SQLite store
//!
//! One connection, used through `&self`; transactions are opened with
//! `unchecked_transaction` so the `Store` trait can stay `&self` throughout.
//! Subscribers are dispatched only after the write has committed (`Saved`) or
//! before the delete starts (`Deleting`), never while a statement is live.

use std::path::Path;
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use shadow_core::errors::ShadowError;
use shadow_core::model::metadata::parse_pointer;
use shadow_core::model::{Metadata, MirrorOptions, Node, NodeId, Record, RecordId};
use shadow_core::store::{
    prepare_node_fields, EventKind, Page, PageRequest, RecordEvent, RecordEventHandler, Store,
    Subscribers,
};

use super::hydration::{to_sql_id, NodeRow, RecordRow, NODE_COLUMNS, RECORD_COLUMNS};
use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;

/// Side table holding attached metadata for one entity type
#[derive(Clone, Copy)]
enum MetaTable {
    Record,
    Node,
}

impl MetaTable {
    fn select_sql(self) -> &'static str {
        match self {
            MetaTable::Record => {
                "SELECT meta_key, meta_value FROM record_meta WHERE record_id = ?1 ORDER BY meta_key"
            }
            MetaTable::Node => {
                "SELECT meta_key, meta_value FROM node_meta WHERE node_id = ?1 ORDER BY meta_key"
            }
        }
    }

    fn upsert_sql(self) -> &'static str {
        match self {
            MetaTable::Record => {
                "INSERT INTO record_meta (record_id, meta_key, meta_value, pointer)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(record_id, meta_key) DO UPDATE SET
                    meta_value = excluded.meta_value,
                    pointer = excluded.pointer"
            }
            MetaTable::Node => {
                "INSERT INTO node_meta (node_id, meta_key, meta_value, pointer)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(node_id, meta_key) DO UPDATE SET
                    meta_value = excluded.meta_value,
                    pointer = excluded.pointer"
            }
        }
    }
}

/// SQLite implementation of [`Store`]
pub struct SqliteStore {
    conn: Connection,
    subscribers: Subscribers,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(db::open(path)?)
    }

    /// Fresh in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn,
            subscribers: Subscribers::new(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Options the namespace was registered with
    pub fn mirror_options(&self, mirror_kind: &str) -> Result<Option<MirrorOptions>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT options FROM mirror_kinds WHERE mirror_kind = ?1",
                [mirror_kind],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Number of nodes in one namespace
    pub fn node_count(&self, mirror_kind: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM nodes WHERE mirror_kind = ?1",
                [mirror_kind],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        Ok(count.max(0) as usize)
    }

    fn load_meta(&self, table: MetaTable, owner: i64) -> Result<Metadata> {
        let mut stmt = self
            .conn
            .prepare_cached(table.select_sql())
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([owner], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Value>(1)?))
            })
            .map_err(from_rusqlite)?;

        let mut metadata = Metadata::new();
        for row in rows {
            let (key, value) = row.map_err(from_rusqlite)?;
            metadata.set(key, value);
        }
        Ok(metadata)
    }

    fn upsert_meta(
        conn: &Connection,
        table: MetaTable,
        owner: i64,
        key: &str,
        value: &Value,
    ) -> Result<()> {
        let pointer = parse_pointer(value).and_then(|p| i64::try_from(p).ok());
        conn.execute(table.upsert_sql(), params![owner, key, value, pointer])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn hydrate_record(&self, row: RecordRow) -> Result<Record> {
        let metadata = self.load_meta(MetaTable::Record, row.id())?;
        row.into_record(metadata)
    }

    fn hydrate_node(&self, row: NodeRow) -> Result<Node> {
        let metadata = self.load_meta(MetaTable::Node, row.id())?;
        row.into_node(metadata)
    }

    fn query_records(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params, RecordRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(|r| self.hydrate_record(r)).collect()
    }

    fn query_nodes(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Node>> {
        let mut stmt = self.conn.prepare(sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params, NodeRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(|r| self.hydrate_node(r)).collect()
    }

    fn require_mirror(&self, mirror_kind: &str) -> Result<()> {
        if self.has_mirror_kind(mirror_kind)? {
            Ok(())
        } else {
            Err(ShadowError::UnknownMirrorKind {
                mirror_kind: mirror_kind.to_string(),
            })
        }
    }

    fn require_node(&self, mirror_kind: &str, id: NodeId) -> Result<i64> {
        let sql_id = to_sql_id(id.0)?;
        let exists: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM nodes WHERE id = ?1 AND mirror_kind = ?2)",
                params![sql_id, mirror_kind],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        if exists {
            Ok(sql_id)
        } else {
            Err(ShadowError::NodeNotFound {
                node_id: id.0,
                mirror_kind: mirror_kind.to_string(),
            })
        }
    }

    fn require_record(&self, id: RecordId) -> Result<i64> {
        let sql_id = to_sql_id(id.0)?;
        let exists: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM records WHERE id = ?1)",
                [sql_id],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        if exists {
            Ok(sql_id)
        } else {
            Err(ShadowError::RecordNotFound { record_id: id.0 })
        }
    }

    fn ensure_slug_free(&self, mirror_kind: &str, slug: &str, except: Option<i64>) -> Result<()> {
        let taken: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM nodes
                   WHERE mirror_kind = ?1 AND slug = ?2 AND (?3 IS NULL OR id != ?3))",
                params![mirror_kind, slug, except],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        if taken {
            Err(ShadowError::DuplicateSlug {
                mirror_kind: mirror_kind.to_string(),
                slug: slug.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Fetch `per_page + 1` rows, keep `per_page`, report whether more exist
fn into_page<T>(mut items: Vec<T>, request: PageRequest) -> Page<T> {
    let has_more = items.len() > request.per_page;
    items.truncate(request.per_page);
    Page { items, has_more }
}

fn limit_offset(request: PageRequest) -> (i64, i64) {
    let limit = i64::try_from(request.per_page.saturating_add(1)).unwrap_or(i64::MAX);
    let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}

impl Store for SqliteStore {
    fn register_record_kind(&self, kind: &str) -> Result<()> {
        self.conn
            .execute("INSERT OR IGNORE INTO record_kinds (kind) VALUES (?1)", [kind])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn has_record_kind(&self, kind: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM record_kinds WHERE kind = ?1)",
                [kind],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)
    }

    fn register_mirror_kind(&self, mirror_kind: &str, options: &MirrorOptions) -> Result<()> {
        let options = serde_json::to_string(options)?;
        self.conn
            .execute(
                "INSERT INTO mirror_kinds (mirror_kind, options) VALUES (?1, ?2)
                 ON CONFLICT(mirror_kind) DO UPDATE SET options = excluded.options",
                params![mirror_kind, options],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn has_mirror_kind(&self, mirror_kind: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM mirror_kinds WHERE mirror_kind = ?1)",
                [mirror_kind],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)
    }

    fn get_record(&self, id: RecordId) -> Result<Option<Record>> {
        let Ok(sql_id) = to_sql_id(id.0) else {
            return Ok(None);
        };
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS),
                [sql_id],
                RecordRow::from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;
        row.map(|r| self.hydrate_record(r)).transpose()
    }

    fn save_record(&self, record: Record) -> Result<Record> {
        if record.id.0 == 0 {
            return Err(ShadowError::InvalidInput {
                reason: "Record id must be positive".to_string(),
            });
        }
        let sql_id = to_sql_id(record.id.0)?;
        if !self.has_record_kind(&record.kind)? {
            return Err(ShadowError::UnknownRecordKind { kind: record.kind });
        }

        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        tx.execute(
            "INSERT INTO records (id, kind, title, slug, status, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                title = excluded.title,
                slug = excluded.slug,
                status = excluded.status,
                updated_at = excluded.updated_at",
            params![
                sql_id,
                record.kind,
                record.title,
                record.slug,
                record.status.as_str(),
                chrono::Utc::now().timestamp(),
            ],
        )
        .map_err(from_rusqlite)?;
        for key in record.metadata.keys() {
            if let Some(value) = record.metadata.get(key) {
                Self::upsert_meta(&tx, MetaTable::Record, sql_id, key, value)?;
            }
        }
        tx.commit().map_err(from_rusqlite)?;

        let saved = self
            .get_record(record.id)?
            .ok_or(ShadowError::RecordNotFound {
                record_id: record.id.0,
            })?;
        self.subscribers
            .dispatch(self, &RecordEvent::Saved(saved.clone()));

        // Handlers may have attached metadata; hand back the committed state
        Ok(self.get_record(saved.id)?.unwrap_or(saved))
    }

    fn delete_record(&self, id: RecordId) -> Result<bool> {
        let Some(record) = self.get_record(id)? else {
            return Ok(false);
        };

        self.subscribers
            .dispatch(self, &RecordEvent::Deleting(record));

        let removed = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1", [to_sql_id(id.0)?])
            .map_err(from_rusqlite)?;
        Ok(removed > 0)
    }

    fn set_record_meta(&self, id: RecordId, key: &str, value: Value) -> Result<()> {
        let sql_id = self.require_record(id)?;
        Self::upsert_meta(&self.conn, MetaTable::Record, sql_id, key, &value)
    }

    fn delete_record_meta(&self, id: RecordId, key: &str) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM record_meta WHERE record_id = ?1 AND meta_key = ?2",
                params![to_sql_id(id.0)?, key],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn records_missing_meta(
        &self,
        kind: &str,
        key: &str,
        page: PageRequest,
    ) -> Result<Page<Record>> {
        let (limit, offset) = limit_offset(page);
        let sql = format!(
            "SELECT {} FROM records r
             WHERE r.kind = ?1
               AND NOT EXISTS (
                 SELECT 1 FROM record_meta m
                 WHERE m.record_id = r.id AND m.meta_key = ?2 AND m.pointer IS NOT NULL)
             ORDER BY r.id
             LIMIT ?3 OFFSET ?4",
            RECORD_COLUMNS
        );
        let records = self.query_records(&sql, &[&kind, &key, &limit, &offset])?;
        Ok(into_page(records, page))
    }

    fn get_node(&self, mirror_kind: &str, id: NodeId) -> Result<Option<Node>> {
        let Ok(sql_id) = to_sql_id(id.0) else {
            return Ok(None);
        };
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM nodes WHERE id = ?1 AND mirror_kind = ?2",
                    NODE_COLUMNS
                ),
                params![sql_id, mirror_kind],
                NodeRow::from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;
        row.map(|r| self.hydrate_node(r)).transpose()
    }

    fn insert_node(&self, mirror_kind: &str, name: &str, slug: Option<&str>) -> Result<Node> {
        self.require_mirror(mirror_kind)?;
        let (name, slug) = prepare_node_fields(name, slug)?;
        self.ensure_slug_free(mirror_kind, &slug, None)?;

        self.conn
            .execute(
                "INSERT INTO nodes (mirror_kind, name, slug) VALUES (?1, ?2, ?3)",
                params![mirror_kind, name, slug],
            )
            .map_err(from_rusqlite)?;
        let id = self.conn.last_insert_rowid();
        let id = u64::try_from(id).map_err(|_| ShadowError::Internal {
            message: format!("SQLite assigned invalid node id {}", id),
        })?;
        Ok(Node::new(id, mirror_kind, name, slug))
    }

    fn update_node(
        &self,
        mirror_kind: &str,
        id: NodeId,
        name: &str,
        slug: Option<&str>,
    ) -> Result<Node> {
        let (name, slug) = prepare_node_fields(name, slug)?;
        let sql_id = self.require_node(mirror_kind, id)?;
        self.ensure_slug_free(mirror_kind, &slug, Some(sql_id))?;

        self.conn
            .execute(
                "UPDATE nodes SET name = ?1, slug = ?2 WHERE id = ?3",
                params![name, slug, sql_id],
            )
            .map_err(from_rusqlite)?;
        self.get_node(mirror_kind, id)?
            .ok_or_else(|| ShadowError::NodeNotFound {
                node_id: id.0,
                mirror_kind: mirror_kind.to_string(),
            })
    }

    fn delete_node(&self, mirror_kind: &str, id: NodeId) -> Result<bool> {
        let Ok(sql_id) = to_sql_id(id.0) else {
            return Ok(false);
        };
        let removed = self
            .conn
            .execute(
                "DELETE FROM nodes WHERE id = ?1 AND mirror_kind = ?2",
                params![sql_id, mirror_kind],
            )
            .map_err(from_rusqlite)?;
        Ok(removed > 0)
    }

    fn set_node_meta(&self, mirror_kind: &str, id: NodeId, key: &str, value: Value) -> Result<()> {
        let sql_id = self.require_node(mirror_kind, id)?;
        Self::upsert_meta(&self.conn, MetaTable::Node, sql_id, key, &value)
    }

    fn delete_node_meta(&self, mirror_kind: &str, id: NodeId, key: &str) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM node_meta
                 WHERE node_id = ?1 AND meta_key = ?2
                   AND node_id IN (SELECT id FROM nodes WHERE mirror_kind = ?3)",
                params![to_sql_id(id.0)?, key, mirror_kind],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn list_nodes(&self, mirror_kind: &str, page: PageRequest) -> Result<Page<Node>> {
        let (limit, offset) = limit_offset(page);
        let sql = format!(
            "SELECT {} FROM nodes WHERE mirror_kind = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
            NODE_COLUMNS
        );
        let nodes = self.query_nodes(&sql, &[&mirror_kind, &limit, &offset])?;
        Ok(into_page(nodes, page))
    }

    fn find_node_by_slug(&self, mirror_kind: &str, slug: &str) -> Result<Option<Node>> {
        let sql = format!(
            "SELECT {} FROM nodes WHERE mirror_kind = ?1 AND slug = ?2",
            NODE_COLUMNS
        );
        Ok(self.query_nodes(&sql, &[&mirror_kind, &slug])?.into_iter().next())
    }

    fn classify(&self, mirror_kind: &str, node_id: NodeId, record_id: RecordId) -> Result<()> {
        let node = self.require_node(mirror_kind, node_id)?;
        let record = self.require_record(record_id)?;
        self.conn
            .execute(
                "INSERT OR IGNORE INTO memberships (mirror_kind, node_id, record_id)
                 VALUES (?1, ?2, ?3)",
                params![mirror_kind, node, record],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn nodes_of_record(&self, mirror_kind: &str, record_id: RecordId) -> Result<Vec<Node>> {
        let sql = format!(
            "SELECT {} FROM nodes n
             JOIN memberships m ON m.node_id = n.id
             WHERE m.record_id = ?1 AND m.mirror_kind = ?2 AND n.mirror_kind = ?2
             ORDER BY n.id",
            prefixed("n", NODE_COLUMNS)
        );
        self.query_nodes(&sql, &[&to_sql_id(record_id.0)?, &mirror_kind])
    }

    fn records_in_node(&self, mirror_kind: &str, node_id: NodeId) -> Result<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM records r
             JOIN memberships m ON m.record_id = r.id
             WHERE m.node_id = ?1 AND m.mirror_kind = ?2
             ORDER BY r.id",
            prefixed("r", RECORD_COLUMNS)
        );
        self.query_records(&sql, &[&to_sql_id(node_id.0)?, &mirror_kind])
    }

    fn subscribe(&self, event: EventKind, record_kind: &str, handler: Arc<dyn RecordEventHandler>) {
        self.subscribers.add(event, record_kind, handler);
    }
}

/// `"id, kind"` → `"r.id, r.kind"`
fn prefixed(alias: &str, columns: &str) -> String {
    columns
        .split(", ")
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.register_record_kind("actor").unwrap();
        store
            .register_mirror_kind("_actor", &MirrorOptions::default())
            .unwrap();
        store
    }

    #[test]
    fn test_record_round_trip_with_merged_metadata() {
        let store = store();
        let mut record = Record::new(42, "actor", "Jane Doe").with_slug("jane-doe");
        record.metadata.set("color", json!("blue"));
        store.save_record(record).unwrap();

        let mut update = Record::new(42, "actor", "Jane A. Doe").with_slug("jane-doe");
        update.metadata.set("shadow__actor_term_id", json!(7));
        let saved = store.save_record(update).unwrap();

        assert_eq!(saved.title, "Jane A. Doe");
        assert_eq!(saved.metadata.get("color"), Some(&json!("blue")));
        assert_eq!(saved.metadata.pointer("shadow__actor_term_id"), Some(7));
    }

    #[test]
    fn test_save_rejects_unknown_kind_and_zero_id() {
        let store = store();
        assert!(matches!(
            store.save_record(Record::new(1, "ghost", "x")),
            Err(ShadowError::UnknownRecordKind { .. })
        ));
        assert!(matches!(
            store.save_record(Record::new(0, "actor", "x")),
            Err(ShadowError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_missing_meta_uses_pointer_validity() {
        let store = store();
        for (id, value) in [(1, json!(5)), (2, json!("0")), (3, json!("abc")), (4, json!("9"))] {
            let mut record = Record::new(id, "actor", format!("A{}", id));
            record.metadata.set("k", value);
            store.save_record(record).unwrap();
        }
        store.save_record(Record::new(5, "actor", "A5")).unwrap();

        let page = store
            .records_missing_meta("actor", "k", PageRequest::first(10))
            .unwrap();
        let ids: Vec<u64> = page.items.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 3, 5]);
        assert!(!page.has_more);
    }

    #[test]
    fn test_pagination_reports_more() {
        let store = store();
        for i in 0..5 {
            store
                .insert_node("_actor", &format!("N{}", i), None)
                .unwrap();
        }
        let first = store.list_nodes("_actor", PageRequest::new(1, 2)).unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.has_more);
        let last = store.list_nodes("_actor", PageRequest::new(3, 2)).unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);
    }

    #[test]
    fn test_duplicate_slug_is_a_mutation_failure() {
        let store = store();
        let first = store.insert_node("_actor", "Jane Doe", None).unwrap();
        let err = store.insert_node("_actor", "Jane  Doe!", None).unwrap_err();
        assert!(err.is_mutation_failure());

        // Updating a node to its own slug is fine
        store
            .update_node("_actor", first.id, "Jane D.", Some("jane-doe"))
            .unwrap();
    }

    #[test]
    fn test_node_scoped_to_namespace() {
        let store = store();
        store
            .register_mirror_kind("_genre", &MirrorOptions::default())
            .unwrap();
        let node = store.insert_node("_actor", "Jane", None).unwrap();
        assert!(store.get_node("_genre", node.id).unwrap().is_none());
        assert!(!store.delete_node("_genre", node.id).unwrap());
        assert!(store.delete_node("_actor", node.id).unwrap());
    }

    #[test]
    fn test_delete_cascades_meta_and_membership() {
        let store = store();
        store.save_record(Record::new(1, "actor", "Jane")).unwrap();
        let node = store.insert_node("_actor", "Jane", None).unwrap();
        store
            .set_node_meta("_actor", node.id, "shadow__actor_post_id", json!(1))
            .unwrap();
        store.classify("_actor", node.id, RecordId(1)).unwrap();
        assert_eq!(store.nodes_of_record("_actor", RecordId(1)).unwrap().len(), 1);

        store.delete_record(RecordId(1)).unwrap();
        assert!(store.records_in_node("_actor", node.id).unwrap().is_empty());

        store.delete_node("_actor", node.id).unwrap();
        let orphans: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM node_meta", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_mirror_options_round_trip() {
        let store = store();
        let options = MirrorOptions {
            label: Some("Actors".to_string()),
            consumer_kinds: vec!["movie".to_string()],
            public: true,
        };
        store.register_mirror_kind("_actor", &options).unwrap();
        assert_eq!(store.mirror_options("_actor").unwrap(), Some(options));
        assert_eq!(store.mirror_options("_none").unwrap(), None);
    }
}
