// Integration tests for the migration framework

use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let result = shadow_store::migrations::apply_migrations(&mut conn);

    // Then: All migrations succeed
    assert!(
        result.is_ok(),
        "Migrations should succeed: {:?}",
        result.err()
    );

    // And: Every expected table exists
    let tables = get_table_names(&conn);
    for expected in [
        "schema_version",
        "record_kinds",
        "mirror_kinds",
        "records",
        "record_meta",
        "nodes",
        "node_meta",
        "memberships",
        "sqlite_sequence", // Auto-created by SQLite for AUTOINCREMENT columns
    ] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migrations_are_idempotent() {
    let mut conn = setup_test_db();
    shadow_store::migrations::apply_migrations(&mut conn).unwrap();
    shadow_store::migrations::apply_migrations(&mut conn).unwrap();

    let applied = shadow_store::migrations::applied_migrations(&conn).unwrap();
    assert_eq!(applied, vec!["001_initial_schema".to_string()]);
}

#[test]
fn test_reopening_a_file_keeps_data() {
    use shadow_core::{MirrorOptions, Record, RecordId, Store};

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("store.db");
    {
        let store = shadow_store::SqliteStore::open(&path).unwrap();
        store.register_record_kind("actor").unwrap();
        store
            .register_mirror_kind("_actor", &MirrorOptions::default())
            .unwrap();
        store.save_record(Record::new(1, "actor", "Jane Doe")).unwrap();
    }

    let store = shadow_store::SqliteStore::open(&path).unwrap();
    assert!(store.has_record_kind("actor").unwrap());
    assert!(store.has_mirror_kind("_actor").unwrap());
    assert_eq!(
        store.get_record(RecordId(1)).unwrap().unwrap().title,
        "Jane Doe"
    );
}
