use nexus_core::db::migrations::latest_version;
use nexus_core::db::{open_db, open_db_in_memory, DbError};
use nexus_core::{SqliteStore, StorageError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_all_collections() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in ["software", "videos", "licenses"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn licenses_table_is_keyed_by_key_column() {
    let conn = open_db_in_memory().unwrap();
    let pk: String = conn
        .query_row(
            "SELECT name FROM pragma_table_info('licenses') WHERE pk = 1;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(pk, "key");
}

#[test]
fn reopening_the_same_file_is_idempotent_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nexus.sqlite3");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO videos (id, body) VALUES ('v1', '{\"id\":\"v1\",\"title\":\"t\",\"url\":\"u\"}');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM videos;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 42);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteStore::try_new(conn) {
        Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_missing_a_collection_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE software (id TEXT PRIMARY KEY NOT NULL, body TEXT NOT NULL);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();

    assert!(matches!(
        SqliteStore::try_new(conn),
        Err(StorageError::MissingRequiredTable("videos"))
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
