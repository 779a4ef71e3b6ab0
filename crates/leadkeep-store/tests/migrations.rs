use leadkeep_store::Store;
use tempfile::TempDir;

#[test]
fn migrations_are_idempotent() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    assert_eq!(store.schema_version().expect("version"), 1);

    store.migrate().expect("migrate again");
    assert_eq!(store.schema_version().expect("version"), 1);
}

#[test]
fn migrations_create_tables() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");

    for table in ["leads", "customers", "contact_persons", "follow_ups", "projects"] {
        let count: i64 = store
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
                [table],
                |row| row.get(0),
            )
            .expect("query sqlite_master");
        assert_eq!(count, 1, "missing table {table}");
    }
}

#[test]
fn file_store_persists_between_opens() {
    let temp = TempDir::new().expect("temp dir");
    let db_path = temp.path().join("nested").join("leadkeep.sqlite3");
    let resolved =
        leadkeep_store::paths::resolve_db_path(Some(db_path.clone())).expect("resolve path");
    assert_eq!(resolved, db_path);

    {
        let store = Store::open(&resolved).expect("open");
        store.migrate().expect("migrate");
    }
    let store = Store::open(&resolved).expect("reopen");
    assert_eq!(store.schema_version().expect("version"), 1);
}
