//! Connection lifecycle, batches and configuration

#[path = "testutils/mod.rs"]
mod testutils;

use sqlitekit::{Connection, Error, OpenOptions};
use testutils::test_fixture::TestFixture;

#[test]
fn test_close_is_idempotent() {
    let mut fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let conn = fixture.conn_mut();

    conn.close();
    conn.close();
    assert!(!conn.is_open());
    assert_eq!(conn.changes(), 0);
    assert_eq!(conn.total_changes(), 0);
    assert_eq!(conn.last_insert_rowid(), 0);
    assert!(matches!(conn.prepare("SELECT 1"), Err(Error::Prepare(_))));
}

#[test]
fn test_reopen_same_file_keeps_data() {
    let mut fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let path = fixture.db_path().to_path_buf();

    let conn = fixture.conn_mut();
    conn.reopen(&path).expect("Failed to reopen");
    // counters are per handle
    assert_eq!(conn.total_changes(), 0);
    assert_eq!(fixture.count("store"), 2);
}

#[test]
fn test_execute_batch_runs_in_order() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    fixture
        .conn()
        .execute_batch(
            "CREATE TABLE store (article TEXT, category TEXT, amount INT);
             INSERT INTO store VALUES ('apple', 'fruit', 125);
             -- comments between statements are skipped
             INSERT INTO store VALUES ('banana', 'fruit', 70);
             UPDATE store SET amount = amount * 2;",
        )
        .expect("Failed to run batch");

    assert_eq!(
        fixture.text_rows("SELECT amount FROM store ORDER BY rowid"),
        vec![vec![Some("250".to_string())], vec![Some("140".to_string())]]
    );
    assert_eq!(fixture.conn().total_changes(), 4);
}

#[test]
fn test_execute_batch_stops_at_first_error() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let err = fixture
        .conn()
        .execute_batch(
            "INSERT INTO store VALUES ('cherry', 'fruit', 30);
             INSERT INTO nowhere VALUES (1);
             INSERT INTO store VALUES ('plum', 'fruit', 12);",
        )
        .unwrap_err();

    assert!(matches!(err, Error::Prepare(_)));
    assert_eq!(fixture.count("store"), 3);
}

#[test]
fn test_execute_batch_drains_queries() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    fixture
        .conn()
        .execute_batch("SELECT * FROM store; DELETE FROM store WHERE amount < 100;")
        .unwrap();
    assert_eq!(fixture.count("store"), 1);
}

#[test]
fn test_prepare_ignores_trailing_statements() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let changed = fixture
        .conn()
        .execute("DELETE FROM store WHERE article = 'apple'; DELETE FROM store")
        .unwrap();

    assert_eq!(changed, 1);
    assert_eq!(fixture.count("store"), 1);
}

#[test]
fn test_swap_exchanges_handles() {
    let mut fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let mut memory = Connection::open_in_memory().unwrap();
    memory.execute("CREATE TABLE scratch (x)").unwrap();

    fixture.conn_mut().swap(&mut memory);

    assert!(fixture.conn().prepare("SELECT x FROM scratch").is_ok());
    assert!(memory.prepare("SELECT article FROM store").is_ok());
}

#[test]
fn test_options_from_json_config() {
    let options: OpenOptions =
        serde_json::from_str(r#"{ "read_only": true, "busy_timeout_ms": 50 }"#).unwrap();
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");

    let reader = Connection::open_with(fixture.db_path(), &options).unwrap();
    assert!(reader.execute("DELETE FROM store").is_err());
    assert_eq!(fixture.count("store"), 2);
}

#[test]
fn test_uri_filenames() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let uri = format!("file:{}?mode=ro", fixture.db_path().display());

    let reader = Connection::open_with(&uri, &OpenOptions::default().with_uri(true)).unwrap();
    let mut stmt = reader.prepare("SELECT count(*) FROM store").unwrap();
    assert_eq!(stmt.begin().unwrap().column_int64(0), 2);
    assert!(reader.execute("DELETE FROM store").is_err());
}

#[test]
fn test_busy_timeout_waits_then_fails() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let writer = fixture.second_connection(&OpenOptions::default().with_busy_timeout(20));

    let _tx = fixture
        .conn()
        .begin_transaction(sqlitekit::TransactionMode::Exclusive)
        .unwrap();

    let started = std::time::Instant::now();
    let err = writer.execute("DELETE FROM store").unwrap_err();
    assert!(err.diagnostic().unwrap().is_busy());
    assert!(started.elapsed() >= std::time::Duration::from_millis(10));
}
