//! Native error translation at each failure point

#[path = "testutils/mod.rs"]
mod testutils;

use libsqlite3_sys as ffi;
use sqlitekit::{Connection, Error, OpenOptions};
use testutils::test_fixture::TestFixture;

#[test]
fn test_open_in_missing_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("no_such_dir").join("store.db");

    let err = Connection::open(&path).unwrap_err();
    let diag = match &err {
        Error::Open(diag) => diag,
        other => panic!("expected Open error, got {:?}", other),
    };
    assert_eq!(diag.primary_code(), ffi::SQLITE_CANTOPEN);
    assert!(!diag.message().is_empty());
    assert!(diag.as_str().starts_with("Error: "));
    assert!(diag.as_str().contains("ErrorCode: 14 - "));
}

#[test]
fn test_open_read_only_missing_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("absent.db");

    let err = Connection::open_with(&path, &OpenOptions::read_only()).unwrap_err();
    assert!(matches!(err, Error::Open(_)));
    assert!(!path.exists());
}

#[test]
fn test_failed_reopen_leaves_connection_closed() {
    let mut fixture = TestFixture::new().expect("Failed to create fixture");
    let bad = fixture.db_path().join("nested").join("x.db");

    let conn = fixture.conn_mut();
    assert!(conn.is_open());
    assert!(conn.reopen(&bad).is_err());
    assert!(!conn.is_open());
    assert_eq!(conn.changes(), 0);
}

#[test]
fn test_syntax_error_on_prepare() {
    let fixture = TestFixture::new().expect("Failed to create fixture");

    let err = fixture.conn().prepare("SELEC 1").unwrap_err();
    let diag = err.diagnostic().expect("engine diagnostic");
    assert!(matches!(err, Error::Prepare(_)));
    assert_eq!(diag.code(), ffi::SQLITE_ERROR);
    assert!(diag.message().contains("syntax error"));
    assert_eq!(
        diag.to_string(),
        format!(
            "Error: {}\nErrorCode: 1 - SQL logic error",
            diag.message()
        )
    );
}

#[test]
fn test_comment_only_sql_is_not_a_statement() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    let err = fixture.conn().prepare("  -- nothing here\n").unwrap_err();
    assert_eq!(err.code(), Some(ffi::SQLITE_MISUSE));
}

#[test]
fn test_write_on_read_only_connection() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let reader = fixture.second_connection(&OpenOptions::read_only());

    let err = reader.execute("DELETE FROM store").unwrap_err();
    assert!(matches!(err, Error::Step(_)));
    assert_eq!(err.diagnostic().unwrap().primary_code(), ffi::SQLITE_READONLY);
    assert_eq!(fixture.count("store"), 2);
}

#[test]
fn test_diagnostic_outlives_connection() {
    let diag = {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();
        conn.execute("INSERT INTO t VALUES (1)").unwrap();
        let err = conn.execute("INSERT INTO t VALUES (1)").unwrap_err();
        err.diagnostic().cloned().unwrap()
    };

    assert!(diag.is_constraint_violation());
    assert_eq!(diag.code(), ffi::SQLITE_CONSTRAINT);
    assert!(diag.message().contains("UNIQUE constraint failed"));
}
