//! Transaction scopes: commit, rollback-on-drop and locking modes

#[path = "testutils/mod.rs"]
mod testutils;

use sqlitekit::{Error, OpenOptions, TransactionMode};
use testutils::test_fixture::TestFixture;

fn insert_cherry(fixture: &TestFixture) {
    fixture
        .conn()
        .execute("INSERT INTO store VALUES ('cherry', 'fruit', 30)")
        .expect("Failed to insert");
}

#[test]
fn test_drop_without_commit_rolls_back() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");

    {
        let tx = fixture.conn().transaction().expect("Failed to begin");
        insert_cherry(&fixture);
        tx.execute("UPDATE store SET amount = 0").unwrap();
        assert_eq!(fixture.count("store"), 3);
    }

    assert_eq!(fixture.count("store"), 2);
    assert_eq!(
        fixture.text_rows("SELECT amount FROM store ORDER BY rowid"),
        vec![vec![Some("125".to_string())], vec![Some("70".to_string())]]
    );
}

#[test]
fn test_commit_persists() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");

    {
        let mut tx = fixture
            .conn()
            .begin_transaction(TransactionMode::Immediate)
            .expect("Failed to begin");
        assert_eq!(tx.mode(), TransactionMode::Immediate);
        insert_cherry(&fixture);
        tx.commit().expect("Failed to commit");
        assert!(tx.is_committed());
    }

    // visible from an independent connection
    let other = fixture.second_connection(&OpenOptions::read_only());
    let mut stmt = other.prepare("SELECT count(*) FROM store").unwrap();
    assert_eq!(stmt.begin().unwrap().column_int64(0), 3);
}

#[test]
fn test_early_return_rolls_back() {
    fn transfer(fixture: &TestFixture) -> Result<(), Error> {
        let mut tx = fixture.conn().transaction()?;
        tx.execute("UPDATE store SET amount = amount - 100 WHERE article = 'apple'")?;
        tx.execute("UPDATE no_such_table SET amount = 1")?;
        tx.commit()
    }

    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let err = transfer(&fixture).unwrap_err();
    assert!(matches!(err, Error::Prepare(_)));

    assert_eq!(
        fixture.text_rows("SELECT amount FROM store WHERE article = 'apple'"),
        vec![vec![Some("125".to_string())]]
    );
}

#[test]
fn test_panic_unwind_rolls_back() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _tx = fixture.conn().transaction().expect("Failed to begin");
        insert_cherry(&fixture);
        assert_eq!(fixture.count("store"), 3);
        panic!("failed midway through the transaction");
    }));

    assert!(result.is_err());
    assert_eq!(fixture.count("store"), 2);
    assert!(fixture.conn().transaction().is_ok());
}

#[test]
fn test_second_commit_surfaces_engine_error() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let mut tx = fixture.conn().transaction().unwrap();
    insert_cherry(&fixture);
    tx.commit().unwrap();

    let err = tx.commit().unwrap_err();
    assert!(matches!(err, Error::Step(_)));
    assert!(err
        .diagnostic()
        .unwrap()
        .message()
        .contains("no transaction is active"));
    drop(tx);

    assert_eq!(fixture.count("store"), 3);
}

#[test]
fn test_exclusive_blocks_readers() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let reader = fixture.second_connection(&OpenOptions::read_only());
    let mut select = reader.prepare("SELECT count(*) FROM store").unwrap();

    {
        let _tx = fixture
            .conn()
            .begin_transaction(TransactionMode::Exclusive)
            .unwrap();
        // the exclusive lock is taken at BEGIN in rollback-journal mode
        fixture
            .conn()
            .execute("UPDATE store SET amount = amount + 1")
            .unwrap();

        let err = select.begin().unwrap_err();
        assert!(matches!(err, Error::Step(_)));
        assert!(err.diagnostic().unwrap().is_busy());
    }

    assert_eq!(select.begin().unwrap().column_int64(0), 2);
}

#[test]
fn test_immediate_blocks_second_writer() {
    let fixture = TestFixture::with_store_data().expect("Failed to create fixture");
    let other = fixture.second_connection(&OpenOptions::default());

    let _tx = fixture
        .conn()
        .begin_transaction(TransactionMode::Immediate)
        .unwrap();

    let err = other
        .begin_transaction(TransactionMode::Immediate)
        .unwrap_err();
    assert!(err.diagnostic().unwrap().is_busy());

    // readers are still admitted
    let mut select = other.prepare("SELECT count(*) FROM store").unwrap();
    assert_eq!(select.begin().unwrap().column_int64(0), 2);
}
