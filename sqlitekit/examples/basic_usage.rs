//! Basic usage example for sqlitekit
//!
//! This example demonstrates the core features of the crate:
//! - Opening a database
//! - Executing DDL
//! - Preparing, binding and executing statements
//! - Iterating result rows with a cursor
//! - Using transactions
//! - Typed row deserialization
//!
//! Run with: cargo run --example basic_usage

use serde::Deserialize;
use sqlitekit::{params, Connection, Error, TransactionMode};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Item {
    article: String,
    amount: i64,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    println!("=== sqlitekit Basic Usage Example ===\n");
    println!("SQLite library {}\n", sqlitekit::sqlite_version());

    // 1. Open a database
    println!("1. Opening database...");
    let db_path = std::env::temp_dir().join("sqlitekit_example.db");
    let _ = std::fs::remove_file(&db_path);
    let db = Connection::open(&db_path)?;
    println!("   ✓ Database opened at {}\n", db_path.display());

    // 2. Create the table
    println!("2. Creating table...");
    db.execute("CREATE TABLE store (article TEXT, category TEXT, amount INT)")?;
    println!("   ✓ Table store created\n");

    // 3. Insert rows with one prepared statement
    println!("3. Inserting rows...");
    let mut insert = db.prepare("INSERT INTO store (article, category, amount) VALUES (?, ?, ?)")?;
    insert.bind(1, "apple")?;
    insert.bind(2, "fruit")?;
    insert.bind(3, 125)?;
    insert.exec()?;
    println!("   ✓ Inserted apple (changes: {})", db.changes());

    insert.bind_all(params!["banana", "fruit", 70])?;
    insert.exec()?;
    println!("   ✓ Inserted banana (rowid: {})\n", db.last_insert_rowid());
    drop(insert);

    // 4. Read rows back with a cursor
    println!("4. Querying rows...");
    let mut select = db.prepare("SELECT article, amount FROM store")?;
    let mut cursor = select.begin()?;
    while cursor.is_active() {
        println!(
            "   {} {}",
            cursor.column_text(0).unwrap_or_default(),
            cursor.column_text(1).unwrap_or_default()
        );
        cursor.advance()?;
    }
    drop(cursor);
    println!();

    // 5. Named parameters
    println!("5. Named parameters...");
    let mut update = db.prepare("UPDATE store SET amount = :amount WHERE article = :article")?;
    update.bind_named(":amount", 80)?;
    update.bind_named(":article", "banana")?;
    update.exec()?;
    println!("   ✓ Updated {} row(s)\n", db.changes());

    // 6. Transactions
    println!("6. Using transactions...");
    {
        let mut tx = db.begin_transaction(TransactionMode::Immediate)?;
        tx.execute("INSERT INTO store VALUES ('cherry', 'fruit', 30)")?;
        tx.commit()?;
        println!("   ✓ Transaction committed");
    }
    {
        let tx = db.transaction()?;
        tx.execute("DELETE FROM store")?;
        println!("   ✓ Transaction dropped without commit, rolled back");
    }
    println!();

    // 7. Typed results
    println!("7. Typed row deserialization...");
    for row in select.begin()? {
        let item: Item = row?.deserialize()?;
        println!("   {:?}", item);
    }
    println!();

    println!("=== Example completed successfully ===");
    Ok(())
}
