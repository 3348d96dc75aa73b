//! Test fixture for sqlitekit integration tests

use sqlitekit::{Connection, OpenOptions, Row};
use std::path::{Path, PathBuf};

/// Isolated database file in a temporary directory, with an open connection
pub struct TestFixture {
    conn: Connection,
    db_path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl TestFixture {
    /// Create an empty database
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let db_path = temp_dir
            .path()
            .join(format!("sqlitekit_test_{}.db", fastrand::u64(..)));
        let conn = Connection::open(&db_path)?;

        Ok(TestFixture {
            conn,
            db_path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a database holding the `store` table with two fruit rows
    pub fn with_store_data() -> Result<Self, Box<dyn std::error::Error>> {
        let fixture = Self::new()?;
        fixture.create_store()?;

        let mut insert = fixture
            .conn
            .prepare("INSERT INTO store (article, category, amount) VALUES (?, ?, ?)")?;
        insert.bind(1, "apple")?;
        insert.bind(2, "fruit")?;
        insert.bind(3, 125)?;
        insert.exec()?;

        insert.bind(1, "banana")?;
        insert.bind(2, "fruit")?;
        insert.bind(3, 70)?;
        insert.exec()?;
        drop(insert);

        Ok(fixture)
    }

    pub fn create_store(&self) -> Result<(), sqlitekit::Error> {
        self.conn
            .execute("CREATE TABLE store (article TEXT, category TEXT, amount INT)")?;
        Ok(())
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a second, independent connection to the same file
    pub fn second_connection(&self, options: &OpenOptions) -> Connection {
        Connection::open_with(&self.db_path, options).expect("Failed to open second connection")
    }

    /// Run a query and collect every row
    pub fn rows(&self, sql: &str) -> Vec<Row> {
        let mut stmt = self.conn.prepare(sql).expect("Failed to prepare query");
        let cursor = stmt.begin().expect("Failed to start query");
        cursor
            .collect::<Result<Vec<_>, _>>()
            .expect("Failed to read rows")
    }

    /// Run a query and render every column as text
    pub fn text_rows(&self, sql: &str) -> Vec<Vec<Option<String>>> {
        self.rows(sql)
            .iter()
            .map(|row| (0..row.len()).map(|i| row.text(i)).collect())
            .collect()
    }

    /// Number of rows in `table`
    pub fn count(&self, table: &str) -> i64 {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT count(*) FROM {}", table))
            .expect("Failed to prepare count");
        let cursor = stmt.begin().expect("Failed to run count");
        cursor.column_int64(0)
    }
}
