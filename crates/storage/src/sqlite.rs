//! SQLite-backed view.

use crate::{Entry, Result, View};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// SQLite-backed key/value view.
pub struct SqliteView {
    conn: Mutex<Connection>,
}

impl SqliteView {
    /// Open or create a view at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "opening sqlite view");
        let conn = Connection::open(path)?;
        let view = Self {
            conn: Mutex::new(conn),
        };
        view.init_schema()?;
        Ok(view)
    }

    /// Create an in-memory view (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let view = Self {
            conn: Mutex::new(conn),
        };
        view.init_schema()?;
        Ok(view)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl View for SqliteView {
    fn get(&self, key: &str) -> Result<Option<Entry>> {
        let conn = self.conn.lock();
        let value: Option<Vec<u8>> = conn
            .query_row(
                "SELECT value FROM entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.map(|value| Entry::new(key, value)))
    }

    fn put(&self, entry: &Entry) -> Result<()> {
        self.conn.lock().execute(
            "INSERT INTO entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![entry.key, entry.value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT key FROM entries WHERE substr(key, 1, ?2) = ?1 ORDER BY key")?;

        let keys = stmt
            .query_map(params![prefix, prefix.chars().count() as i64], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(|key| key[prefix.len()..].to_string())
            .collect();

        Ok(keys)
    }
}
