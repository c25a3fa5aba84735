//! Hierarchical key/value persistence.
//!
//! [`KeyStore`] is the only seam touching external persistent state: a
//! flat namespace of paths, each holding string keys and values. No
//! transactional guarantee is provided at this layer; atomicity of
//! multi-key sequences is the store's responsibility.

use crate::errors::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument};

/// Minimal abstraction over a hierarchical, persistent key/value namespace.
///
/// Implementable over a database, a filesystem directory tree, or an actual
/// platform registry; the store never assumes more than this contract.
pub trait KeyStore: Send + Sync {
    /// Creates a namespace path. Idempotent: creating an existing path
    /// succeeds without change.
    fn create(&self, path: &str) -> Result<()>;

    /// Whether the namespace path exists.
    fn exists(&self, path: &str) -> Result<bool>;

    /// Sets (or replaces) a key under an existing path.
    /// Fails with `PathNotFound` if the path was never created.
    fn set_value(&self, path: &str, key: &str, value: &str) -> Result<()>;

    /// Reads a key under an existing path; `None` when the key is absent.
    /// Fails with `PathNotFound` if the path was never created.
    fn get_value(&self, path: &str, key: &str) -> Result<Option<String>>;

    /// Lists every key under an existing path, sorted.
    /// Fails with `PathNotFound` if the path was never created.
    fn list_child_keys(&self, path: &str) -> Result<Vec<String>>;

    /// Deletes a key under an existing path. Deleting an absent key is a
    /// no-op at this layer; fails with `PathNotFound` if the path itself
    /// was never created.
    fn delete_key(&self, path: &str, key: &str) -> Result<()>;
}

/// Shared handle to the sqlite-backed store.
pub type StoreHandle = Arc<Mutex<Connection>>;

/// [`KeyStore`] backed by a local sqlite file.
pub struct SqliteKeyStore {
    conn: StoreHandle,
}

impl SqliteKeyStore {
    /// Opens (creating if necessary) the store file at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreUnavailable` if the file cannot be opened or
    /// the schema cannot be ensured.
    #[instrument]
    pub fn open(db_path: &str) -> Result<Self> {
        debug!("Opening key store at: {}", db_path);
        let conn = Connection::open(db_path).map_err(|e| {
            Error::StoreUnavailable(format!("Failed to open store at {db_path}: {e}"))
        })?;
        Self::from_connection(conn)
    }

    /// Opens a fresh in-memory store. The standard setup for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            Error::StoreUnavailable(format!("Failed to open in-memory store: {e}"))
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(|e| Error::StoreUnavailable(format!("Failed to enable foreign keys: {e}")))?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::StoreUnavailable("Failed to acquire store lock".to_string()))
    }

    fn path_exists(conn: &Connection, path: &str) -> Result<bool> {
        let mut stmt = conn
            .prepare_cached("SELECT 1 FROM namespaces WHERE path = ?1")
            .map_err(sql_err)?;
        let found: Option<i64> = stmt
            .query_row(params![path], |row| row.get(0))
            .optional()
            .map_err(sql_err)?;
        Ok(found.is_some())
    }

    fn require_path(conn: &Connection, path: &str) -> Result<()> {
        if Self::path_exists(conn, path)? {
            Ok(())
        } else {
            Err(Error::PathNotFound(path.to_string()))
        }
    }
}

fn sql_err(e: rusqlite::Error) -> Error {
    Error::StoreUnavailable(format!("Store query failed: {e}"))
}

#[instrument(skip(conn))]
fn create_tables(conn: &Connection) -> Result<()> {
    debug!("Ensuring key store tables exist.");
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS namespaces (
            path TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS entries (
            path TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (path, key),
            FOREIGN KEY (path) REFERENCES namespaces (path) ON DELETE CASCADE
        );

        COMMIT;",
    )
    .map_err(|e| Error::StoreUnavailable(format!("Failed to create store tables: {e}")))?;
    Ok(())
}

impl KeyStore for SqliteKeyStore {
    fn create(&self, path: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO namespaces (path) VALUES (?1)",
            params![path],
        )
        .map_err(sql_err)?;
        info!("Ensured namespace path '{}'.", path);
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let conn = self.lock()?;
        Self::path_exists(&conn, path)
    }

    fn set_value(&self, path: &str, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        Self::require_path(&conn, path)?;
        conn.execute(
            "INSERT INTO entries (path, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(path, key) DO UPDATE SET value = excluded.value",
            params![path, key, value],
        )
        .map_err(sql_err)?;
        debug!("Set {}/{}", path, key);
        Ok(())
    }

    fn get_value(&self, path: &str, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        Self::require_path(&conn, path)?;
        let mut stmt = conn
            .prepare_cached("SELECT value FROM entries WHERE path = ?1 AND key = ?2")
            .map_err(sql_err)?;
        let value: Option<String> = stmt
            .query_row(params![path, key], |row| row.get(0))
            .optional()
            .map_err(sql_err)?;
        Ok(value)
    }

    fn list_child_keys(&self, path: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;
        Self::require_path(&conn, path)?;
        let mut stmt = conn
            .prepare_cached("SELECT key FROM entries WHERE path = ?1 ORDER BY key")
            .map_err(sql_err)?;
        let rows = stmt
            .query_map(params![path], |row| row.get::<_, String>(0))
            .map_err(sql_err)?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(sql_err)?);
        }
        debug!("Listed {} keys under '{}'.", keys.len(), path);
        Ok(keys)
    }

    fn delete_key(&self, path: &str, key: &str) -> Result<()> {
        let conn = self.lock()?;
        Self::require_path(&conn, path)?;
        conn.execute(
            "DELETE FROM entries WHERE path = ?1 AND key = ?2",
            params![path, key],
        )
        .map_err(sql_err)?;
        debug!("Deleted {}/{}", path, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_tracing;

    #[test]
    fn create_is_idempotent_and_exists_reflects_it() -> Result<()> {
        init_test_tracing();
        let store = SqliteKeyStore::open_in_memory()?;

        assert!(!store.exists("databases")?);
        store.create("databases")?;
        assert!(store.exists("databases")?);
        store.create("databases")?;
        assert!(store.exists("databases")?);
        Ok(())
    }

    #[test]
    fn set_then_get_and_overwrite() -> Result<()> {
        init_test_tracing();
        let store = SqliteKeyStore::open_in_memory()?;
        store.create("metadata")?;

        store.set_value("metadata", "version", "1.0.0")?;
        assert_eq!(
            store.get_value("metadata", "version")?,
            Some("1.0.0".to_string())
        );

        store.set_value("metadata", "version", "1.0.1")?;
        assert_eq!(
            store.get_value("metadata", "version")?,
            Some("1.0.1".to_string())
        );
        Ok(())
    }

    #[test]
    fn reads_against_missing_path_fail_with_path_not_found() -> Result<()> {
        init_test_tracing();
        let store = SqliteKeyStore::open_in_memory()?;

        let err = store.get_value("nowhere", "k").expect_err("must fail");
        assert_eq!(err.kind_name(), "path-not-found");

        let err = store.list_child_keys("nowhere").expect_err("must fail");
        assert_eq!(err.kind_name(), "path-not-found");

        let err = store.delete_key("nowhere", "k").expect_err("must fail");
        assert_eq!(err.kind_name(), "path-not-found");
        Ok(())
    }

    #[test]
    fn missing_key_reads_as_none_and_deletes_as_noop() -> Result<()> {
        init_test_tracing();
        let store = SqliteKeyStore::open_in_memory()?;
        store.create("printers")?;

        assert_eq!(store.get_value("printers", "ghost")?, None);
        store.delete_key("printers", "ghost")?;
        Ok(())
    }

    #[test]
    fn list_child_keys_is_sorted_and_scoped_to_path() -> Result<()> {
        init_test_tracing();
        let store = SqliteKeyStore::open_in_memory()?;
        store.create("databases")?;
        store.create("printers")?;

        store.set_value("databases", "b", "2")?;
        store.set_value("databases", "a", "1")?;
        store.set_value("printers", "z", "9")?;

        assert_eq!(store.list_child_keys("databases")?, vec!["a", "b"]);
        assert_eq!(store.list_child_keys("printers")?, vec!["z"]);
        Ok(())
    }
}
