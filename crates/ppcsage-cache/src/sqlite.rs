//! SQLite-backed key-value store.
//!
//! One table keyed by `(namespace, key)`. Every call runs on the tokio
//! blocking pool against a single connection behind a mutex.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use ppcsage_core::{Error, Result};

use crate::entry::Namespace;
use crate::store::KvStore;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS cache_entries (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (namespace, key)
);
";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the store at `db_path`, creating parent directories.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Self::init_schema(&conn)?;

        info!("SqliteStore initialized at {}", db_path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Database(e.to_string()))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: None,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn).map_err(|e| Error::Database(e.to_string()))
        })
        .await
        .map_err(|e| Error::Internal(format!("SQLite task failed: {}", e)))?
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn put(&self, ns: Namespace, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO cache_entries (namespace, key, value) VALUES (?1, ?2, ?3)",
                params![ns.as_str(), key, value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn get(&self, ns: Namespace, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value FROM cache_entries WHERE namespace = ?1 AND key = ?2",
                params![ns.as_str(), key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    async fn delete(&self, ns: Namespace, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM cache_entries WHERE namespace = ?1 AND key = ?2",
                params![ns.as_str(), key],
            )
            .map(|_| ())
        })
        .await
    }

    async fn list_all(&self, ns: Namespace) -> Result<Vec<(String, String)>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT key, value FROM cache_entries WHERE namespace = ?1 ORDER BY key",
            )?;
            let rows = stmt.query_map(params![ns.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
    }

    async fn clear(&self, ns: Namespace) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM cache_entries WHERE namespace = ?1",
                params![ns.as_str()],
            )
            .map(|_| ())
        })
        .await
    }
}
