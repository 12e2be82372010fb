// File: src/storage/sqlite/store.rs

use super::config::SqliteConfig;
use super::schema;
use crate::error::{ServerError, ServerResult, StorageError};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite backend for the sequence counter, certificates, registry and
/// activity log
///
/// One connection behind a mutex; the sequence counter additionally runs in
/// an IMMEDIATE transaction so separate processes sharing the file are
/// serialized too.
pub struct SqliteStore {
    /// Database connection (protected by mutex for thread safety)
    conn: Arc<Mutex<Connection>>,

    config: SqliteConfig,
}

impl SqliteStore {
    /// Create a new SqliteStore with default configuration
    ///
    /// Creates the database file if it doesn't exist. Call
    /// [`initialize`](Self::initialize) before use.
    pub fn new<P: AsRef<Path>>(path: P) -> ServerResult<Self> {
        let config = SqliteConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Create with custom configuration
    pub fn with_config(config: SqliteConfig) -> ServerResult<Self> {
        let conn = Connection::open(&config.path).map_err(|e| {
            ServerError::Storage(StorageError::ConnectionFailed(format!(
                "failed to open db: {}",
                e
            )))
        })?;

        Self::configure_connection(&conn, &config)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> ServerResult<Self> {
        let config = SqliteConfig {
            path: ":memory:".to_string(),
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Configure SQLite connection pragmas
    fn configure_connection(conn: &Connection, config: &SqliteConfig) -> ServerResult<()> {
        if config.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }
        conn.pragma_update(None, "busy_timeout", config.busy_timeout_ms)?;
        if config.foreign_keys {
            conn.pragma_update(None, "foreign_keys", "ON")?;
        }
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(())
    }

    /// Create the schema and record its version
    ///
    /// Idempotent; safe to call on every startup.
    pub fn initialize(&self) -> ServerResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        schema::migrate(&conn)?;
        tracing::debug!(path = %self.config.path, "SQLite schema ready");
        Ok(())
    }

    /// Check if the schema exists
    pub fn is_initialized(&self) -> bool {
        self.schema_version().ok().flatten().is_some()
    }

    /// Stored schema version, `None` before initialization
    pub fn schema_version(&self) -> ServerResult<Option<u32>> {
        let conn = self.get_conn()?;
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'certify_config'",
            [],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(None);
        }

        let version: Option<String> = conn
            .query_row(
                "SELECT value FROM certify_config WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        version
            .map(|v| {
                v.parse().map_err(|_| {
                    ServerError::Storage(StorageError::Corruption(format!(
                        "invalid schema version: {}",
                        v
                    )))
                })
            })
            .transpose()
    }

    /// Get locked connection for internal operations
    pub(crate) fn get_conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::ConnectionFailed("lock poisoned".into()))
    }

    pub(crate) fn ping(&self) -> Result<(), StorageError> {
        let conn = self.get_conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}
