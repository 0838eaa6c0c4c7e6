//! SQLite database wrapper

use parking_lot::Mutex;
use qarar_analyzer::{ModelCatalog, ProbeExecutor};
use qarar_core::{QararError, QueryLog, QueryLogSource, Result};
use rusqlite::{Connection as RusqliteConnection, OpenFlags};
use std::path::Path;
use std::time::Instant;

use crate::introspect::introspect_catalog;

/// A SQLite database whose executed statements are recorded in a query log
pub struct SqliteDatabase {
    conn: Mutex<RusqliteConnection>,
    log: QueryLog,
}

impl SqliteDatabase {
    /// Open an existing database file read-only
    pub fn open(path: &Path, log: QueryLog) -> Result<Self> {
        tracing::info!(path = %path.display(), "opening SQLite database");

        if !path.exists() {
            return Err(QararError::Connection(format!(
                "Database file does not exist: {}",
                path.display()
            )));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = RusqliteConnection::open_with_flags(path, flags).map_err(|e| {
            QararError::Connection(format!(
                "Failed to open SQLite database at '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self::from_connection(conn, log))
    }

    /// Open a fresh in-memory database
    pub fn open_in_memory(log: QueryLog) -> Result<Self> {
        let conn = RusqliteConnection::open_in_memory().map_err(|e| {
            QararError::Connection(format!("Failed to open in-memory database: {}", e))
        })?;
        Ok(Self::from_connection(conn, log))
    }

    fn from_connection(conn: RusqliteConnection, log: QueryLog) -> Self {
        Self {
            conn: Mutex::new(conn),
            log,
        }
    }

    /// The log statements are recorded in
    pub fn log(&self) -> &QueryLog {
        &self.log
    }

    /// Run setup SQL without recording it
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .lock()
            .execute_batch(sql)
            .map_err(|e| QararError::Query(e.to_string()))
    }

    /// Build a model catalog from the database schema
    pub fn introspect_catalog(&self) -> Result<ModelCatalog> {
        let conn = self.conn.lock();
        introspect_catalog(&conn)
    }
}

impl ProbeExecutor for SqliteDatabase {
    fn execute(&self, sql: &str) -> Result<()> {
        let conn = self.conn.lock();
        let started = Instant::now();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| QararError::Query(format!("{}: {}", sql, e)))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| QararError::Query(format!("{}: {}", sql, e)))?;

        let mut row_count: u64 = 0;
        while rows
            .next()
            .map_err(|e| QararError::Query(format!("{}: {}", sql, e)))?
            .is_some()
        {
            row_count += 1;
        }

        let elapsed = started.elapsed();
        tracing::trace!(
            sql = %sql,
            rows = row_count,
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "executed statement"
        );
        self.log.record(sql, elapsed);
        Ok(())
    }

    fn query_log(&self) -> &dyn QueryLogSource {
        &self.log
    }
}
