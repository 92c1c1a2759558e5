//! Connection management for a Firefox places database.
//!
//! Provides the [`PlacesDb`] struct that wraps a `rusqlite::Connection` opened
//! against an existing `places.sqlite`. Opening never creates the file — a
//! missing database is an error, not an empty store.

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

use crate::types::errors::StoreError;

/// How long a statement waits on a lock held by another process (a running
/// browser) before the operation fails with `ResourceBusy`.
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

/// Tables this tool reads and writes. Their absence means the file is not a
/// places database we understand.
const REQUIRED_TABLES: [&str; 2] = ["moz_bookmarks", "moz_places"];

/// Maps a rusqlite error to a `StoreError`, distinguishing lock contention
/// from everything else.
pub fn map_db_err(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(inner, _) = &e {
        if matches!(
            inner.code,
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
        ) {
            return StoreError::ResourceBusy;
        }
    }
    StoreError::Database(e.to_string())
}

/// Handle to an open places database.
pub struct PlacesDb {
    conn: Connection,
}

impl PlacesDb {
    /// Opens an existing places database read-write.
    ///
    /// Fails with `Io` if the file does not exist, `ResourceBusy` if another
    /// process holds it locked, and `SchemaViolation` if the expected tables
    /// are missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::Io(format!(
                "places database '{}' does not exist",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
            .map_err(map_db_err)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(map_db_err)?;
        let db = Self { conn };
        db.verify_schema()?;
        Ok(db)
    }

    /// Opens an in-memory database with a minimal places-compatible schema.
    ///
    /// Useful for testing — the database is discarded when the `PlacesDb`
    /// is dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(map_db_err)?;
        let db = Self { conn };
        db.create_schema()?;
        Ok(db)
    }

    /// Creates a new file-backed database with the minimal places schema.
    ///
    /// Used by tests and tooling that need a realistic profile layout on disk;
    /// real runs only ever `open` a database Firefox created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(map_db_err)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(map_db_err)?;
        let db = Self { conn };
        db.create_schema()?;
        Ok(db)
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `f` inside an IMMEDIATE transaction, committing on success and
    /// rolling back on failure. This is the row-level atomicity unit: one
    /// bookmark insert or delete per transaction, so a mid-batch failure
    /// leaves the database no worse than before that row.
    pub fn with_immediate_tx<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(map_db_err)?;
        match f(&self.conn) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT").map_err(map_db_err)?;
                Ok(value)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Checks that the tables this tool depends on exist.
    fn verify_schema(&self) -> Result<(), StoreError> {
        for table in REQUIRED_TABLES {
            let count: i64 = self
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .map_err(map_db_err)?;
            if count == 0 {
                return Err(StoreError::SchemaViolation(format!(
                    "missing table '{}'",
                    table
                )));
            }
        }
        Ok(())
    }

    /// Creates the subset of the Firefox places schema this tool touches,
    /// including the Bookmarks Menu root row (id 1) that new bookmarks and
    /// folders hang under.
    fn create_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS moz_places (
                    id INTEGER PRIMARY KEY,
                    url TEXT NOT NULL,
                    title TEXT,
                    rev_host TEXT,
                    visit_count INTEGER NOT NULL DEFAULT 0,
                    guid TEXT UNIQUE
                );

                CREATE TABLE IF NOT EXISTS moz_bookmarks (
                    id INTEGER PRIMARY KEY,
                    type INTEGER NOT NULL,
                    fk INTEGER,
                    parent INTEGER,
                    position INTEGER NOT NULL DEFAULT 0,
                    title TEXT,
                    dateAdded INTEGER,
                    lastModified INTEGER,
                    guid TEXT UNIQUE
                );

                CREATE INDEX IF NOT EXISTS moz_bookmarks_parentindex
                    ON moz_bookmarks (parent, position);

                INSERT OR IGNORE INTO moz_bookmarks
                    (id, type, fk, parent, position, title, dateAdded, lastModified, guid)
                VALUES
                    (1, 2, NULL, 0, 0, 'Bookmarks Menu', 0, 0, 'menu________');
                ",
            )
            .map_err(map_db_err)
    }
}
