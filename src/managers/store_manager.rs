//! Bookmark Store Manager — all mutation of the places database.
//!
//! Owns the four mutating operations of a run: backup, folder creation,
//! bookmark insertion, and ledger-scoped restore. Firefox schema bookkeeping
//! (type markers, parent linkage, position indexes, guids, the split between
//! `moz_places` and `moz_bookmarks`) stays inside this module; callers only
//! see row ids.

use base64::Engine;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::places::{map_db_err, PlacesDb};
use crate::managers::ledger::Ledger;
use crate::types::bookmark::{BackupSnapshot, InsertOutcome, LedgerEntry};
use crate::types::device::DeviceRecord;
use crate::types::errors::StoreError;

/// `moz_bookmarks.type` for a URL bookmark.
const TYPE_BOOKMARK: i64 = 1;
/// `moz_bookmarks.type` for a folder.
const TYPE_FOLDER: i64 = 2;
/// Parent of the folder this tool manages: the Bookmarks Menu root row.
const BOOKMARKS_MENU_ID: i64 = 1;

/// Manages bookmark mutation against one open places database plus the
/// ledger recording what this tool owns.
pub struct StoreManager<'a> {
    db: &'a PlacesDb,
    ledger: Ledger,
}

impl<'a> StoreManager<'a> {
    pub fn new(db: &'a PlacesDb, ledger_path: impl AsRef<Path>) -> Self {
        Self {
            db,
            ledger: Ledger::new(ledger_path),
        }
    }

    /// Returns the current timestamp in microseconds since the UNIX epoch,
    /// the unit Firefox uses for `dateAdded`/`lastModified`.
    fn now_micros() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as i64
    }

    /// Generates a places-style guid: 12 base64url characters.
    fn new_guid() -> String {
        let id = Uuid::new_v4();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&id.as_bytes()[..9])
    }

    /// Copies the places database to a sibling file named with a timestamp,
    /// returning the snapshot description. Never overwrites: if the candidate
    /// name exists the timestamp is bumped until a fresh name is found.
    ///
    /// Taken before the first mutation of a run; a failed backup must abort
    /// the run before anything is written.
    pub fn backup(database_path: &Path) -> Result<BackupSnapshot, StoreError> {
        if !database_path.is_file() {
            return Err(StoreError::Io(format!(
                "cannot back up '{}': not a file",
                database_path.display()
            )));
        }
        let dir = database_path
            .parent()
            .ok_or_else(|| StoreError::Io("database path has no parent directory".into()))?;

        let mut stamp = Self::now_micros();
        let backup_path = loop {
            let candidate = dir.join(format!("places_backup_{}.sqlite", stamp));
            if !candidate.exists() {
                break candidate;
            }
            stamp += 1;
        };

        fs::copy(database_path, &backup_path).map_err(|e| {
            StoreError::Io(format!(
                "copy '{}' to '{}': {}",
                database_path.display(),
                backup_path.display(),
                e
            ))
        })?;

        info!(backup = %backup_path.display(), "Backup created");
        Ok(BackupSnapshot {
            source_path: database_path.to_path_buf(),
            backup_path,
            created_at: stamp,
        })
    }

    /// Finds the folder with the given title under the Bookmarks Menu,
    /// creating it if absent, and returns its row id. Idempotent: a second
    /// call returns the same id without creating a duplicate.
    pub fn ensure_folder(&self, title: &str) -> Result<i64, StoreError> {
        let existing: Option<i64> = self
            .db
            .connection()
            .query_row(
                "SELECT id FROM moz_bookmarks
                 WHERE title = ?1 AND type = ?2 AND parent = ?3",
                params![title, TYPE_FOLDER, BOOKMARKS_MENU_ID],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_db_err)?;

        if let Some(id) = existing {
            debug!(folder_id = id, title, "Folder already present");
            return Ok(id);
        }

        let now = Self::now_micros();
        self.db.with_immediate_tx(|conn| {
            let position = next_position(conn, BOOKMARKS_MENU_ID)?;
            conn.execute(
                "INSERT INTO moz_bookmarks
                     (type, fk, parent, position, title, dateAdded, lastModified, guid)
                 VALUES (?1, NULL, ?2, ?3, ?4, ?5, ?5, ?6)",
                params![TYPE_FOLDER, BOOKMARKS_MENU_ID, position, title, now, Self::new_guid()],
            )
            .map_err(map_db_err)?;
            let id = conn.last_insert_rowid();
            info!(folder_id = id, title, "Folder created");
            Ok(id)
        })
    }

    /// Inserts one bookmark per device under `folder_id`, in input order,
    /// appending a ledger line for each inserted row.
    ///
    /// The batch is not atomic: a device that fails individually is skipped
    /// and reported in the outcome while earlier inserts stay committed and
    /// ledgered. Each device runs in its own transaction, so a failure rolls
    /// back only that row.
    pub fn add_bookmarks(
        &self,
        folder_id: i64,
        devices: &[DeviceRecord],
    ) -> Result<InsertOutcome, StoreError> {
        let mut outcome = InsertOutcome::default();

        for device in devices {
            match self.insert_one(folder_id, device) {
                Ok(entry) => {
                    debug!(id = entry.id, title = %entry.title, "Bookmark added");
                    outcome.added.push(entry);
                }
                Err(StoreError::ResourceBusy) => return Err(StoreError::ResourceBusy),
                Err(e) => {
                    warn!(title = %device.name, error = %e, "Bookmark insert failed, skipping");
                    outcome.failed.push(device.name.clone());
                }
            }
        }

        info!(
            added = outcome.added.len(),
            failed = outcome.failed.len(),
            "Bookmark batch finished"
        );
        Ok(outcome)
    }

    /// Inserts a single device: upsert its URL into `moz_places`, add the
    /// `moz_bookmarks` row at the next position under the folder, and append
    /// the ledger line, all in one transaction.
    fn insert_one(&self, folder_id: i64, device: &DeviceRecord) -> Result<LedgerEntry, StoreError> {
        let now = Self::now_micros();
        self.db.with_immediate_tx(|conn| {
            let place_id = ensure_place(conn, &device.url, &device.name)?;
            let position = next_position(conn, folder_id)?;
            conn.execute(
                "INSERT INTO moz_bookmarks
                     (type, fk, parent, position, title, dateAdded, lastModified, guid)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7)",
                params![
                    TYPE_BOOKMARK,
                    place_id,
                    folder_id,
                    position,
                    device.name,
                    now,
                    Self::new_guid()
                ],
            )
            .map_err(map_db_err)?;
            let entry = LedgerEntry {
                id: conn.last_insert_rowid(),
                title: device.name.clone(),
                url: device.url.clone(),
                added_at: now,
            };
            // Ledger inside the transaction: if the line cannot be written
            // the row rolls back, so a committed bookmark is always ledgered.
            // A failed commit leaves at most a stale entry, which restore
            // already tolerates.
            self.ledger.append(&entry)?;
            Ok(entry)
        })
    }

    /// Deletes every ledgered bookmark still present in the store and returns
    /// how many rows were removed.
    ///
    /// Entries whose rows were deleted are dropped from the ledger; entries
    /// whose rows no longer exist are kept, so nothing this tool might still
    /// own is forgotten. Bookmarks outside the ledger, the folder itself, and
    /// the backup snapshot are never touched.
    pub fn restore(&self) -> Result<usize, StoreError> {
        let entries = self.ledger.read_all()?;
        let mut kept = Vec::new();
        let mut removed = 0usize;

        for entry in entries {
            let deleted = self.delete_one(entry.id)?;
            if deleted {
                debug!(id = entry.id, title = %entry.title, "Bookmark removed");
                removed += 1;
            } else {
                kept.push(entry);
            }
        }

        self.ledger.rewrite(&kept)?;
        info!(removed, remaining = kept.len(), "Restore finished");
        Ok(removed)
    }

    /// Deletes one ledgered bookmark row if it still exists, cleaning up its
    /// `moz_places` row when no other bookmark references it. Returns whether
    /// a row was deleted.
    fn delete_one(&self, bookmark_id: i64) -> Result<bool, StoreError> {
        self.db.with_immediate_tx(|conn| {
            let fk: Option<Option<i64>> = conn
                .query_row(
                    "SELECT fk FROM moz_bookmarks WHERE id = ?1 AND type = ?2",
                    params![bookmark_id, TYPE_BOOKMARK],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_db_err)?;

            let Some(fk) = fk else {
                return Ok(false);
            };

            conn.execute("DELETE FROM moz_bookmarks WHERE id = ?1", params![bookmark_id])
                .map_err(map_db_err)?;

            if let Some(place_id) = fk {
                let references: i64 = conn
                    .query_row(
                        "SELECT COUNT(*) FROM moz_bookmarks WHERE fk = ?1",
                        params![place_id],
                        |row| row.get(0),
                    )
                    .map_err(map_db_err)?;
                if references == 0 {
                    conn.execute("DELETE FROM moz_places WHERE id = ?1", params![place_id])
                        .map_err(map_db_err)?;
                }
            }
            Ok(true)
        })
    }
}

/// Computes the next position index under a parent row.
fn next_position(conn: &Connection, parent_id: i64) -> Result<i64, StoreError> {
    conn.query_row(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM moz_bookmarks WHERE parent = ?1",
        params![parent_id],
        |row| row.get(0),
    )
    .map_err(map_db_err)
}

/// Returns the `moz_places` row id for a URL, inserting the row if the URL is
/// not known yet. Every bookmark row's `fk` must reference a valid places row.
fn ensure_place(conn: &Connection, url: &str, title: &str) -> Result<i64, StoreError> {
    let existing: Option<i64> = conn
        .query_row("SELECT id FROM moz_places WHERE url = ?1", params![url], |row| {
            row.get(0)
        })
        .optional()
        .map_err(map_db_err)?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let rev_host = url.splitn(2, "://").last().unwrap_or(url);
    conn.execute(
        "INSERT INTO moz_places (url, title, rev_host, guid) VALUES (?1, ?2, ?3, ?4)",
        params![url, title, rev_host, StoreManager::new_guid()],
    )
    .map_err(map_db_err)?;
    Ok(conn.last_insert_rowid())
}
