use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One bookmark row created by this tool, as recorded in the ledger.
///
/// `id` is the `moz_bookmarks` rowid assigned by the store. The ledger is the
/// source of truth for what this tool owns; restore deletes only ids found
/// here and never touches other bookmarks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub title: String,
    pub url: String,
    /// Microseconds since the UNIX epoch, matching Firefox's `dateAdded`.
    pub added_at: i64,
}

/// A point-in-time copy of the places database, taken before the first
/// mutation of a run. Kept for disaster recovery only; restore works from
/// the ledger so that unrelated bookmark changes made after the scan survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSnapshot {
    pub source_path: PathBuf,
    pub backup_path: PathBuf,
    /// Microseconds since the UNIX epoch.
    pub created_at: i64,
}

/// Result of a batch insert. The batch is not all-or-nothing: devices that
/// fail individually are skipped and listed in `failed` while the rest are
/// inserted and ledgered.
#[derive(Debug, Clone, Default)]
pub struct InsertOutcome {
    pub added: Vec<LedgerEntry>,
    pub failed: Vec<String>,
}
