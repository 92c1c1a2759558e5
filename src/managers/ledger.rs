//! Append-only ledger of bookmarks this tool has created.
//!
//! One JSON object per line. Lines are appended as bookmarks are inserted and
//! the file is rewritten only by restore, which keeps the entries it could not
//! delete. The ledger — not the backup snapshot — scopes what restore may
//! remove.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::types::bookmark::LedgerEntry;
use crate::types::errors::StoreError;

/// Handle to the ledger file. The file may not exist yet; reading a missing
/// ledger yields an empty list.
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry as a JSON line, creating the file if needed.
    pub fn append(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        let line = serde_json::to_string(entry)
            .map_err(|e| StoreError::Io(format!("serialize ledger entry: {}", e)))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::Io(format!("open ledger '{}': {}", self.path.display(), e)))?;
        writeln!(file, "{}", line)
            .map_err(|e| StoreError::Io(format!("append to ledger: {}", e)))?;
        Ok(())
    }

    /// Reads every entry. A missing file is an empty ledger; a malformed line
    /// fails with `LedgerCorrupt` rather than silently dropping entries.
    pub fn read_all(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io(format!(
                    "open ledger '{}': {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut entries = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| StoreError::Io(format!("read ledger: {}", e)))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: LedgerEntry = serde_json::from_str(&line)
                .map_err(|e| StoreError::LedgerCorrupt(format!("line {}: {}", lineno + 1, e)))?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Replaces the ledger contents. Only restore calls this, to drop the
    /// entries it deleted from the store.
    pub fn rewrite(&self, entries: &[LedgerEntry]) -> Result<(), StoreError> {
        let mut file = File::create(&self.path)
            .map_err(|e| StoreError::Io(format!("rewrite ledger '{}': {}", self.path.display(), e)))?;
        for entry in entries {
            let line = serde_json::to_string(entry)
                .map_err(|e| StoreError::Io(format!("serialize ledger entry: {}", e)))?;
            writeln!(file, "{}", line)
                .map_err(|e| StoreError::Io(format!("rewrite ledger: {}", e)))?;
        }
        Ok(())
    }
}
