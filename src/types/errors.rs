use std::fmt;

// === ScanError ===

/// Errors related to mDNS service discovery.
#[derive(Debug)]
pub enum ScanError {
    /// The scan duration was zero or otherwise unusable.
    InvalidDuration(u64),
    /// The mDNS daemon could not be started or browsed.
    Daemon(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::InvalidDuration(secs) => {
                write!(f, "Invalid scan duration: {} seconds", secs)
            }
            ScanError::Daemon(msg) => write!(f, "mDNS daemon error: {}", msg),
        }
    }
}

impl std::error::Error for ScanError {}

// === ProfileError ===

/// Errors related to locating a Firefox profile's places database.
#[derive(Debug)]
pub enum ProfileError {
    /// No places.sqlite survived the search and exclusion filter.
    NoProfileFound(String),
    /// More than one candidate remained and no selection was made.
    AmbiguousProfile(usize),
    /// The profile search itself failed.
    Io(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::NoProfileFound(root) => {
                write!(f, "No places.sqlite found under '{}'", root)
            }
            ProfileError::AmbiguousProfile(count) => {
                write!(f, "{} profiles found and none selected", count)
            }
            ProfileError::Io(msg) => write!(f, "Profile search error: {}", msg),
        }
    }
}

impl std::error::Error for ProfileError {}

// === StoreError ===

/// Errors related to the bookmark store (places database, backup, ledger).
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing a file failed (backup, ledger).
    Io(String),
    /// The database is locked by another process (a running browser).
    ResourceBusy,
    /// The database does not look like a Firefox places database.
    SchemaViolation(String),
    /// A SQL operation failed.
    Database(String),
    /// A ledger line could not be parsed.
    LedgerCorrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "Store I/O error: {}", msg),
            StoreError::ResourceBusy => {
                write!(f, "Places database is locked by another process")
            }
            StoreError::SchemaViolation(msg) => {
                write!(f, "Unexpected places schema: {}", msg)
            }
            StoreError::Database(msg) => write!(f, "Places database error: {}", msg),
            StoreError::LedgerCorrupt(msg) => write!(f, "Ledger corrupt: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// === SessionError ===

/// Component error surfaced to the session orchestrator. Each variant wraps
/// the originating error kind; the session maps any of them to its terminal
/// `Failed` state without retrying.
#[derive(Debug)]
pub enum SessionError {
    Scan(ScanError),
    Profile(ProfileError),
    Store(StoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Scan(e) => write!(f, "{}", e),
            SessionError::Profile(e) => write!(f, "{}", e),
            SessionError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Scan(e) => Some(e),
            SessionError::Profile(e) => Some(e),
            SessionError::Store(e) => Some(e),
        }
    }
}

impl From<ScanError> for SessionError {
    fn from(e: ScanError) -> Self {
        SessionError::Scan(e)
    }
}

impl From<ProfileError> for SessionError {
    fn from(e: ProfileError) -> Self {
        SessionError::Profile(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e)
    }
}
