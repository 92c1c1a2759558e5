//! Session orchestrator for wledmark.
//!
//! Sequences one run end to end: scan → resolve profile → back up → bookmark,
//! or resolve profile → restore. Each transition corresponds to exactly one
//! component call; any component error moves the session to `Failed` and
//! nothing further runs. No retries happen at this layer.

use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::database::PlacesDb;
use crate::managers::store_manager::StoreManager;
use crate::services::discovery::DiscoveryEngine;
use crate::services::profile_locator::{self, Chooser, DEFAULT_EXCLUDED_KEYWORDS};
use crate::types::device::DeviceRecord;
use crate::types::errors::SessionError;

/// Where a session currently is. Terminal states are `Done` and `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Scanning,
    ResolvingProfile,
    Bookmarking,
    Restoring,
    Done,
    /// Terminal failure, carrying the originating error's message.
    Failed(String),
}

/// Inputs for one run, supplied by the CLI layer.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Scan window length.
    pub duration: Duration,
    /// Manual places.sqlite path; set, it bypasses the profile locator.
    pub profile_path: Option<PathBuf>,
    /// Root directory searched for profiles when no manual path is given.
    pub search_root: PathBuf,
    /// Substrings that disqualify a candidate profile path.
    pub excluded_keywords: Vec<String>,
    /// Title of the bookmark folder the devices land under.
    pub folder_title: String,
    /// Path of the ledger file recording what this tool owns.
    pub ledger_path: PathBuf,
}

impl SessionConfig {
    pub fn new(search_root: PathBuf, ledger_path: PathBuf) -> Self {
        Self {
            duration: Duration::from_secs(30),
            profile_path: None,
            search_root,
            excluded_keywords: DEFAULT_EXCLUDED_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            folder_title: "LED Strips".to_string(),
            ledger_path,
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub devices: Vec<DeviceRecord>,
    pub added: usize,
    pub failed: Vec<String>,
    pub removed: usize,
    pub profile: Option<PathBuf>,
    pub backup: Option<PathBuf>,
}

/// One run of the tool, in either scan or restore mode.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Default mode: discover controllers, resolve the profile, back up the
    /// database, and bookmark every device found.
    ///
    /// Zero discovered devices is not an error — the session completes with
    /// an empty report and the caller decides how to signal it. Partial
    /// insert failures are soft: the run reaches `Done` with both counts in
    /// the report.
    pub fn run_scan(&mut self, chooser: Option<&Chooser>) -> Result<SessionReport, SessionError> {
        let mut report = SessionReport::default();

        self.state = SessionState::Scanning;
        let devices = self
            .step(DiscoveryEngine::new().scan(self.config.duration))?;
        report.devices = devices;

        if report.devices.is_empty() {
            info!("No controllers discovered; nothing to bookmark");
            self.state = SessionState::Done;
            return Ok(report);
        }

        self.state = SessionState::ResolvingProfile;
        let places_path = self.resolve_profile(chooser)?;
        report.profile = Some(places_path.clone());

        self.state = SessionState::Bookmarking;
        // Backup precedes every mutation; a failed backup aborts the run here.
        let snapshot = self.step(StoreManager::backup(&places_path))?;
        report.backup = Some(snapshot.backup_path);

        let result = (|| {
            let db = PlacesDb::open(&places_path)?;
            let manager = StoreManager::new(&db, &self.config.ledger_path);
            let folder_id = manager.ensure_folder(&self.config.folder_title)?;
            manager.add_bookmarks(folder_id, &report.devices)
        })();
        let outcome = self.step(result)?;
        report.added = outcome.added.len();
        report.failed = outcome.failed;

        self.state = SessionState::Done;
        Ok(report)
    }

    /// Restore mode: resolve the profile, back up the database, and remove
    /// every ledgered bookmark still present in the store.
    pub fn run_restore(&mut self, chooser: Option<&Chooser>) -> Result<SessionReport, SessionError> {
        let mut report = SessionReport::default();

        self.state = SessionState::ResolvingProfile;
        let places_path = self.resolve_profile(chooser)?;
        report.profile = Some(places_path.clone());

        self.state = SessionState::Restoring;
        // Restore mutates the store too, so the same rule applies: backup
        // first, and abort the run if it fails.
        let snapshot = self.step(StoreManager::backup(&places_path))?;
        report.backup = Some(snapshot.backup_path);

        let result = (|| {
            let db = PlacesDb::open(&places_path)?;
            let manager = StoreManager::new(&db, &self.config.ledger_path);
            manager.restore()
        })();
        report.removed = self.step(result)?;

        self.state = SessionState::Done;
        Ok(report)
    }

    /// Resolves the places database path: the manual override when given,
    /// otherwise locate + resolve with the injected chooser.
    fn resolve_profile(&mut self, chooser: Option<&Chooser>) -> Result<PathBuf, SessionError> {
        if let Some(path) = &self.config.profile_path {
            return Ok(path.clone());
        }
        let candidates = self.step(profile_locator::locate(
            &self.config.search_root,
            &self.config.excluded_keywords,
        ))?;
        self.step(profile_locator::resolve(
            &self.config.search_root,
            &candidates,
            chooser,
        ))
    }

    /// Maps a component result into the session: an error becomes the
    /// terminal `Failed` state with the error kind attached.
    fn step<T, E: Into<SessionError>>(&mut self, result: Result<T, E>) -> Result<T, SessionError> {
        result.map_err(|e| {
            let err = e.into();
            self.state = SessionState::Failed(err.to_string());
            err
        })
    }
}
