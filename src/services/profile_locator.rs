//! Locating the Firefox profile that owns the bookmark database.
//!
//! Walks a root directory for files named `places.sqlite`, drops candidates
//! whose path contains an excluded keyword, and resolves the survivors to a
//! single path — automatically when one remains, via an injected chooser when
//! several do.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::types::errors::ProfileError;

/// The bookmark database filename inside every Firefox profile.
pub const PLACES_FILENAME: &str = "places.sqlite";

/// Path fragments that mark a profile as irrelevant: stale copies, other
/// Mozilla products sharing the profile layout, Wine prefixes.
pub const DEFAULT_EXCLUDED_KEYWORDS: [&str; 4] = ["Old", ".thunderbird", ".wine", "TorBrowser"];

/// One profile directory containing a places database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCandidate {
    /// The profile directory.
    pub path: PathBuf,
    /// The places.sqlite file inside it.
    pub database_path: PathBuf,
}

/// Selection capability used when several candidates survive: given the
/// candidate paths as strings, returns the index of the chosen one, or `None`
/// to decline. Injected so the core works without an interactive dependency.
pub type Chooser = dyn Fn(&[String]) -> Option<usize>;

/// Recursively searches `root` for places databases, skipping any whose full
/// path contains one of `excluded_keywords` (case-sensitive substring match).
///
/// Unreadable directories are skipped rather than failing the whole walk; a
/// home directory routinely contains entries we cannot stat.
pub fn locate(root: &Path, excluded_keywords: &[String]) -> Result<Vec<ProfileCandidate>, ProfileError> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() || entry.file_name() != OsStr::new(PLACES_FILENAME) {
            continue;
        }
        let database_path = entry.path().to_path_buf();
        let path_str = database_path.to_string_lossy();
        if excluded_keywords.iter().any(|kw| path_str.contains(kw.as_str())) {
            debug!(path = %path_str, "Candidate excluded by keyword");
            continue;
        }
        let profile_dir = database_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        debug!(path = %path_str, "Candidate profile found");
        candidates.push(ProfileCandidate {
            path: profile_dir,
            database_path,
        });
    }

    info!(count = candidates.len(), root = %root.display(), "Profile search finished");
    Ok(candidates)
}

/// Resolves a candidate list to one database path.
///
/// Exactly one candidate auto-selects. Several candidates invoke `chooser`;
/// without a chooser, or when the chooser declines or returns an out-of-range
/// index, the call fails with `AmbiguousProfile`. An empty list fails with
/// `NoProfileFound`.
pub fn resolve(
    root: &Path,
    candidates: &[ProfileCandidate],
    chooser: Option<&Chooser>,
) -> Result<PathBuf, ProfileError> {
    match candidates {
        [] => Err(ProfileError::NoProfileFound(root.display().to_string())),
        [only] => Ok(only.database_path.clone()),
        many => {
            let chooser = chooser.ok_or(ProfileError::AmbiguousProfile(many.len()))?;
            let labels: Vec<String> = many
                .iter()
                .map(|c| c.database_path.display().to_string())
                .collect();
            let index = chooser(&labels).ok_or(ProfileError::AmbiguousProfile(many.len()))?;
            let chosen = many
                .get(index)
                .ok_or(ProfileError::AmbiguousProfile(many.len()))?;
            Ok(chosen.database_path.clone())
        }
    }
}
