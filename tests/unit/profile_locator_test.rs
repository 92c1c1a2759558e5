//! Unit tests for the profile locator.
//!
//! Each test builds a throwaway directory tree with `tempfile` and checks
//! which places.sqlite files survive the walk and the exclusion filter, and
//! how resolution behaves with zero, one, or several candidates.

use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use wledmark::services::profile_locator::{locate, resolve, ProfileCandidate};
use wledmark::types::errors::ProfileError;

/// Helper: creates `<root>/<relative>/places.sqlite` and returns its path.
fn make_profile(root: &Path, relative: &str) -> PathBuf {
    let dir = root.join(relative);
    fs::create_dir_all(&dir).unwrap();
    let db = dir.join("places.sqlite");
    fs::write(&db, b"").unwrap();
    db
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| s.to_string()).collect()
}

/// The scenario from the tool's home turf: one profile under `default`, one
/// under `Old`, excluding `Old` leaves exactly the default profile, which
/// then resolves without any selection input.
#[test]
fn test_excluded_keyword_filters_candidate_and_resolve_auto_selects() {
    let root = TempDir::new().unwrap();
    let default_db = make_profile(root.path(), "profiles/default");
    make_profile(root.path(), "profiles/Old");

    let candidates = locate(root.path(), &keywords(&["Old"])).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].database_path, default_db);

    let resolved = resolve(root.path(), &candidates, None).unwrap();
    assert_eq!(resolved, default_db);
}

/// An empty tree produces no candidates, and resolving nothing fails with
/// NoProfileFound.
#[test]
fn test_no_profile_found() {
    let root = TempDir::new().unwrap();

    let candidates = locate(root.path(), &[]).unwrap();
    assert!(candidates.is_empty());

    let result = resolve(root.path(), &candidates, None);
    assert!(matches!(result, Err(ProfileError::NoProfileFound(_))));
}

/// Several surviving candidates without a chooser is ambiguous.
#[test]
fn test_multiple_candidates_without_chooser_is_ambiguous() {
    let root = TempDir::new().unwrap();
    make_profile(root.path(), "a");
    make_profile(root.path(), "b");

    let candidates = locate(root.path(), &[]).unwrap();
    assert_eq!(candidates.len(), 2);

    let result = resolve(root.path(), &candidates, None);
    assert!(matches!(result, Err(ProfileError::AmbiguousProfile(2))));
}

/// With a chooser, the selected index wins; a declined or out-of-range
/// choice is ambiguous again.
#[test]
fn test_chooser_selects_among_candidates() {
    let root = TempDir::new().unwrap();
    make_profile(root.path(), "a");
    make_profile(root.path(), "b");

    let mut candidates = locate(root.path(), &[]).unwrap();
    candidates.sort_by(|x, y| x.database_path.cmp(&y.database_path));

    let pick_second = |_options: &[String]| Some(1usize);
    let resolved = resolve(root.path(), &candidates, Some(&pick_second)).unwrap();
    assert_eq!(resolved, candidates[1].database_path);

    let decline = |_options: &[String]| None;
    let result = resolve(root.path(), &candidates, Some(&decline));
    assert!(matches!(result, Err(ProfileError::AmbiguousProfile(2))));

    let out_of_range = |_options: &[String]| Some(99usize);
    let result = resolve(root.path(), &candidates, Some(&out_of_range));
    assert!(matches!(result, Err(ProfileError::AmbiguousProfile(2))));
}

/// Files that are not named places.sqlite never become candidates.
#[test]
fn test_unrelated_files_are_ignored() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("profile");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("cookies.sqlite"), b"").unwrap();

    let candidates = locate(root.path(), &[]).unwrap();
    assert!(candidates.is_empty());
}

/// The default Mozilla-adjacent exclusions all knock out a matching path.
#[rstest]
#[case("Old/profile")]
#[case(".thunderbird/abc.default")]
#[case(".wine/drive_c/firefox")]
#[case("TorBrowser/Data")]
fn test_default_exclusions(#[case] relative: &str) {
    let root = TempDir::new().unwrap();
    make_profile(root.path(), relative);

    let excluded = keywords(&["Old", ".thunderbird", ".wine", "TorBrowser"]);
    let candidates = locate(root.path(), &excluded).unwrap();
    assert!(candidates.is_empty(), "'{}' should be excluded", relative);
}

/// The candidate's profile directory is the parent of the database file.
#[test]
fn test_candidate_profile_dir() {
    let root = TempDir::new().unwrap();
    let db = make_profile(root.path(), "deep/nested/profile");

    let candidates = locate(root.path(), &[]).unwrap();
    assert_eq!(
        candidates,
        vec![ProfileCandidate {
            path: db.parent().unwrap().to_path_buf(),
            database_path: db,
        }]
    );
}
