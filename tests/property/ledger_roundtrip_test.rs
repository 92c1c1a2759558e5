//! Property-based tests for the ledger file.
//!
//! The ledger is the source of truth for what the tool owns, so appending
//! entries and reading them back must round-trip exactly, and a rewrite must
//! replace the contents wholesale.

use proptest::prelude::*;
use tempfile::TempDir;

use wledmark::managers::ledger::Ledger;
use wledmark::types::bookmark::LedgerEntry;

/// Strategy for a plausible ledger entry: store-assigned rowid, printable
/// title, http URL, microsecond timestamp.
fn arb_entry() -> impl Strategy<Value = LedgerEntry> {
    (
        1i64..1_000_000,
        "[a-zA-Z0-9][a-zA-Z0-9 ._-]{0,30}",
        "[a-z0-9.]{1,20}",
        1u16..,
        0i64..2_000_000_000_000_000,
    )
        .prop_map(|(id, title, host, port, added_at)| LedgerEntry {
            id,
            title,
            url: format!("http://{}:{}/", host, port),
            added_at,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Appending any sequence of entries and reading the file back yields the
    // same sequence, in order.
    #[test]
    fn append_then_read_roundtrips(entries in proptest::collection::vec(arb_entry(), 0..20)) {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::new(dir.path().join("ledger.jsonl"));

        for entry in &entries {
            ledger.append(entry).expect("append should succeed");
        }

        let read = ledger.read_all().expect("read_all should succeed");
        prop_assert_eq!(read, entries);
    }

    // Rewriting with a subset leaves exactly that subset, regardless of what
    // was appended before.
    #[test]
    fn rewrite_replaces_contents(
        before in proptest::collection::vec(arb_entry(), 0..10),
        after in proptest::collection::vec(arb_entry(), 0..10),
    ) {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::new(dir.path().join("ledger.jsonl"));

        for entry in &before {
            ledger.append(entry).expect("append should succeed");
        }
        ledger.rewrite(&after).expect("rewrite should succeed");

        let read = ledger.read_all().expect("read_all should succeed");
        prop_assert_eq!(read, after);
    }

    // Appending after a rewrite keeps the rewrite as a prefix: the file is
    // append-only outside of restore.
    #[test]
    fn append_after_rewrite_extends(
        kept in proptest::collection::vec(arb_entry(), 0..5),
        extra in arb_entry(),
    ) {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::new(dir.path().join("ledger.jsonl"));

        ledger.rewrite(&kept).expect("rewrite should succeed");
        ledger.append(&extra).expect("append should succeed");

        let read = ledger.read_all().expect("read_all should succeed");
        prop_assert_eq!(read.len(), kept.len() + 1);
        prop_assert_eq!(&read[..kept.len()], &kept[..]);
        prop_assert_eq!(read.last().unwrap(), &extra);
    }
}

/// A missing ledger file reads as empty rather than an error.
#[test]
fn missing_ledger_is_empty() {
    let dir = TempDir::new().unwrap();
    let ledger = Ledger::new(dir.path().join("absent.jsonl"));
    assert!(ledger.read_all().unwrap().is_empty());
}

/// Garbage in the file surfaces as corruption, not as silently dropped rows.
#[test]
fn malformed_line_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.jsonl");
    std::fs::write(&path, "not json\n").unwrap();

    let ledger = Ledger::new(&path);
    assert!(ledger.read_all().is_err());
}
