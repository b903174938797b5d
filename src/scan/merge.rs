//! Cross-root merge and conflict resolution.
//!
//! The per-root entry lists are concatenated in command-line order and then
//! stable-sorted by archive path, so entries that collide on a name stay in
//! input order and the earliest input deterministically wins.

use crate::scan::entry::{ConflictRecord, Entry};

/// Merge entries from all roots into one list with unique archive paths.
///
/// Entries whose canonical source is identical collapse silently (the same
/// file reachable through two inputs). Distinct sources colliding on one
/// archive path keep the earliest-input entry and report every loser.
pub fn merge_entries(mut entries: Vec<Entry>) -> (Vec<Entry>, Vec<ConflictRecord>) {
    // sort_by is stable: ties keep original (input) order.
    entries.sort_by(|a, b| a.archive_path.cmp(&b.archive_path));

    let mut merged: Vec<Entry> = Vec::with_capacity(entries.len());
    let mut conflicts = Vec::new();

    for entry in entries {
        match merged.last() {
            Some(kept) if kept.archive_path == entry.archive_path => {
                if kept.abs_path == entry.abs_path {
                    // Idempotent re-specification of the same node.
                    continue;
                }
                conflicts.push(ConflictRecord {
                    conflicting_path: entry.source_path,
                    conflicting_with_path: kept.source_path.clone(),
                });
            }
            _ => merged.push(entry),
        }
    }

    (merged, conflicts)
}
