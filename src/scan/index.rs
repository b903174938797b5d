//! Absolute-path index and post-merge symlink rewriting.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::scan::entry::{Entry, EntryIndex, EntryKind, IndexRecord};

/// Build the canonical-path index over the final merged entry list.
pub fn build_index(entries: &[Entry]) -> EntryIndex {
    entries
        .iter()
        .map(|entry| {
            (
                entry.abs_path.clone(),
                IndexRecord { archive_path: entry.archive_path.clone(), mode: entry.stats.mode },
            )
        })
        .collect()
}

/// Rewrite each kept symlink's `link_name` to its target's projected archive
/// path when the target is part of the entry set, so the recorded link
/// resolves inside the archive layout rather than the original filesystem.
///
/// Returns the archive paths of broken links: symlinks whose target is not
/// part of the archive. Those entries stay in the output with their raw
/// target string.
pub fn rewrite_symlinks(entries: &mut [Entry], index: &EntryIndex) -> Vec<PathBuf> {
    let mut broken = Vec::new();

    for entry in entries.iter_mut() {
        let (link_target, link_name) = match &mut entry.kind {
            EntryKind::Symlink { link_target, link_name } => (&*link_target, link_name),
            _ => continue,
        };

        let parent = entry.abs_path.parent().unwrap_or_else(|| Path::new(""));
        let resolved = resolve_target(parent, link_target);

        match index.get(&resolved) {
            Some(record) => *link_name = record.archive_path.clone(),
            None => {
                warn!(
                    link = %entry.archive_path.display(),
                    target = %link_target.display(),
                    "symlink target is not part of the archive"
                );
                broken.push(entry.archive_path.clone());
            }
        }
    }

    broken
}

/// Resolve a raw link target against the link's parent directory. Prefers
/// the filesystem's own canonicalization (the target may pass through other
/// symlinks); falls back to lexical normalization when the target does not
/// exist.
fn resolve_target(parent: &Path, target: &Path) -> PathBuf {
    let joined = if target.is_absolute() { target.to_path_buf() } else { parent.join(target) };
    std::fs::canonicalize(&joined).unwrap_or_else(|_| normalize_lexically(&joined))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}
