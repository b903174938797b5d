//! Keep-parent path projection.
//!
//! The walker leaves `archive_path` relative to the input path itself; this
//! pass rewrites it according to the keep-parent mode, once per root, after
//! that root's walk completes. Entries whose projected name comes out empty
//! (the root directory naming itself) are dropped.

use std::path::{Component, Path, PathBuf};

use crate::cli::KeepParent;
use crate::scan::entry::Entry;
use crate::scan::InputRoot;

/// Lexically normalize a path for use as an archive prefix: drive/root
/// markers and `.` segments are stripped, `..` segments collapse away the
/// preceding component (or vanish at the top), so `../out.txt` cleans to
/// `out.txt`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

/// Rewrite each entry's `archive_path` for `mode`, in place.
pub fn project_entries(entries: &mut Vec<Entry>, root: &InputRoot, mode: KeepParent) {
    // For a file input the "root directory" is its parent; the file's own
    // basename is part of what last/none must keep.
    let file_basename: Option<PathBuf> = if root.is_dir {
        None
    } else {
        root.canonical.file_name().map(PathBuf::from)
    };

    let prefix: PathBuf = match mode {
        KeepParent::Full => clean_path(&root.given),
        KeepParent::Last => {
            let root_dir = if root.is_dir {
                root.canonical.as_path()
            } else {
                root.canonical.parent().unwrap_or_else(|| Path::new(""))
            };
            root_dir.file_name().map(PathBuf::from).unwrap_or_default()
        }
        KeepParent::None => PathBuf::new(),
    };

    for entry in entries.iter_mut() {
        let rel = entry.archive_path.as_path();
        let base = match (mode, &file_basename) {
            // Full mode: the cleaned input spelling already names the file.
            (KeepParent::Full, _) | (_, None) => prefix.clone(),
            (_, Some(basename)) => prefix.join(basename),
        };
        // Joining an empty `rel` would append a trailing separator.
        entry.archive_path = if rel.as_os_str().is_empty() { base } else { base.join(rel) };
    }
    entries.retain(|entry| !entry.archive_path.as_os_str().is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::entry::{EntryKind, StatRecord};

    fn entry(rel: &str) -> Entry {
        Entry {
            source_path: PathBuf::from("unused"),
            abs_path: PathBuf::from("/unused"),
            archive_path: PathBuf::from(rel),
            stats: StatRecord { uid: 0, gid: 0, mode: 0o100644, mtime: 0, size: 0 },
            kind: EntryKind::File,
        }
    }

    fn dir_root(given: &str, canonical: &str) -> InputRoot {
        InputRoot {
            given: PathBuf::from(given),
            canonical: PathBuf::from(canonical),
            is_dir: true,
        }
    }

    #[test]
    fn clean_path_strips_root_and_collapses_parents() {
        assert_eq!(clean_path(Path::new("/a/b/c")), PathBuf::from("a/b/c"));
        assert_eq!(clean_path(Path::new("../out.txt")), PathBuf::from("out.txt"));
        assert_eq!(clean_path(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(clean_path(Path::new(".")), PathBuf::new());
        assert_eq!(clean_path(Path::new("../..")), PathBuf::new());
    }

    #[test]
    fn full_mode_keeps_cleaned_input_spelling() {
        let root = dir_root("work/dir-1", "/home/u/work/dir-1");
        let mut entries = vec![entry(""), entry("a.txt")];
        project_entries(&mut entries, &root, KeepParent::Full);
        let paths: Vec<_> = entries.iter().map(|e| e.archive_path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("work/dir-1"), PathBuf::from("work/dir-1/a.txt")]);
    }

    #[test]
    fn last_mode_keeps_only_the_root_basename() {
        let root = dir_root("work/dir-1", "/home/u/work/dir-1");
        let mut entries = vec![entry(""), entry("sub/a.txt")];
        project_entries(&mut entries, &root, KeepParent::Last);
        let paths: Vec<_> = entries.iter().map(|e| e.archive_path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("dir-1"), PathBuf::from("dir-1/sub/a.txt")]);
    }

    #[test]
    fn none_mode_drops_the_root_entry() {
        let root = dir_root("dir-1", "/home/u/dir-1");
        let mut entries = vec![entry(""), entry("a.txt"), entry("b.txt")];
        project_entries(&mut entries, &root, KeepParent::None);
        let paths: Vec<_> = entries.iter().map(|e| e.archive_path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
    }

    #[test]
    fn file_roots_keep_their_basename_in_none_and_last_modes() {
        let root = InputRoot {
            given: PathBuf::from("dir-1/a.txt"),
            canonical: PathBuf::from("/home/u/dir-1/a.txt"),
            is_dir: false,
        };

        let mut entries = vec![entry("")];
        project_entries(&mut entries, &root, KeepParent::None);
        assert_eq!(entries[0].archive_path, PathBuf::from("a.txt"));

        let mut entries = vec![entry("")];
        project_entries(&mut entries, &root, KeepParent::Last);
        assert_eq!(entries[0].archive_path, PathBuf::from("dir-1/a.txt"));

        let mut entries = vec![entry("")];
        project_entries(&mut entries, &root, KeepParent::Full);
        assert_eq!(entries[0].archive_path, PathBuf::from("dir-1/a.txt"));
    }

    #[test]
    fn rejoining_none_mode_output_with_the_root_reproduces_full_paths() {
        let root = dir_root("dir-1", "/home/u/dir-1");
        let rels = vec!["a.txt", "sub/b.txt"];

        let mut none_entries: Vec<_> = rels.iter().map(|r| entry(r)).collect();
        project_entries(&mut none_entries, &root, KeepParent::None);

        let mut full_entries: Vec<_> = rels.iter().map(|r| entry(r)).collect();
        project_entries(&mut full_entries, &root, KeepParent::Full);

        for (none_e, full_e) in none_entries.iter().zip(&full_entries) {
            assert_eq!(clean_path(&root.given).join(&none_e.archive_path), full_e.archive_path);
        }
    }
}
