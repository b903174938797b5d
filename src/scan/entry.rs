//! Entry records produced by the resolution engine.

use std::collections::HashMap;
use std::fs::Metadata;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

/// A normalized metadata snapshot for one filesystem node.
///
/// On Unix the real `uid`/`gid`/`mode` are recorded. On platforms without
/// POSIX permission bits the mode is forced to a fixed per-kind default
/// (see [`crate::fsx`]) so archives stay reproducible across platforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRecord {
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
    /// Modification time as seconds since the Unix epoch (0 if unknown).
    pub mtime: u64,
    pub size: u64,
}

impl StatRecord {
    /// Snapshot `metadata` (as returned by `symlink_metadata`, so symlinks
    /// report their own stats rather than their target's).
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            StatRecord {
                uid: metadata.uid(),
                gid: metadata.gid(),
                mode: metadata.mode(),
                mtime,
                size: metadata.len(),
            }
        }
        #[cfg(not(unix))]
        {
            let file_type = metadata.file_type();
            let mode = if file_type.is_dir() {
                crate::fsx::DEFAULT_DIR_MODE
            } else if file_type.is_symlink() {
                crate::fsx::DEFAULT_SYMLINK_MODE
            } else {
                crate::fsx::DEFAULT_FILE_MODE
            };
            StatRecord { uid: 0, gid: 0, mode, mtime, size: metadata.len() }
        }
    }
}

/// Kind-specific payload of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory {
        /// Number of descendant entries that survived ignore filtering.
        /// A directory whose count would be zero is never emitted.
        retained_child_count: u32,
    },
    Symlink {
        /// The raw target exactly as read from the filesystem.
        link_target: PathBuf,
        /// The target name to record in the archive. Starts out equal to
        /// `link_target` and is rewritten to the target's projected archive
        /// path when the target is itself part of the entry set.
        link_name: PathBuf,
    },
}

/// One filesystem node selected for archiving.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The path as given on the command line / descended to on disk.
    pub source_path: PathBuf,
    /// Canonicalized absolute path; the key used for deduplication and for
    /// the [`EntryIndex`].
    pub abs_path: PathBuf,
    /// The name under which this entry will appear inside the archive,
    /// relative, after ignore filtering and keep-parent projection.
    pub archive_path: PathBuf,
    pub stats: StatRecord,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink { .. })
    }
}

/// Two distinct source paths that would map to the same archive path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRecord {
    /// The later (losing) input, excluded from the archive.
    pub conflicting_path: PathBuf,
    /// The earlier (winning) input it collided with.
    pub conflicting_with_path: PathBuf,
}

/// Index payload: where an absolute source path ended up in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub archive_path: PathBuf,
    pub mode: u32,
}

/// Map from canonical absolute source path to its archive location, built
/// after merging. Used to rewrite symlink targets and detect broken links.
pub type EntryIndex = HashMap<PathBuf, IndexRecord>;
