//! Recursive directory walker.
//!
//! Visits one root depth-first, consulting the [`IgnoreCascade`] at each
//! directory and applying the configured symlink policy. Produces entries
//! whose `archive_path` is still relative to the root; keep-parent
//! projection happens afterwards in [`super::project`].
//!
//! The walk is strictly sequential and best-effort: unreadable or vanished
//! nodes are skipped silently rather than aborting the pass.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::SymlinkPolicy;
use crate::scan::entry::{Entry, EntryKind, StatRecord};
use crate::scan::ignore::IgnoreCascade;
use crate::scan::{InputRoot, ScanOptions};

struct WalkContext<'a> {
    opts: &'a ScanOptions,
    /// Canonical path of the root being walked. Joined with `rel` it gives a
    /// node's logical location, which is where ignore rules are matched.
    /// Logical and physical paths only diverge inside subtrees substituted
    /// by the `resolve` symlink policy.
    base: PathBuf,
    entries: Vec<Entry>,
    /// Canonical paths of directories on the current recursion path; breaks
    /// symlink cycles under the `resolve` policy.
    visiting: HashSet<PathBuf>,
}

/// Walk one input root and return its entry set in directory-read order.
///
/// A root that is itself rejected by the caller's exclusion rules, or that
/// cannot be read at all, yields an empty result (not an error).
pub fn walk_root(root: &InputRoot, opts: &ScanOptions) -> Vec<Entry> {
    let cascade = match root.canonical.parent() {
        Some(parent) => {
            let cascade = IgnoreCascade::for_root_parent(parent, opts);
            if cascade.is_ignored(&root.canonical, root.is_dir) {
                debug!(root = %root.given.display(), "root rejected by exclusion rules");
                return Vec::new();
            }
            cascade
        }
        // Filesystem root has no parent to scope caller rules to.
        None => IgnoreCascade::default(),
    };

    let mut ctx = WalkContext {
        opts,
        base: root.canonical.clone(),
        entries: Vec::new(),
        visiting: HashSet::new(),
    };
    walk_node(&mut ctx, &root.given, &root.canonical, Path::new(""), &cascade);
    ctx.entries
}

/// Visit one node. Returns the number of archive entries this node
/// contributes to its parent's retained-child count.
fn walk_node(
    ctx: &mut WalkContext<'_>,
    fs_path: &Path,
    abs_path: &Path,
    rel: &Path,
    cascade: &IgnoreCascade,
) -> u32 {
    let metadata = match fs::symlink_metadata(fs_path) {
        Ok(metadata) => metadata,
        Err(err) => {
            // Vanished or unreadable mid-walk; degrade gracefully.
            debug!(path = %fs_path.display(), %err, "skipping unreadable entry");
            return 0;
        }
    };
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        return walk_symlink(ctx, fs_path, abs_path, rel, cascade, &metadata);
    }

    if file_type.is_dir() {
        return walk_dir(ctx, fs_path, abs_path, rel, cascade, &metadata);
    }

    if file_type.is_file() {
        ctx.entries.push(Entry {
            source_path: fs_path.to_path_buf(),
            abs_path: abs_path.to_path_buf(),
            archive_path: rel.to_path_buf(),
            stats: StatRecord::from_metadata(&metadata),
            kind: EntryKind::File,
        });
        return 1;
    }

    // Sockets, fifos, device nodes: nothing sensible to archive.
    debug!(path = %fs_path.display(), "skipping special file");
    0
}

fn walk_dir(
    ctx: &mut WalkContext<'_>,
    fs_path: &Path,
    abs_path: &Path,
    rel: &Path,
    cascade: &IgnoreCascade,
    metadata: &fs::Metadata,
) -> u32 {
    if !ctx.visiting.insert(abs_path.to_path_buf()) {
        debug!(path = %abs_path.display(), "symlink cycle detected, pruning");
        return 0;
    }

    // Ignore rules are matched at the logical location, so ancestor rule
    // sets keep applying inside subtrees substituted by `resolve`.
    let logical =
        if rel.as_os_str().is_empty() { ctx.base.clone() } else { ctx.base.join(rel) };

    // This directory's own ignore files extend a *copy* of the stack, so
    // sibling subtrees never observe them.
    let child_cascade = cascade.descend_scoped(&logical, abs_path, ctx.opts);

    let mut retained = 0u32;
    match fs::read_dir(fs_path) {
        Ok(read_dir) => {
            for child in read_dir.flatten() {
                let name = child.file_name();
                let child_fs = fs_path.join(&name);
                let child_abs = abs_path.join(&name);
                let child_is_dir = is_dir_candidate(ctx.opts, &child_fs, child.file_type().ok());
                if child_cascade.is_ignored(&logical.join(&name), child_is_dir) {
                    continue;
                }
                retained += walk_node(ctx, &child_fs, &child_abs, &rel.join(&name), &child_cascade);
            }
        }
        Err(err) => {
            debug!(path = %fs_path.display(), %err, "cannot read directory");
        }
    }

    ctx.visiting.remove(abs_path);

    if retained == 0 {
        // Genuinely empty, or emptied by filtering: the directory itself is
        // omitted from the archive.
        return 0;
    }
    ctx.entries.push(Entry {
        source_path: fs_path.to_path_buf(),
        abs_path: abs_path.to_path_buf(),
        archive_path: rel.to_path_buf(),
        stats: StatRecord::from_metadata(metadata),
        kind: EntryKind::Directory { retained_child_count: retained },
    });
    retained + 1
}

/// Whether a child should be matched as a directory candidate. Under the
/// `resolve` policy a symlink stands in for its target, so trailing-`/`
/// patterns must see the target's kind to prune the subtree up front.
fn is_dir_candidate(opts: &ScanOptions, fs_path: &Path, file_type: Option<fs::FileType>) -> bool {
    match file_type {
        Some(t) if t.is_symlink() && opts.symlink == SymlinkPolicy::Resolve => {
            fs::metadata(fs_path).map(|m| m.is_dir()).unwrap_or(false)
        }
        Some(t) => t.is_dir(),
        None => false,
    }
}

fn walk_symlink(
    ctx: &mut WalkContext<'_>,
    fs_path: &Path,
    abs_path: &Path,
    rel: &Path,
    cascade: &IgnoreCascade,
    metadata: &fs::Metadata,
) -> u32 {
    match ctx.opts.symlink {
        SymlinkPolicy::None => 0,
        SymlinkPolicy::Keep => {
            let target = match fs::read_link(fs_path) {
                Ok(target) => target,
                Err(err) => {
                    debug!(path = %fs_path.display(), %err, "cannot read symlink");
                    return 0;
                }
            };
            ctx.entries.push(Entry {
                source_path: fs_path.to_path_buf(),
                abs_path: abs_path.to_path_buf(),
                archive_path: rel.to_path_buf(),
                stats: StatRecord::from_metadata(metadata),
                kind: EntryKind::Symlink { link_target: target.clone(), link_name: target },
            });
            1
        }
        SymlinkPolicy::Resolve => {
            // Transparently substitute the target's subtree, keeping the
            // original archive name and the original rule stack.
            let real = match fs::canonicalize(fs_path) {
                Ok(real) => real,
                Err(err) => {
                    debug!(path = %fs_path.display(), %err, "cannot resolve symlink");
                    return 0;
                }
            };
            walk_node(ctx, &real, &real, rel, cascade)
        }
    }
}
