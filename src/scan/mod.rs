//! Entry resolution engine.
//!
//! Given a list of input roots and a [`ScanOptions`], produces the single,
//! order-stable, conflict-free entry list that the archive codecs consume
//! blindly: walk each root depth-first under the cascading ignore filter,
//! project archive names per the keep-parent mode, merge across roots with
//! deterministic conflict resolution, then build the absolute-path index
//! and rewrite symlink targets against it.
//!
//! The engine is best-effort and fully reported: unreadable or vanished
//! nodes are skipped, while conflicts and broken links are aggregated into
//! the returned [`Resolution`] for the caller to act on.

pub mod entry;
pub mod ignore;
pub mod index;
pub mod merge;
pub mod project;
pub mod walker;

pub use entry::{ConflictRecord, Entry, EntryIndex, EntryKind, IndexRecord, StatRecord};

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::cli::{DisableIgnore, KeepParent, SymlinkPolicy};

/// Engine configuration, one value per invocation.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub symlink: SymlinkPolicy,
    pub keep_parent: KeepParent,
    /// Include `.git` directories instead of excluding them implicitly.
    pub allow_git: bool,
    /// Caller-supplied gitignore-syntax exclusion patterns.
    pub excludes: Vec<String>,
    pub disable_ignore: DisableIgnore,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            symlink: SymlinkPolicy::Keep,
            keep_parent: KeepParent::Full,
            allow_git: false,
            excludes: Vec::new(),
            disable_ignore: DisableIgnore::None,
        }
    }
}

/// One deduplicated input root.
#[derive(Debug, Clone)]
pub struct InputRoot {
    /// The shortest textual spelling the user gave for this root.
    pub given: PathBuf,
    /// Canonicalized absolute path.
    pub canonical: PathBuf,
    pub is_dir: bool,
}

/// The engine's complete output for one invocation.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Final entry list, unique archive paths, sorted lexicographically.
    pub entries: Vec<Entry>,
    /// Name collisions between distinct sources; losers are already excluded.
    pub conflicts: Vec<ConflictRecord>,
    /// Canonical absolute source path -> archive location.
    pub index: EntryIndex,
    /// Archive paths of kept symlinks whose target is outside the entry set.
    pub broken_links: Vec<PathBuf>,
}

/// Resolve the full entry set for `inputs`.
///
/// Never fails outright: a non-existent root contributes zero entries, and
/// all partial failures are reported through the [`Resolution`].
pub fn resolve_entries(inputs: &[PathBuf], opts: &ScanOptions) -> Resolution {
    let roots = dedupe_inputs(inputs);

    let mut all_entries = Vec::new();
    for root in &roots {
        let mut entries = walker::walk_root(root, opts);
        debug!(root = %root.given.display(), entries = entries.len(), "walked root");
        project::project_entries(&mut entries, root, opts.keep_parent);
        all_entries.extend(entries);
    }

    let (mut entries, conflicts) = merge::merge_entries(all_entries);
    let index = index::build_index(&entries);
    let broken_links = index::rewrite_symlinks(&mut entries, &index);

    Resolution { entries, conflicts, index, broken_links }
}

/// Collapse raw CLI inputs that resolve to the same absolute path, keeping
/// the shortest textual spelling as the display form. Inputs that cannot be
/// resolved at all are dropped with a warning (the walk of a vanished root
/// would only produce an empty result anyway).
fn dedupe_inputs(inputs: &[PathBuf]) -> Vec<InputRoot> {
    let mut roots: Vec<InputRoot> = Vec::new();
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();

    for input in inputs {
        let canonical = match canonicalize_input(input) {
            Some(canonical) => canonical,
            None => {
                warn!(input = %input.display(), "input path does not exist, skipping");
                continue;
            }
        };

        match seen.get(&canonical) {
            Some(&idx) => {
                if input.as_os_str().len() < roots[idx].given.as_os_str().len() {
                    roots[idx].given = input.clone();
                }
            }
            None => {
                let is_dir = fs::metadata(input).map(|m| m.is_dir()).unwrap_or(false);
                seen.insert(canonical.clone(), roots.len());
                roots.push(InputRoot { given: input.clone(), canonical, is_dir });
            }
        }
    }

    roots
}

/// Canonical identity of an input. A root that is itself a symlink keeps its
/// own identity (canonical parent + name) so the `keep` policy can archive
/// the link rather than its target.
fn canonicalize_input(input: &PathBuf) -> Option<PathBuf> {
    let metadata = fs::symlink_metadata(input).ok()?;
    if metadata.file_type().is_symlink() {
        let parent = input.parent().filter(|p| !p.as_os_str().is_empty());
        let name = input.file_name()?;
        let parent = match parent {
            Some(parent) => fs::canonicalize(parent).ok()?,
            None => fs::canonicalize(".").ok()?,
        };
        Some(parent.join(name))
    } else {
        fs::canonicalize(input).ok()
    }
}
