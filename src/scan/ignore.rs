//! Cascading ignore-rule filter.
//!
//! Each visited directory contributes one scoped rule set, built from its
//! `.gitignore` and `.zipignore` files plus the caller's exclusion rules.
//! Candidate paths are checked against the stack deepest-first; the first
//! set that produces a definitive answer wins. Matching is exact-case
//! gitignore syntax, delegated to the `ignore` crate.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use tracing::debug;

use crate::cli::DisableIgnore;
use crate::scan::ScanOptions;

/// Ignore file consulted in every visited directory, lowest precedence.
const GITIGNORE_FILE: &str = ".gitignore";
/// Archiver-specific ignore file, overrides `.gitignore` in the same directory.
const ZIPIGNORE_FILE: &str = ".zipignore";

/// One directory-scoped, ordered gitignore-syntax rule set. Paths outside
/// `scope` are never evaluated against it.
#[derive(Debug, Clone)]
struct ScopedRules {
    scope: PathBuf,
    matcher: Gitignore,
}

/// A stack of directory-scoped rule sets, shallowest (root) first.
///
/// The cascade is cloned and extended on each descent, never mutated in
/// place, so sibling subtrees cannot observe each other's rules.
#[derive(Debug, Clone, Default)]
pub struct IgnoreCascade {
    sets: Vec<ScopedRules>,
}

impl IgnoreCascade {
    /// Cascade used to vet a root path itself: only the caller's exclusion
    /// rules, scoped to the root's parent directory.
    pub fn for_root_parent(parent: &Path, opts: &ScanOptions) -> Self {
        let mut cascade = IgnoreCascade::default();
        if let Some(rules) = load_rules(parent, parent, opts, false) {
            cascade.sets.push(rules);
        }
        cascade
    }

    /// Return a new cascade extended with the rule set of `directory`,
    /// reading its ignore files subject to the configured `disable_ignore`
    /// mode. Missing or unreadable ignore files contribute nothing.
    pub fn descend(&self, directory: &Path, opts: &ScanOptions) -> Self {
        self.descend_scoped(directory, directory, opts)
    }

    /// Like [`IgnoreCascade::descend`], but scopes the new rule set at
    /// `scope` while reading the ignore files from `directory`. The two
    /// differ when a resolved symlink substitutes a physical subtree for a
    /// logical location: candidates keep matching at their logical paths,
    /// so the inherited ancestor rule sets stay in effect.
    pub fn descend_scoped(&self, scope: &Path, directory: &Path, opts: &ScanOptions) -> Self {
        let mut next = self.clone();
        if let Some(rules) = load_rules(scope, directory, opts, true) {
            next.sets.push(rules);
        }
        next
    }

    /// Decide whether `path` (absolute) is excluded.
    ///
    /// Rule sets are consulted deepest-first; a whitelist (negated) match
    /// short-circuits to "included", an ignore match to "excluded". No match
    /// in any set means included. Directory candidates are matched with
    /// `is_dir` so trailing-`/` patterns behave correctly.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        for set in self.sets.iter().rev() {
            let rel = match path.strip_prefix(&set.scope) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            match set.matcher.matched(rel, is_dir) {
                Match::Whitelist(_) => return false,
                Match::Ignore(glob) => {
                    debug!(path = %path.display(), pattern = ?glob, "excluded by ignore rule");
                    return true;
                }
                Match::None => {}
            }
        }
        false
    }
}

/// Build the rule set for one directory, or `None` when no source
/// contributed a single pattern. `scope` is where candidates are matched;
/// `directory` is where the ignore files are read from.
fn load_rules(
    scope: &Path,
    directory: &Path,
    opts: &ScanOptions,
    read_ignore_files: bool,
) -> Option<ScopedRules> {
    if opts.disable_ignore == DisableIgnore::All {
        return None;
    }

    let mut builder = GitignoreBuilder::new(scope);
    let mut has_patterns = false;

    if read_ignore_files {
        // .gitignore first (lower priority), .zipignore second so its rules
        // win within the same directory.
        if !matches!(opts.disable_ignore, DisableIgnore::Gitignore | DisableIgnore::IgnoreFiles) {
            has_patterns |= add_ignore_file(&mut builder, &directory.join(GITIGNORE_FILE));
        }
        if !matches!(opts.disable_ignore, DisableIgnore::Zipignore | DisableIgnore::IgnoreFiles) {
            has_patterns |= add_ignore_file(&mut builder, &directory.join(ZIPIGNORE_FILE));
        }
    }

    if opts.disable_ignore != DisableIgnore::ExcludeRules {
        for pattern in &opts.excludes {
            // GitignoreBuilder rejects malformed globs; a bad user pattern
            // is skipped rather than fatal.
            let _ = builder.add_line(None, pattern);
            has_patterns = true;
        }
    }

    if !opts.allow_git {
        let _ = builder.add_line(None, ".git/");
        has_patterns = true;
    }

    if !has_patterns {
        return None;
    }
    builder
        .build()
        .ok()
        .map(|matcher| ScopedRules { scope: scope.to_path_buf(), matcher })
}

/// Append the lines of one ignore file. Missing or unreadable files are
/// treated as empty, not fatal.
fn add_ignore_file(builder: &mut GitignoreBuilder, path: &Path) -> bool {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return false,
    };
    for line in contents.lines() {
        // add_line handles comments and blank lines itself
        let _ = builder.add_line(None, line);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{DisableIgnore, KeepParent, SymlinkPolicy};
    use std::fs;
    use tempfile::tempdir;

    fn options() -> ScanOptions {
        ScanOptions {
            symlink: SymlinkPolicy::Keep,
            keep_parent: KeepParent::Full,
            allow_git: false,
            excludes: Vec::new(),
            disable_ignore: DisableIgnore::None,
        }
    }

    #[test]
    fn empty_cascade_includes_everything() {
        let cascade = IgnoreCascade::default();
        assert!(!cascade.is_ignored(Path::new("/tmp/anything.txt"), false));
        assert!(!cascade.is_ignored(Path::new("/tmp/dir"), true));
    }

    #[test]
    fn git_directory_excluded_by_default() {
        let dir = tempdir().unwrap();
        let cascade = IgnoreCascade::default().descend(dir.path(), &options());

        assert!(cascade.is_ignored(&dir.path().join(".git"), true));
        // Only the directory form is excluded
        assert!(!cascade.is_ignored(&dir.path().join(".git"), false));
    }

    #[test]
    fn allow_git_keeps_git_directories() {
        let dir = tempdir().unwrap();
        let mut opts = options();
        opts.allow_git = true;
        let cascade = IgnoreCascade::default().descend(dir.path(), &opts);

        assert!(!cascade.is_ignored(&dir.path().join(".git"), true));
    }

    #[test]
    fn gitignore_patterns_apply_within_scope() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\nbuild/\n").unwrap();
        let cascade = IgnoreCascade::default().descend(dir.path(), &options());

        assert!(cascade.is_ignored(&dir.path().join("app.log"), false));
        assert!(cascade.is_ignored(&dir.path().join("build"), true));
        assert!(!cascade.is_ignored(&dir.path().join("main.rs"), false));
    }

    #[test]
    fn zipignore_overrides_gitignore_in_same_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        fs::write(dir.path().join(".zipignore"), "!keep.log\n").unwrap();
        let cascade = IgnoreCascade::default().descend(dir.path(), &options());

        assert!(cascade.is_ignored(&dir.path().join("app.log"), false));
        assert!(!cascade.is_ignored(&dir.path().join("keep.log"), false));
    }

    #[test]
    fn deeper_negation_wins_over_shallower_exclusion() {
        let root = tempdir().unwrap();
        let sub = root.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(root.path().join(".gitignore"), "*.tmp\n").unwrap();
        fs::write(sub.join(".gitignore"), "!special.tmp\n").unwrap();

        let opts = options();
        let cascade = IgnoreCascade::default()
            .descend(root.path(), &opts)
            .descend(&sub, &opts);

        assert!(cascade.is_ignored(&sub.join("other.tmp"), false));
        assert!(!cascade.is_ignored(&sub.join("special.tmp"), false));
    }

    #[test]
    fn disable_ignore_modes_suppress_their_sources() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        fs::write(dir.path().join(".zipignore"), "*.tmp\n").unwrap();

        let mut opts = options();
        opts.excludes = vec!["*.bak".to_string()];

        opts.disable_ignore = DisableIgnore::Gitignore;
        let cascade = IgnoreCascade::default().descend(dir.path(), &opts);
        assert!(!cascade.is_ignored(&dir.path().join("a.log"), false));
        assert!(cascade.is_ignored(&dir.path().join("a.tmp"), false));
        assert!(cascade.is_ignored(&dir.path().join("a.bak"), false));

        opts.disable_ignore = DisableIgnore::IgnoreFiles;
        let cascade = IgnoreCascade::default().descend(dir.path(), &opts);
        assert!(!cascade.is_ignored(&dir.path().join("a.log"), false));
        assert!(!cascade.is_ignored(&dir.path().join("a.tmp"), false));
        assert!(cascade.is_ignored(&dir.path().join("a.bak"), false));

        opts.disable_ignore = DisableIgnore::ExcludeRules;
        let cascade = IgnoreCascade::default().descend(dir.path(), &opts);
        assert!(cascade.is_ignored(&dir.path().join("a.log"), false));
        assert!(!cascade.is_ignored(&dir.path().join("a.bak"), false));

        opts.disable_ignore = DisableIgnore::All;
        let cascade = IgnoreCascade::default().descend(dir.path(), &opts);
        assert!(!cascade.is_ignored(&dir.path().join("a.log"), false));
        assert!(!cascade.is_ignored(&dir.path().join("a.bak"), false));
        assert!(!cascade.is_ignored(&dir.path().join(".git"), true));
    }

    #[test]
    fn scoped_descent_matches_logical_paths_for_substituted_directories() {
        let rules_dir = tempdir().unwrap();
        let physical = tempdir().unwrap();
        fs::write(rules_dir.path().join(".gitignore"), "*.log\n").unwrap();

        let opts = options();
        let cascade = IgnoreCascade::default()
            .descend(rules_dir.path(), &opts)
            .descend_scoped(&rules_dir.path().join("ln"), physical.path(), &opts);

        // The inherited *.log rule still applies at the logical location.
        assert!(cascade.is_ignored(&rules_dir.path().join("ln/app.log"), false));
        assert!(!cascade.is_ignored(&rules_dir.path().join("ln/app.txt"), false));
    }

    #[test]
    fn paths_outside_scope_are_never_evaluated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*\n").unwrap();
        let cascade = IgnoreCascade::default().descend(dir.path(), &options());

        assert!(!cascade.is_ignored(Path::new("/elsewhere/file.txt"), false));
    }
}
