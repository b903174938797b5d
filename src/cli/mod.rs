use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::archive::ArchiveFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Create a new archive from specified files and directories.
    #[command(alias = "c")]
    Create {
        /// One or more input files or directories to add to the archive.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// The path for the output archive file (e.g., my_archive.zip, src.tar.gz).
        #[arg(short, long)]
        output: PathBuf,

        /// How much of each input's directory prefix to keep in archive paths.
        #[arg(long, value_enum, default_value_t = KeepParent::Full)]
        keep_parent: KeepParent,

        /// How symbolic links encountered during the walk are handled.
        #[arg(long, value_enum, default_value_t = SymlinkPolicy::Keep)]
        symlink: SymlinkPolicy,

        /// Additional gitignore-syntax exclusion patterns, applied in every
        /// visited directory. May be given multiple times.
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,

        /// Include `.git` directories instead of excluding them by default.
        #[arg(long)]
        allow_git: bool,

        /// Selectively disable ignore sources (`.gitignore`, `.zipignore`,
        /// the --exclude list, or everything).
        #[arg(long, value_enum, default_value_t = DisableIgnore::None)]
        disable_ignore: DisableIgnore,

        /// Compression level (0-9). 0 stores entries without compression.
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
        level: u32,

        /// Archive format. Defaults to whatever the output extension implies
        /// (.zip, .tar, .tar.gz/.tgz), falling back to zip.
        #[arg(long, value_enum)]
        format: Option<ArchiveFormat>,
    },

    /// Extract files from an archive.
    #[command(alias = "x")]
    Extract {
        /// The archive file to extract.
        #[arg(required = true)]
        archive: PathBuf,

        /// The directory where files will be extracted. Defaults to the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the contents of an archive without extracting it.
    #[command(alias = "l")]
    List {
        /// The archive file to list contents of.
        #[arg(required = true)]
        archive: PathBuf,

        /// Emit one JSON record per entry instead of a plain listing.
        #[arg(long)]
        json: bool,
    },
}

/// Policy controlling how much of an input's directory prefix survives into
/// archive paths.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeepParent {
    /// Keep the input path as typed (cleaned of `..` and root markers).
    Full,
    /// Keep exactly the root's own basename as the top-level segment.
    Last,
    /// Drop the root entirely; its direct children become top-level entries.
    None,
}

/// Policy for symbolic links encountered while walking.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymlinkPolicy {
    /// Drop symlinks entirely: not traversed, not archived.
    None,
    /// Archive the link itself, with its target rewritten to the in-archive
    /// layout when the target is part of the entry set.
    Keep,
    /// Replace each symlink by its target's subtree, keeping the archive
    /// name the symlink would have had.
    Resolve,
}

/// Selects which ignore sources are suppressed during the walk.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DisableIgnore {
    /// All sources active (default).
    None,
    /// Ignore `.zipignore` files.
    Zipignore,
    /// Ignore `.gitignore` files.
    Gitignore,
    /// Ignore both `.gitignore` and `.zipignore` files.
    IgnoreFiles,
    /// Ignore the --exclude pattern list.
    ExcludeRules,
    /// Disable every ignore source, including the implicit `.git` rule.
    All,
}

/// Parses command-line arguments using `clap` and returns the command to execute.
///
/// This is the main entry point for the CLI logic.
/// It handles parsing and returns a `Commands` enum variant, or an error if parsing fails.
pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}
