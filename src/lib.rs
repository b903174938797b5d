//! # Zipack Core Library
//!
//! This crate provides the core functionality for the `zipack` archiver.
//!
//! It is designed to be used by the `zipack` command-line application, but its
//! public API can also be used to programmatically resolve entry sets and
//! create, inspect, and extract archives.
//!
//! ## Key Modules
//!
//! - [`scan`]: The entry resolution engine. Walks input roots, applies
//!   cascading `.gitignore`/`.zipignore` rules and the configured symlink
//!   policy, projects archive-relative names and merges the per-root results
//!   into one conflict-free, order-stable entry list.
//! - [`archive`]: The codec layer. Consumes the resolved entry list and
//!   writes (or reads back) zip, tar and tar.gz archives.
//! - [`cli`]: The `clap`-based command-line surface.

pub mod archive;
pub mod cli;
pub mod error;
pub mod scan;

pub use error::ArchiveError;

// Cross-platform filesystem wrapper
pub mod fsx;
