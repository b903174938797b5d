//! Archive codec layer.
//!
//! Consumes the entry list produced by [`crate::scan`] in its final order
//! and handles all binary framing through the `zip`, `tar` and `flate2`
//! crates. The resolution engine guarantees unique archive paths, so the
//! codecs write blindly.

pub mod tarball;
pub mod zipfile;

use std::io::{Read, Write};
use std::path::{Component, Path};

use clap::ValueEnum;
use serde::Serialize;

use crate::error::ArchiveError;
use crate::scan::Entry;

/// Supported archive container formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveFormat {
    /// Infer the format from a file name (`.zip`, `.tar`, `.tar.gz`, `.tgz`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "zip" => Some(ArchiveFormat::Zip),
            "tar" => Some(ArchiveFormat::Tar),
            "tgz" => Some(ArchiveFormat::TarGz),
            "gz" => {
                let stem = path.file_stem()?.to_str()?.to_ascii_lowercase();
                stem.ends_with(".tar").then_some(ArchiveFormat::TarGz)
            }
            _ => None,
        }
    }
}

/// One line of `list` output.
#[derive(Debug, Clone, Serialize)]
pub struct ListRecord {
    pub path: String,
    pub size: u64,
    pub mode: u32,
    pub kind: String,
}

/// Write `entries` to `output` in the requested format.
pub fn create_archive(
    entries: &[Entry],
    output: &Path,
    format: ArchiveFormat,
    level: u32,
) -> Result<(), ArchiveError> {
    match format {
        ArchiveFormat::Zip => zipfile::create(entries, output, level),
        ArchiveFormat::Tar => tarball::create(entries, output, false, level),
        ArchiveFormat::TarGz => tarball::create(entries, output, true, level),
    }
}

/// Extract `archive` into `dest`, creating it if necessary.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    match detect_format(archive)? {
        ArchiveFormat::Zip => zipfile::extract(archive, dest),
        ArchiveFormat::Tar => tarball::extract(archive, dest, false),
        ArchiveFormat::TarGz => tarball::extract(archive, dest, true),
    }
}

/// Print the contents of `archive` to stdout, one entry per line, either as
/// a plain `mode size path` listing or as JSON records.
pub fn list_archive(archive: &Path, json: bool) -> Result<(), ArchiveError> {
    let records = match detect_format(archive)? {
        ArchiveFormat::Zip => zipfile::list(archive)?,
        ArchiveFormat::Tar => tarball::list(archive, false)?,
        ArchiveFormat::TarGz => tarball::list(archive, true)?,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for record in records {
        if json {
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        } else {
            writeln!(out, "{:>7o} {:>10} {}", record.mode, record.size, record.path)?;
        }
    }
    Ok(())
}

/// Determine the format of an existing archive: file extension first, then
/// content sniffing (zip and gzip magic bytes, the ustar tag at offset 257).
pub fn detect_format(path: &Path) -> Result<ArchiveFormat, ArchiveError> {
    if let Some(format) = ArchiveFormat::from_path(path) {
        return Ok(format);
    }

    let file = std::fs::File::open(path)
        .map_err(|e| ArchiveError::Io { source: e, path: path.to_path_buf() })?;
    let mut head = Vec::with_capacity(262);
    file.take(262)
        .read_to_end(&mut head)
        .map_err(|e| ArchiveError::Io { source: e, path: path.to_path_buf() })?;

    if head.starts_with(b"PK\x03\x04") {
        return Ok(ArchiveFormat::Zip);
    }
    if head.starts_with(&[0x1f, 0x8b]) {
        return Ok(ArchiveFormat::TarGz);
    }
    if head.len() >= 262 && &head[257..262] == b"ustar" {
        return Ok(ArchiveFormat::Tar);
    }
    Err(ArchiveError::UnknownFormat(path.to_path_buf()))
}

/// Render an archive path with forward slashes regardless of platform.
pub(crate) fn archive_name(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// Same rendering for link targets, but relative `..`/`.` segments and
/// absolute prefixes must survive as written.
pub(crate) fn link_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_inferred_from_extension() {
        assert_eq!(ArchiveFormat::from_path(Path::new("a.zip")), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_path(Path::new("a.tar")), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::from_path(Path::new("a.tar.gz")), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_path(Path::new("a.tgz")), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_path(Path::new("a.gz")), None);
        assert_eq!(ArchiveFormat::from_path(Path::new("archive")), None);
    }

    #[test]
    fn archive_names_use_forward_slashes() {
        assert_eq!(archive_name(Path::new("dir-1/sub/a.txt")), "dir-1/sub/a.txt");
        assert_eq!(archive_name(Path::new("a.txt")), "a.txt");
    }
}
