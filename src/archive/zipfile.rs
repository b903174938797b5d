//! Zip codec, built on the `zip` crate.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use chrono::{Datelike, TimeZone, Timelike, Utc};
use tracing::warn;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::archive::{archive_name, link_name, ListRecord};
use crate::error::ArchiveError;
use crate::fsx;
use crate::scan::{Entry, EntryKind};

/// Unix file-type mask / symlink tag, as stored in zip external attributes.
const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Write `entries` to a zip archive at `output`. Level 0 stores entries
/// uncompressed; 1-9 select the deflate level.
pub fn create(entries: &[Entry], output: &Path, level: u32) -> Result<(), ArchiveError> {
    let file = File::create(output)
        .map_err(|e| ArchiveError::Io { source: e, path: output.to_path_buf() })?;
    let mut writer = ZipWriter::new(file);

    for entry in entries {
        let name = archive_name(&entry.archive_path);
        let mut options = FileOptions::default()
            .unix_permissions(entry.stats.mode)
            .last_modified_time(zip_datetime(entry.stats.mtime));
        options = if level == 0 {
            options.compression_method(CompressionMethod::Stored)
        } else {
            options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(level.min(9) as i32))
        };

        match &entry.kind {
            EntryKind::Directory { .. } => {
                writer.add_directory(name.as_str(), options)?;
            }
            EntryKind::File => {
                let mut file = match File::open(&entry.source_path) {
                    Ok(file) => file,
                    Err(err) => {
                        warn!(path = %entry.source_path.display(), %err, "file vanished, skipping");
                        continue;
                    }
                };
                writer.start_file(name.as_str(), options)?;
                io::copy(&mut file, &mut writer)
                    .map_err(|e| ArchiveError::Io { source: e, path: entry.source_path.clone() })?;
            }
            EntryKind::Symlink { link_name: target, .. } => {
                writer.add_symlink(name.as_str(), link_name(target), options)?;
            }
        }
    }

    writer.finish()?;
    Ok(())
}

/// Extract a zip archive into `dest`, restoring Unix permission bits where
/// the platform supports them. Entries with unsafe names (absolute paths or
/// `..` components) are skipped.
pub fn extract(archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let file = File::open(archive)
        .map_err(|e| ArchiveError::Io { source: e, path: archive.to_path_buf() })?;
    let mut zip = ZipArchive::new(file)?;
    fsx::create_dir_all(dest).map_err(|e| ArchiveError::Io { source: e, path: dest.to_path_buf() })?;

    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        let rel = match file.enclosed_name() {
            Some(rel) => rel.to_path_buf(),
            None => {
                warn!(name = file.name(), "refused entry escaping the output directory");
                continue;
            }
        };
        let out_path = dest.join(rel);
        let mode = file.unix_mode();

        if file.is_dir() {
            fsx::create_dir_all(&out_path)
                .map_err(|e| ArchiveError::Io { source: e, path: out_path.clone() })?;
        } else if mode.map(|m| m & S_IFMT == S_IFLNK).unwrap_or(false) {
            let mut target = String::new();
            file.read_to_string(&mut target)
                .map_err(|e| ArchiveError::Io { source: e, path: out_path.clone() })?;
            if let Some(parent) = out_path.parent() {
                fsx::create_dir_all(parent)
                    .map_err(|e| ArchiveError::Io { source: e, path: parent.to_path_buf() })?;
            }
            if fsx::symlink_metadata(&out_path).is_ok() {
                let _ = fsx::remove_file(&out_path);
            }
            fsx::make_symlink(Path::new(&target), &out_path)
                .map_err(|e| ArchiveError::Io { source: e, path: out_path.clone() })?;
            // Symlink modes are fixed on every mainstream platform; nothing
            // to restore.
            continue;
        } else {
            if let Some(parent) = out_path.parent() {
                fsx::create_dir_all(parent)
                    .map_err(|e| ArchiveError::Io { source: e, path: parent.to_path_buf() })?;
            }
            let mut out = File::create(&out_path)
                .map_err(|e| ArchiveError::Io { source: e, path: out_path.clone() })?;
            io::copy(&mut file, &mut out)
                .map_err(|e| ArchiveError::Io { source: e, path: out_path.clone() })?;
        }

        if let Some(mode) = mode {
            let _ = fsx::set_unix_permissions(&out_path, mode & 0o7777);
        }
    }
    Ok(())
}

/// Read back the table of contents of a zip archive.
pub fn list(archive: &Path) -> Result<Vec<ListRecord>, ArchiveError> {
    let file = File::open(archive)
        .map_err(|e| ArchiveError::Io { source: e, path: archive.to_path_buf() })?;
    let mut zip = ZipArchive::new(file)?;

    let mut records = Vec::new();
    for i in 0..zip.len() {
        let file = zip.by_index(i)?;
        let mode = file.unix_mode().unwrap_or(0);
        let kind = if file.is_dir() {
            "directory"
        } else if mode & S_IFMT == S_IFLNK {
            "symlink"
        } else {
            "file"
        };
        records.push(ListRecord {
            path: file.name().to_string(),
            size: file.size(),
            mode: mode & 0o7777,
            kind: kind.to_string(),
        });
    }
    Ok(records)
}

/// Map a Unix mtime to a zip DOS timestamp, clamping out-of-range values to
/// the zip epoch (1980-01-01).
fn zip_datetime(mtime: u64) -> zip::DateTime {
    let Some(dt) = Utc.timestamp_opt(mtime as i64, 0).single() else {
        return zip::DateTime::default();
    };
    zip::DateTime::from_date_and_time(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
    )
    .unwrap_or_default()
}
