//! Tar and tar.gz codec, built on the `tar` and `flate2` crates.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder, EntryType, Header};
use tracing::warn;

use crate::archive::{archive_name, link_name, ListRecord};
use crate::error::ArchiveError;
use crate::fsx;
use crate::scan::{Entry, EntryKind};

/// Write `entries` to a tar (or gzip-compressed tar) archive at `output`.
pub fn create(entries: &[Entry], output: &Path, gzip: bool, level: u32) -> Result<(), ArchiveError> {
    let file = File::create(output)
        .map_err(|e| ArchiveError::Io { source: e, path: output.to_path_buf() })?;

    if gzip {
        let encoder = GzEncoder::new(file, Compression::new(level.min(9)));
        let mut builder = Builder::new(encoder);
        append_entries(&mut builder, entries)?;
        builder
            .into_inner()
            .map_err(|e| ArchiveError::Io { source: e, path: output.to_path_buf() })?
            .finish()
            .map_err(|e| ArchiveError::Io { source: e, path: output.to_path_buf() })?;
    } else {
        let mut builder = Builder::new(file);
        append_entries(&mut builder, entries)?;
        builder
            .finish()
            .map_err(|e| ArchiveError::Io { source: e, path: output.to_path_buf() })?;
    }
    Ok(())
}

fn append_entries<W: Write>(builder: &mut Builder<W>, entries: &[Entry]) -> Result<(), ArchiveError> {
    for entry in entries {
        let name = archive_name(&entry.archive_path);
        let mut header = Header::new_gnu();
        header.set_mode(entry.stats.mode & 0o7777);
        header.set_uid(entry.stats.uid as u64);
        header.set_gid(entry.stats.gid as u64);
        header.set_mtime(entry.stats.mtime);

        match &entry.kind {
            EntryKind::Directory { .. } => {
                header.set_entry_type(EntryType::Directory);
                header.set_size(0);
                builder
                    .append_data(&mut header, format!("{name}/"), io::empty())
                    .map_err(|e| ArchiveError::Io { source: e, path: entry.source_path.clone() })?;
            }
            EntryKind::File => {
                // Re-stat at open time: the walk's size may be stale if the
                // file changed underneath us.
                let file = match File::open(&entry.source_path) {
                    Ok(file) => file,
                    Err(err) => {
                        warn!(path = %entry.source_path.display(), %err, "file vanished, skipping");
                        continue;
                    }
                };
                let size = file
                    .metadata()
                    .map(|m| m.len())
                    .unwrap_or(entry.stats.size);
                header.set_entry_type(EntryType::Regular);
                header.set_size(size);
                builder
                    .append_data(&mut header, &name, file.take(size))
                    .map_err(|e| ArchiveError::Io { source: e, path: entry.source_path.clone() })?;
            }
            EntryKind::Symlink { link_name: target, .. } => {
                header.set_entry_type(EntryType::Symlink);
                header.set_size(0);
                builder
                    .append_link(&mut header, &name, link_name(target))
                    .map_err(|e| ArchiveError::Io { source: e, path: entry.source_path.clone() })?;
            }
        }
    }
    Ok(())
}

/// Extract a tar (or tar.gz) archive into `dest`. Entries that would escape
/// `dest` are refused by `unpack_in`.
pub fn extract(archive: &Path, dest: &Path, gzip: bool) -> Result<(), ArchiveError> {
    let file = File::open(archive)
        .map_err(|e| ArchiveError::Io { source: e, path: archive.to_path_buf() })?;
    fsx::create_dir_all(dest).map_err(|e| ArchiveError::Io { source: e, path: dest.to_path_buf() })?;

    if gzip {
        unpack(Archive::new(GzDecoder::new(file)), dest)
    } else {
        unpack(Archive::new(file), dest)
    }
}

fn unpack<R: Read>(mut archive: Archive<R>, dest: &Path) -> Result<(), ArchiveError> {
    archive.set_preserve_permissions(true);
    for entry in archive
        .entries()
        .map_err(|e| ArchiveError::Io { source: e, path: dest.to_path_buf() })?
    {
        let mut entry = entry.map_err(|e| ArchiveError::Io { source: e, path: dest.to_path_buf() })?;
        let unpacked = entry
            .unpack_in(dest)
            .map_err(|e| ArchiveError::Io { source: e, path: dest.to_path_buf() })?;
        if !unpacked {
            warn!(dest = %dest.display(), "refused entry escaping the output directory");
        }
    }
    Ok(())
}

/// Read back the table of contents of a tar (or tar.gz) archive.
pub fn list(archive: &Path, gzip: bool) -> Result<Vec<ListRecord>, ArchiveError> {
    let file = File::open(archive)
        .map_err(|e| ArchiveError::Io { source: e, path: archive.to_path_buf() })?;
    if gzip {
        collect_records(Archive::new(GzDecoder::new(file)), archive)
    } else {
        collect_records(Archive::new(file), archive)
    }
}

fn collect_records<R: Read>(mut archive: Archive<R>, path: &Path) -> Result<Vec<ListRecord>, ArchiveError> {
    let mut records = Vec::new();
    for entry in archive
        .entries()
        .map_err(|e| ArchiveError::Io { source: e, path: path.to_path_buf() })?
    {
        let entry = entry.map_err(|e| ArchiveError::Io { source: e, path: path.to_path_buf() })?;
        let header = entry.header();
        let kind = match header.entry_type() {
            EntryType::Directory => "directory",
            EntryType::Symlink | EntryType::Link => "symlink",
            _ => "file",
        };
        records.push(ListRecord {
            path: entry
                .path()
                .map_err(|e| ArchiveError::Io { source: e.into(), path: path.to_path_buf() })?
                .to_string_lossy()
                .into_owned(),
            size: header.size().unwrap_or(0),
            mode: header.mode().unwrap_or(0),
            kind: kind.to_string(),
        });
    }
    Ok(records)
}
