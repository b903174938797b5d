//! Cross-platform filesystem wrapper.
//!
//! On Unix we transparently re-export std::fs and report real permission
//! bits. On platforms without POSIX modes (Windows), entry modes are forced
//! to fixed defaults so that archives produced on different platforms stay
//! reproducible, and permission restoration becomes a no-op.
//!
//! The rest of the crate imports `crate::fsx::*` instead of touching
//! `std::fs` for anything permission-related, keeping call-sites identical
//! across OSes.

use std::io;
use std::path::Path;

/// Mode recorded for regular files on platforms without POSIX modes.
pub const DEFAULT_FILE_MODE: u32 = 0o100664;
/// Mode recorded for directories on platforms without POSIX modes.
pub const DEFAULT_DIR_MODE: u32 = 0o40775;
/// Mode recorded for symlinks on platforms without POSIX modes.
pub const DEFAULT_SYMLINK_MODE: u32 = 0o120777;

#[cfg(not(target_os = "windows"))]
pub use std::fs::*;

#[cfg(not(target_os = "windows"))]
/// Set POSIX permission bits on Unix.
pub fn set_unix_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(target_os = "windows"))]
/// Create a symbolic link at `link` pointing at `target`.
pub fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(target_os = "windows")]
pub use std::fs::*;

#[cfg(target_os = "windows")]
/// No-op on Windows: POSIX permission bits are not preserved.
pub fn set_unix_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(target_os = "windows")]
/// Creating symlinks on Windows requires elevated privileges; fall back to
/// writing the link target as a plain text file so extraction still succeeds.
pub fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::fs::write(link, target.to_string_lossy().as_bytes())
}
