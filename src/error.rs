use std::path::PathBuf;

/// The primary error type for all operations in the `zipack` crate.
#[derive(Debug)]
pub enum ArchiveError {
    /// An I/O error occurred, typically while reading or writing a file.
    /// Includes the path where the error happened.
    Io { source: std::io::Error, path: PathBuf },

    /// An error from the underlying `zip` crate while reading or writing
    /// a zip archive.
    Zip(zip::result::ZipError),

    /// The output or input path does not map to a supported archive format.
    UnknownFormat(PathBuf),

    /// An error during serialization of listing output.
    SerdeJson(serde_json::Error),

    /// A wrapper for any other error that doesn't fit the specific variants.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::Io { source, path } => write!(f, "I/O error on path '{}': {}", path.display(), source),
            ArchiveError::Zip(e) => write!(f, "Zip archive error: {}", e),
            ArchiveError::UnknownFormat(path) => write!(f, "Could not determine archive format for '{}'", path.display()),
            ArchiveError::SerdeJson(e) => write!(f, "Serialization error: {}", e),
            ArchiveError::Other(e) => write!(f, "An unexpected error occurred: {}", e),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Io { source, .. } => Some(source),
            ArchiveError::Zip(e) => Some(e),
            ArchiveError::SerdeJson(e) => Some(e),
            ArchiveError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Zip(err)
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        ArchiveError::SerdeJson(err)
    }
}

// Generic IO error conversion that doesn't require a path
impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::Io { source: err, path: PathBuf::new() }
    }
}
