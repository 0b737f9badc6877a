//! Error types for mfs-core
//!
//! Every backend reports failures through [`Error`]. Errors raised by a
//! collaborator (host filesystem, archive reader, object-store client) are
//! passed through unchanged; nothing in this crate retries.

use thiserror::Error;

/// Result alias used throughout the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Filesystem facade errors
#[derive(Debug, Error)]
pub enum Error {
    /// Resource, file, bucket or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Path falls outside the configured allow-list
    #[error("Path is outside the allowed scope: {0}")]
    OutOfScope(String),

    /// Operation has no meaningful implementation for this backend
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A location claims to be archive-contained but cannot be split
    #[error("Malformed resource location: {0}")]
    MalformedLocation(String),

    /// Write attempted on a read-only backend
    #[error("Read-only filesystem: {0}")]
    ReadOnly(String),

    /// Path cannot be mapped onto the backend
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Alias missing from configuration
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// Object store or network failure
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration could not be read or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// Archive could not be read
    #[error("Archive error: {0}")]
    Archive(String),

    /// Host I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    General(String),
}

impl Error {
    /// Whether the error reports an absent entry
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Convert a host I/O error, tagging not-found failures with the path
    pub(crate) fn from_io(err: std::io::Error, path: impl std::fmt::Display) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.to_string())
        } else {
            Error::Io(err)
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => Error::NotFound("archive entry".to_string()),
            other => Error::Archive(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
