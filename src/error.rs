//! Error types shared by the storage adapter and the backend contract.

use std::io;
use thiserror::Error;

/// Failure raised by a backend call or by the adapter layer on top of it.
///
/// Most adapter operations translate these into sentinel values (`false`,
/// `None`, `0`) before they reach a protocol handler; only stream creation
/// surfaces them directly.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend reports the path absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// The requesting identity failed a local permission check.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any other backend failure (connectivity, refused rename, bad state).
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend URI names a scheme no registered client handles.
    #[error("unsupported backend scheme: {0}")]
    UnsupportedScheme(String),

    /// A configured value is unusable (bad root path, malformed range).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O failure while moving bytes to or from the backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// True when the failure means "the path does not exist", the case the
    /// writability fallback keys on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convert to `std::io::Error` at the stream boundary, where the protocol
/// engine expects I/O semantics.
impl From<StorageError> for io::Error {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            StorageError::PermissionDenied(msg) => {
                io::Error::new(io::ErrorKind::PermissionDenied, msg)
            }
            StorageError::Io(e) => e,
            other => io::Error::other(other.to_string()),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
