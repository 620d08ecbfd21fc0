//! Contract with the distributed storage backend.
//!
//! The store is an opaque collaborator: path-addressed, permission-bearing,
//! shared across every session. Everything the adapter layer needs from it
//! is captured by [`StorageBackend`]; the crate ships an in-memory
//! implementation behind the `mem://` scheme, and a real cluster client
//! implements the same trait out of tree.

pub mod memory;

use std::io::{Read, Write};
use std::sync::Arc;

use crate::error::{StorageError, StorageResult};

pub use memory::MemoryBackend;

/// Kind of a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

impl FileKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, FileKind::Directory)
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FileKind::File)
    }
}

/// Metadata for one backend path, fetched fresh on every query.
///
/// `permissions` is the 9-character POSIX triad string (`rwxr-x---`):
/// owner bits at [0..3), group at [3..6), other at [6..9).
#[derive(Debug, Clone)]
pub struct FileStatus {
    /// Backend (not virtual) path of the object.
    pub path: String,
    pub kind: FileKind,
    pub owner: String,
    pub group: String,
    pub permissions: String,
    pub length: u64,
    /// Modification time in milliseconds since the epoch.
    pub modified_ms: u64,
}

impl FileStatus {
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }
}

/// Operations the adapter layer issues against the store.
///
/// All calls are synchronous and unretried; a failure surfaces immediately
/// to the caller. Implementations are shared across session threads and
/// must be internally synchronized.
pub trait StorageBackend: Send + Sync {
    /// True when the path exists, of either kind.
    fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Fresh metadata for the path; `NotFound` when absent.
    fn stat(&self, path: &str) -> StorageResult<FileStatus>;

    /// Children of a directory, each carrying its full backend path.
    fn list_dir(&self, path: &str) -> StorageResult<Vec<FileStatus>>;

    /// Creates the directory and any missing ancestors.
    fn mkdirs(&self, path: &str) -> StorageResult<()>;

    /// Reassigns ownership of an existing path.
    fn set_owner(&self, path: &str, owner: &str, group: &str) -> StorageResult<()>;

    /// Replaces the permission triad of an existing path.
    fn set_permission(&self, path: &str, permissions: &str) -> StorageResult<()>;

    /// Deletes the path; with `recursive` a directory goes down with its
    /// entire subtree.
    fn delete(&self, path: &str, recursive: bool) -> StorageResult<()>;

    /// Renames a file or directory subtree. Atomicity is whatever the
    /// store provides; nothing is strengthened here.
    fn rename(&self, from: &str, to: &str) -> StorageResult<()>;

    /// Opens an existing file for reading from the beginning.
    fn open_read(&self, path: &str) -> StorageResult<Box<dyn Read + Send>>;

    /// Creates (or truncates) a file for writing, creating missing parent
    /// directories the way the store does.
    fn create_write(&self, path: &str) -> StorageResult<Box<dyn Write + Send>>;

    /// Sets the connection's working directory.
    fn set_working_directory(&self, path: &str) -> StorageResult<()>;

    /// Transport-level integrity tuning; both default to on in real stores
    /// and are switched off once per connection.
    fn set_write_checksum(&self, enabled: bool);
    fn set_verify_checksum(&self, enabled: bool);
}

impl std::fmt::Debug for dyn StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn StorageBackend")
    }
}

/// Establishes a backend connection for a URI like `mem:///data/ftp`.
///
/// The scheme selects the client, the authority (if any) addresses the
/// cluster, and the path component becomes the configured root directory.
/// The connection authenticates as the given superuser/supergroup pair.
pub fn connect(
    uri: &str,
    superuser: &str,
    supergroup: &str,
) -> StorageResult<Arc<dyn StorageBackend>> {
    let (scheme, _rest) = split_uri(uri)?;
    match scheme {
        "mem" => Ok(Arc::new(MemoryBackend::new(superuser, supergroup))),
        other => Err(StorageError::UnsupportedScheme(other.to_string())),
    }
}

/// Path component of a backend URI: `mem://host/data/ftp` → `/data/ftp`.
/// A URI with no path component addresses the backend root `/`.
pub fn root_of_uri(uri: &str) -> StorageResult<String> {
    let (_scheme, rest) = split_uri(uri)?;
    match rest.find('/') {
        Some(pos) => Ok(rest[pos..].to_string()),
        None => Ok("/".to_string()),
    }
}

fn split_uri(uri: &str) -> StorageResult<(&str, &str)> {
    uri.split_once("://")
        .ok_or_else(|| StorageError::backend(format!("malformed backend uri: {}", uri)))
}
