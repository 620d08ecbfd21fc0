//! Shared storage context: one lazily-established backend connection for
//! the whole server, plus the settings every session reads.
//!
//! All sessions funnel through [`StorageSystem::connection`]. The first
//! caller pays for connect and root setup while later callers block on the
//! mutex and then reuse the handle; a failed attempt leaves nothing cached,
//! so the next caller retries from scratch.

use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::backend::{self, StorageBackend};
use crate::error::{StorageError, StorageResult};
use crate::path::PathTranslator;
use crate::user::DfsUser;

/// Triad applied to the root directory when permission enforcement is off,
/// so every account can work anywhere under it.
const OPEN_ROOT_PERMISSIONS: &str = "rwxrwxrwx";

type Connector = Box<dyn Fn() -> StorageResult<Arc<dyn StorageBackend>> + Send + Sync>;

pub struct StorageSystem {
    root_dir: String,
    superuser: String,
    supergroup: String,
    permissions_enabled: bool,
    translator: PathTranslator,
    connection: Mutex<Option<Arc<dyn StorageBackend>>>,
    connector: Connector,
}

impl StorageSystem {
    /// Builds the system for a backend URI like `mem:///data/ftp`. The
    /// URI's path component becomes the root directory; connecting is
    /// deferred until the first [`connection`](Self::connection) call.
    pub fn from_uri(
        uri: &str,
        superuser: &str,
        supergroup: &str,
        permissions_enabled: bool,
    ) -> StorageResult<Self> {
        let root_dir = backend::root_of_uri(uri)?;
        let uri = uri.to_string();
        let su = superuser.to_string();
        let sg = supergroup.to_string();
        Self::with_connector(
            Box::new(move || backend::connect(&uri, &su, &sg)),
            &root_dir,
            superuser,
            supergroup,
            permissions_enabled,
        )
    }

    /// Same as [`from_uri`](Self::from_uri) but with a caller-supplied
    /// connector, for backends not registered under a URI scheme.
    pub fn with_connector(
        connector: Connector,
        root_dir: &str,
        superuser: &str,
        supergroup: &str,
        permissions_enabled: bool,
    ) -> StorageResult<Self> {
        if !root_dir.starts_with('/') {
            return Err(StorageError::configuration(format!(
                "root directory must be absolute: {}",
                root_dir
            )));
        }
        if root_dir == "/" {
            return Err(StorageError::configuration(
                "root directory must not be the backend root \"/\"",
            ));
        }
        Ok(StorageSystem {
            root_dir: root_dir.to_string(),
            superuser: superuser.to_string(),
            supergroup: supergroup.to_string(),
            permissions_enabled,
            translator: PathTranslator::new(root_dir),
            connection: Mutex::new(None),
            connector,
        })
    }

    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }

    pub fn superuser(&self) -> &str {
        &self.superuser
    }

    pub fn supergroup(&self) -> &str {
        &self.supergroup
    }

    pub fn permissions_enabled(&self) -> bool {
        self.permissions_enabled
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    /// Returns the shared backend handle, connecting on first use.
    ///
    /// The whole setup runs under the mutex, so concurrent first callers
    /// produce exactly one connect and one root mkdir. Errors other than
    /// the tolerated root reset abort the attempt and leave the slot
    /// empty for a later retry.
    pub fn connection(&self) -> StorageResult<Arc<dyn StorageBackend>> {
        let mut slot = self.connection.lock().unwrap();
        if let Some(conn) = slot.as_ref() {
            return Ok(Arc::clone(conn));
        }

        let conn = (self.connector)()?;
        conn.set_write_checksum(false);
        conn.set_verify_checksum(false);
        conn.set_working_directory(&self.root_dir)?;

        if !self.permissions_enabled {
            // Open up the root so any account can use it. The root may not
            // exist yet on a fresh backend; that case is created below.
            if let Err(e) = conn.set_owner(&self.root_dir, &self.superuser, &self.supergroup) {
                warn!("could not reset owner of {}: {}", self.root_dir, e);
            }
            if let Err(e) = conn.set_permission(&self.root_dir, OPEN_ROOT_PERMISSIONS) {
                warn!("could not reset permissions of {}: {}", self.root_dir, e);
            }
        }

        if !conn.exists(&self.root_dir)? {
            conn.mkdirs(&self.root_dir)?;
            info!("created root directory {}", self.root_dir);
        }

        info!("storage backend ready, root {}", self.root_dir);
        *slot = Some(Arc::clone(&conn));
        Ok(conn)
    }

    /// Creates the user's home directory on first login, owned by the
    /// user. An existing home is left untouched.
    pub fn ensure_home(&self, user: &DfsUser) -> StorageResult<()> {
        let home = self.translator.home_of(user);
        let conn = self.connection()?;
        if !conn.exists(&home)? {
            conn.mkdirs(&home)?;
            conn.set_owner(&home, user.name(), user.main_group())?;
            info!("created home directory {} for {}", home, user.name());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FileStatus, MemoryBackend};
    use std::io::{Read, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    /// Backend wrapper recording every call name, for init-order checks.
    struct Recording {
        inner: MemoryBackend,
        calls: Mutex<Vec<String>>,
    }

    impl Recording {
        fn new() -> Self {
            Recording {
                inner: MemoryBackend::new("hdfs", "supergroup"),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, name: &str) {
            self.calls.lock().unwrap().push(name.to_string());
        }
    }

    impl StorageBackend for Recording {
        fn exists(&self, path: &str) -> StorageResult<bool> {
            self.record("exists");
            self.inner.exists(path)
        }
        fn stat(&self, path: &str) -> StorageResult<FileStatus> {
            self.record("stat");
            self.inner.stat(path)
        }
        fn list_dir(&self, path: &str) -> StorageResult<Vec<FileStatus>> {
            self.record("list_dir");
            self.inner.list_dir(path)
        }
        fn mkdirs(&self, path: &str) -> StorageResult<()> {
            self.record("mkdirs");
            self.inner.mkdirs(path)
        }
        fn set_owner(&self, path: &str, owner: &str, group: &str) -> StorageResult<()> {
            self.record("set_owner");
            self.inner.set_owner(path, owner, group)
        }
        fn set_permission(&self, path: &str, permissions: &str) -> StorageResult<()> {
            self.record("set_permission");
            self.inner.set_permission(path, permissions)
        }
        fn delete(&self, path: &str, recursive: bool) -> StorageResult<()> {
            self.record("delete");
            self.inner.delete(path, recursive)
        }
        fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
            self.record("rename");
            self.inner.rename(from, to)
        }
        fn open_read(&self, path: &str) -> StorageResult<Box<dyn Read + Send>> {
            self.record("open_read");
            self.inner.open_read(path)
        }
        fn create_write(&self, path: &str) -> StorageResult<Box<dyn Write + Send>> {
            self.record("create_write");
            self.inner.create_write(path)
        }
        fn set_working_directory(&self, path: &str) -> StorageResult<()> {
            self.record("set_working_directory");
            self.inner.set_working_directory(path)
        }
        fn set_write_checksum(&self, enabled: bool) {
            self.record("set_write_checksum");
            self.inner.set_write_checksum(enabled);
        }
        fn set_verify_checksum(&self, enabled: bool) {
            self.record("set_verify_checksum");
            self.inner.set_verify_checksum(enabled);
        }
    }

    fn counting_system(connects: Arc<AtomicUsize>, permissions_enabled: bool) -> StorageSystem {
        StorageSystem::with_connector(
            Box::new(move || {
                connects.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(MemoryBackend::new("hdfs", "supergroup")) as Arc<dyn StorageBackend>)
            }),
            "/data/ftp",
            "hdfs",
            "supergroup",
            permissions_enabled,
        )
        .unwrap()
    }

    #[test]
    fn rejects_backend_root_as_root_dir() {
        let result = StorageSystem::from_uri("mem:///", "hdfs", "supergroup", true);
        assert!(result.is_err());
        let result = StorageSystem::from_uri("mem://host", "hdfs", "supergroup", true);
        assert!(result.is_err());
    }

    #[test]
    fn first_connection_creates_root() {
        let connects = Arc::new(AtomicUsize::new(0));
        let system = counting_system(Arc::clone(&connects), true);
        let conn = system.connection().unwrap();
        assert!(conn.exists("/data/ftp").unwrap());
        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_first_access_connects_once() {
        let connects = Arc::new(AtomicUsize::new(0));
        let system = Arc::new(counting_system(Arc::clone(&connects), true));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let system = Arc::clone(&system);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    system.connection().unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_connect_is_retried_on_next_call() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let system = StorageSystem::with_connector(
            Box::new(move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(StorageError::backend("cluster unreachable"))
                } else {
                    Ok(Arc::new(MemoryBackend::new("hdfs", "supergroup"))
                        as Arc<dyn StorageBackend>)
                }
            }),
            "/data/ftp",
            "hdfs",
            "supergroup",
            true,
        )
        .unwrap();

        assert!(system.connection().is_err());
        assert!(system.connection().is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn init_resets_root_when_enforcement_off() {
        let recording = Arc::new(Recording::new());
        let handle = Arc::clone(&recording);
        let system = StorageSystem::with_connector(
            Box::new(move || Ok(Arc::clone(&handle) as Arc<dyn StorageBackend>)),
            "/data/ftp",
            "hdfs",
            "supergroup",
            false,
        )
        .unwrap();

        system.connection().unwrap();
        let calls = recording.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "set_write_checksum",
                "set_verify_checksum",
                "set_working_directory",
                "set_owner",
                "set_permission",
                "exists",
                "mkdirs",
            ]
        );
    }

    #[test]
    fn init_skips_root_reset_when_enforcement_on() {
        let recording = Arc::new(Recording::new());
        let handle = Arc::clone(&recording);
        let system = StorageSystem::with_connector(
            Box::new(move || Ok(Arc::clone(&handle) as Arc<dyn StorageBackend>)),
            "/data/ftp",
            "hdfs",
            "supergroup",
            true,
        )
        .unwrap();

        system.connection().unwrap();
        let calls = recording.calls.lock().unwrap().clone();
        assert!(!calls.contains(&"set_owner".to_string()));
        assert!(!calls.contains(&"set_permission".to_string()));
    }

    #[test]
    fn tolerated_reset_failure_still_creates_root() {
        // Fresh backend: the root reset hits a missing path and is logged
        // away; the mkdir right after must still run.
        let connects = Arc::new(AtomicUsize::new(0));
        let system = counting_system(connects, false);
        let conn = system.connection().unwrap();
        assert!(conn.exists("/data/ftp").unwrap());
    }

    #[test]
    fn ensure_home_creates_once_with_ownership() {
        let connects = Arc::new(AtomicUsize::new(0));
        let system = counting_system(connects, true);
        let alice = DfsUser::new("alice", vec!["staff".to_string()]);

        system.ensure_home(&alice).unwrap();
        let conn = system.connection().unwrap();
        let status = conn.stat("/data/ftp/alice").unwrap();
        assert_eq!(status.owner, "alice");
        assert_eq!(status.group, "staff");

        // A second login leaves a manually adjusted home alone.
        conn.set_owner("/data/ftp/alice", "hdfs", "supergroup").unwrap();
        system.ensure_home(&alice).unwrap();
        assert_eq!(conn.stat("/data/ftp/alice").unwrap().owner, "hdfs");
    }
}
