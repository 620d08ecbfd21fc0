//! The per-path adapter handed to the protocol layer.
//!
//! A `DfsFileObject` binds one virtual path to the user asking about it.
//! Metadata getters never fail: they answer with safe defaults (`false`,
//! `None`, `0`) when the backend cannot be asked. Mutations report success
//! as `bool` after an explicit permission gate. Only the two stream
//! constructors return errors, because a denied or failed transfer must
//! reach the client as a negative reply.

use std::io::{Read, Write};
use std::sync::Arc;

use log::{debug, warn};

use crate::backend::FileStatus;
use crate::error::{StorageError, StorageResult};
use crate::path;
use crate::permissions::PermissionEvaluator;
use crate::system::StorageSystem;
use crate::user::DfsUser;

/// Link count reported for directories; `.` and `..` plus one child slot,
/// the classic approximation clients expect in LIST output.
const DIRECTORY_LINK_COUNT: u32 = 3;
const FILE_LINK_COUNT: u32 = 1;

pub struct DfsFileObject {
    /// Normalized virtual path, what the client sees.
    path: String,
    /// Translated backend path, what the store sees.
    backend_path: String,
    user: DfsUser,
    system: Arc<StorageSystem>,
}

impl DfsFileObject {
    pub fn new(path: &str, user: &DfsUser, system: Arc<StorageSystem>) -> Self {
        let virtual_path = path::normalize(path);
        let backend_path = system.translator().to_backend(&virtual_path, user);
        DfsFileObject {
            path: virtual_path,
            backend_path,
            user: user.clone(),
            system,
        }
    }

    /// Last segment of the virtual path; the root names itself `/`.
    pub fn name(&self) -> &str {
        if self.path == "/" {
            "/"
        } else {
            path::file_name(&self.path)
        }
    }

    /// Full virtual path as the client addresses it.
    pub fn absolute_path(&self) -> &str {
        &self.path
    }

    pub(crate) fn backend_path(&self) -> &str {
        &self.backend_path
    }

    /// Fresh metadata, `None` when the path is absent or the backend
    /// cannot be reached.
    pub fn status(&self) -> Option<FileStatus> {
        self.stat().ok()
    }

    fn stat(&self) -> StorageResult<FileStatus> {
        self.system.connection()?.stat(&self.backend_path)
    }

    /// Dotfile hiding is not part of this namespace.
    pub fn is_hidden(&self) -> bool {
        false
    }

    pub fn is_directory(&self) -> bool {
        match self.stat() {
            Ok(status) => status.is_dir(),
            Err(_) => false,
        }
    }

    pub fn is_file(&self) -> bool {
        match self.stat() {
            Ok(status) => status.is_file(),
            Err(_) => false,
        }
    }

    pub fn exists(&self) -> bool {
        match self.system.connection() {
            Ok(conn) => conn.exists(&self.backend_path).unwrap_or(false),
            Err(_) => false,
        }
    }

    pub fn is_readable(&self) -> bool {
        if !self.system.permissions_enabled() {
            return true;
        }
        match self.system.connection() {
            Ok(conn) => {
                PermissionEvaluator::new(conn.as_ref(), self.system.translator(), true, &self.user)
                    .is_readable(&self.path)
            }
            Err(e) => {
                warn!("read check unavailable for {}: {}", self.path, e);
                false
            }
        }
    }

    pub fn is_writable(&self) -> bool {
        if !self.system.permissions_enabled() {
            return true;
        }
        match self.system.connection() {
            Ok(conn) => {
                PermissionEvaluator::new(conn.as_ref(), self.system.translator(), true, &self.user)
                    .is_writable(&self.path)
            }
            Err(e) => {
                warn!("write check unavailable for {}: {}", self.path, e);
                false
            }
        }
    }

    pub fn is_removable(&self) -> bool {
        if !self.system.permissions_enabled() {
            return true;
        }
        match self.system.connection() {
            Ok(conn) => {
                PermissionEvaluator::new(conn.as_ref(), self.system.translator(), true, &self.user)
                    .is_removable(&self.path)
            }
            Err(e) => {
                warn!("removal check unavailable for {}: {}", self.path, e);
                false
            }
        }
    }

    pub fn owner_name(&self) -> Option<String> {
        self.status().map(|s| s.owner)
    }

    pub fn group_name(&self) -> Option<String> {
        self.status().map(|s| s.group)
    }

    pub fn link_count(&self) -> u32 {
        if self.is_directory() {
            DIRECTORY_LINK_COUNT
        } else {
            FILE_LINK_COUNT
        }
    }

    /// Modification time in milliseconds since the epoch, `0` when unknown.
    pub fn last_modified(&self) -> u64 {
        self.status().map(|s| s.modified_ms).unwrap_or(0)
    }

    /// Size in bytes, `0` when unknown.
    pub fn size(&self) -> u64 {
        self.status().map(|s| s.length).unwrap_or(0)
    }

    /// Creates this path as a directory owned by the requesting user.
    /// Denied or failed creation is reported as `false`.
    pub fn mkdir(&self) -> bool {
        if !self.is_writable() {
            debug!("mkdir denied for {} by {}", self.path, self.user.name());
            return false;
        }
        let created = self.system.connection().and_then(|conn| {
            conn.mkdirs(&self.backend_path)?;
            conn.set_owner(&self.backend_path, self.user.name(), self.user.main_group())
        });
        match created {
            Ok(()) => true,
            Err(e) => {
                warn!("mkdir failed for {}: {}", self.path, e);
                false
            }
        }
    }

    /// Deletes this path, directories recursively.
    pub fn delete(&self) -> bool {
        if !self.is_removable() {
            debug!("delete denied for {} by {}", self.path, self.user.name());
            return false;
        }
        match self
            .system
            .connection()
            .and_then(|conn| conn.delete(&self.backend_path, true))
        {
            Ok(()) => true,
            Err(e) => {
                warn!("delete failed for {}: {}", self.path, e);
                false
            }
        }
    }

    /// Renames this object to the destination's path. Requires removal
    /// rights here and write rights there.
    pub fn move_to(&self, destination: &DfsFileObject) -> bool {
        if !self.is_removable() || !destination.is_writable() {
            debug!(
                "move denied: {} -> {} by {}",
                self.path,
                destination.path,
                self.user.name()
            );
            return false;
        }
        match self
            .system
            .connection()
            .and_then(|conn| conn.rename(&self.backend_path, &destination.backend_path))
        {
            Ok(()) => true,
            Err(e) => {
                warn!("move failed: {} -> {}: {}", self.path, destination.path, e);
                false
            }
        }
    }

    /// Children of this directory, each wrapped for the same user so their
    /// own getters answer from that user's point of view. `None` when the
    /// directory is unreadable or cannot be listed; a denial never yields
    /// a partial listing.
    pub fn list_files(&self) -> Option<Vec<DfsFileObject>> {
        if !self.is_readable() {
            debug!("listing denied for {} by {}", self.path, self.user.name());
            return None;
        }
        let conn = self.system.connection().ok()?;
        let children = match conn.list_dir(&self.backend_path) {
            Ok(children) => children,
            Err(e) => {
                warn!("listing failed for {}: {}", self.path, e);
                return None;
            }
        };
        Some(
            children
                .into_iter()
                .map(|status| {
                    let virtual_path = self.system.translator().to_virtual(&status.path, &self.user);
                    DfsFileObject::new(&virtual_path, &self.user, Arc::clone(&self.system))
                })
                .collect(),
        )
    }

    /// Opens the file for writing, truncating any previous content and
    /// chowning the new file to the requesting user. The offset is part of
    /// the call signature for resumed transfers, which the backend does
    /// not support; writing always starts at byte zero.
    pub fn create_output_stream(&self, offset: u64) -> StorageResult<Box<dyn Write + Send>> {
        if !self.is_writable() {
            return Err(StorageError::permission_denied(self.path.clone()));
        }
        if offset > 0 {
            debug!(
                "ignoring restart offset {} for {}, writing from the start",
                offset, self.path
            );
        }
        let conn = self.system.connection()?;
        let stream = conn.create_write(&self.backend_path)?;
        conn.set_owner(&self.backend_path, self.user.name(), self.user.main_group())?;
        Ok(stream)
    }

    /// Opens the file for reading from byte zero; the offset is ignored
    /// the same way it is for writing.
    pub fn create_input_stream(&self, offset: u64) -> StorageResult<Box<dyn Read + Send>> {
        if !self.is_readable() {
            return Err(StorageError::permission_denied(self.path.clone()));
        }
        if offset > 0 {
            debug!(
                "ignoring restart offset {} for {}, reading from the start",
                offset, self.path
            );
        }
        let conn = self.system.connection()?;
        conn.open_read(&self.backend_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, StorageBackend};

    fn fixture() -> (Arc<StorageSystem>, Arc<MemoryBackend>, DfsUser) {
        let backend = Arc::new(MemoryBackend::new("hdfs", "supergroup"));
        let handle = Arc::clone(&backend);
        let system = Arc::new(
            StorageSystem::with_connector(
                Box::new(move || Ok(Arc::clone(&handle) as Arc<dyn StorageBackend>)),
                "/data/ftp",
                "hdfs",
                "supergroup",
                true,
            )
            .unwrap(),
        );
        let alice = DfsUser::new("alice", vec!["staff".to_string()]);
        system.ensure_home(&alice).unwrap();
        (system, backend, alice)
    }

    fn object(system: &Arc<StorageSystem>, user: &DfsUser, path: &str) -> DfsFileObject {
        DfsFileObject::new(path, user, Arc::clone(system))
    }

    #[test]
    fn names_and_paths() {
        let (system, _backend, alice) = fixture();
        let root = object(&system, &alice, "/");
        assert_eq!(root.name(), "/");
        assert_eq!(root.absolute_path(), "/");
        assert_eq!(root.backend_path(), "/data/ftp/alice");

        let file = object(&system, &alice, "/reports/q1.csv");
        assert_eq!(file.name(), "q1.csv");
        assert_eq!(file.absolute_path(), "/reports/q1.csv");
        assert_eq!(file.backend_path(), "/data/ftp/alice/reports/q1.csv");
    }

    #[test]
    fn missing_path_answers_safe_defaults() {
        let (system, _backend, alice) = fixture();
        let ghost = object(&system, &alice, "/nope.txt");
        assert!(!ghost.exists());
        assert!(!ghost.is_directory());
        assert!(!ghost.is_file());
        assert!(!ghost.is_hidden());
        assert_eq!(ghost.owner_name(), None);
        assert_eq!(ghost.group_name(), None);
        assert_eq!(ghost.size(), 0);
        assert_eq!(ghost.last_modified(), 0);
    }

    #[test]
    fn link_count_constants() {
        let (system, backend, alice) = fixture();
        backend.mkdirs("/data/ftp/alice/dir").unwrap();
        backend
            .create_write("/data/ftp/alice/f.txt")
            .unwrap()
            .write_all(b"x")
            .unwrap();

        assert_eq!(object(&system, &alice, "/dir").link_count(), 3);
        assert_eq!(object(&system, &alice, "/f.txt").link_count(), 1);
        assert_eq!(object(&system, &alice, "/missing").link_count(), 1);
    }

    #[test]
    fn mkdir_creates_and_chowns_inside_writable_home() {
        let (system, backend, alice) = fixture();
        let dir = object(&system, &alice, "/uploads");
        assert!(dir.mkdir());
        assert!(dir.is_directory());
        let status = backend.stat("/data/ftp/alice/uploads").unwrap();
        assert_eq!(status.owner, "alice");
        assert_eq!(status.group, "staff");
    }

    #[test]
    fn denied_user_cannot_mutate_or_list() {
        let (system, backend, _alice) = fixture();
        // Bob's home and its incoming directory belong to someone else
        // and shut out everyone but the owner and group.
        backend.mkdirs("/data/ftp/bob/incoming").unwrap();
        for path in ["/data/ftp/bob", "/data/ftp/bob/incoming"] {
            backend.set_owner(path, "root", "wheel").unwrap();
            backend.set_permission(path, "rwxr-x---").unwrap();
        }
        let bob = DfsUser::new("bob", vec!["staff".to_string()]);

        let dir = object(&system, &bob, "/incoming/locked");
        assert!(!dir.mkdir());
        assert!(!backend.exists("/data/ftp/bob/incoming/locked").unwrap());

        let home = object(&system, &bob, "/");
        assert!(!home.is_readable());
        assert!(home.list_files().is_none());
    }

    #[test]
    fn listing_wraps_children_as_virtual_paths() {
        let (system, backend, alice) = fixture();
        backend.mkdirs("/data/ftp/alice/sub").unwrap();
        backend
            .create_write("/data/ftp/alice/a.txt")
            .unwrap()
            .write_all(b"a")
            .unwrap();

        let home = object(&system, &alice, "/");
        let children = home.list_files().unwrap();
        let paths: Vec<&str> = children.iter().map(|c| c.absolute_path()).collect();
        assert_eq!(paths, vec!["/a.txt", "/sub"]);
        assert!(paths.iter().all(|p| !p.contains("/data/ftp")));
        assert_eq!(children[0].name(), "a.txt");
    }

    #[test]
    fn readable_listing_is_never_partial() {
        let (system, backend, alice) = fixture();
        backend.mkdirs("/data/ftp/alice/open").unwrap();
        backend.mkdirs("/data/ftp/alice/shut").unwrap();
        backend.set_owner("/data/ftp/alice/shut", "root", "wheel").unwrap();
        backend
            .set_permission("/data/ftp/alice/shut", "rwx------")
            .unwrap();

        let home = object(&system, &alice, "/");
        let children = home.list_files().unwrap();
        assert_eq!(children.len(), 2);
        let shut = children.iter().find(|c| c.name() == "shut").unwrap();
        assert!(!shut.is_readable());
    }

    #[test]
    fn delete_removes_subtrees() {
        let (system, backend, alice) = fixture();
        backend.mkdirs("/data/ftp/alice/old/deep").unwrap();
        backend.set_owner("/data/ftp/alice/old", "alice", "staff").unwrap();
        let dir = object(&system, &alice, "/old");
        assert!(dir.delete());
        assert!(!backend.exists("/data/ftp/alice/old").unwrap());
        assert!(!backend.exists("/data/ftp/alice/old/deep").unwrap());
    }

    #[test]
    fn move_renames_when_both_sides_allow() {
        let (system, backend, alice) = fixture();
        backend
            .create_write("/data/ftp/alice/src.txt")
            .unwrap()
            .write_all(b"payload")
            .unwrap();
        backend.set_owner("/data/ftp/alice/src.txt", "alice", "staff").unwrap();

        let src = object(&system, &alice, "/src.txt");
        let dst = object(&system, &alice, "/renamed.txt");
        assert!(src.move_to(&dst));
        assert!(!backend.exists("/data/ftp/alice/src.txt").unwrap());
        assert_eq!(backend.stat("/data/ftp/alice/renamed.txt").unwrap().length, 7);
    }

    #[test]
    fn move_refused_without_destination_write_right() {
        let (system, backend, alice) = fixture();
        backend
            .create_write("/data/ftp/alice/src.txt")
            .unwrap()
            .write_all(b"x")
            .unwrap();
        backend.set_owner("/data/ftp/alice/src.txt", "alice", "staff").unwrap();
        // Destination parent denies writing even to its owner.
        backend.mkdirs("/data/ftp/alice/frozen").unwrap();
        backend
            .set_permission("/data/ftp/alice/frozen", "r-xr-xr-x")
            .unwrap();
        backend.set_owner("/data/ftp/alice/frozen", "alice", "staff").unwrap();

        let src = object(&system, &alice, "/src.txt");
        let dst = object(&system, &alice, "/frozen/src.txt");
        assert!(!src.move_to(&dst));
        assert!(backend.exists("/data/ftp/alice/src.txt").unwrap());
    }

    #[test]
    fn output_stream_writes_and_chowns() {
        let (system, backend, alice) = fixture();
        let file = object(&system, &alice, "/up.txt");
        let mut stream = file.create_output_stream(0).unwrap();
        stream.write_all(b"uploaded").unwrap();
        drop(stream);

        let status = backend.stat("/data/ftp/alice/up.txt").unwrap();
        assert_eq!(status.owner, "alice");
        assert_eq!(status.group, "staff");
        assert_eq!(status.length, 8);
    }

    #[test]
    fn input_stream_reads_existing_content() {
        let (system, backend, alice) = fixture();
        backend
            .create_write("/data/ftp/alice/down.txt")
            .unwrap()
            .write_all(b"content")
            .unwrap();

        let file = object(&system, &alice, "/down.txt");
        let mut out = String::new();
        file.create_input_stream(0).unwrap().read_to_string(&mut out).unwrap();
        assert_eq!(out, "content");
    }

    #[test]
    fn restart_offsets_are_ignored() {
        let (system, backend, alice) = fixture();
        let file = object(&system, &alice, "/up.txt");
        let mut stream = file.create_output_stream(100).unwrap();
        stream.write_all(b"from-zero").unwrap();
        drop(stream);
        assert_eq!(backend.stat("/data/ftp/alice/up.txt").unwrap().length, 9);

        let mut out = String::new();
        file.create_input_stream(4).unwrap().read_to_string(&mut out).unwrap();
        assert_eq!(out, "from-zero");
    }

    #[test]
    fn denied_streams_surface_errors() {
        let (system, backend, _alice) = fixture();
        // The file already exists and its own triad shuts bob out both
        // ways; bob is neither the owner nor in the wheel group.
        backend.mkdirs("/data/ftp/bob").unwrap();
        backend
            .create_write("/data/ftp/bob/up.txt")
            .unwrap()
            .write_all(b"kept")
            .unwrap();
        backend.set_owner("/data/ftp/bob/up.txt", "root", "wheel").unwrap();
        backend
            .set_permission("/data/ftp/bob/up.txt", "r--r-----")
            .unwrap();
        let bob = DfsUser::new("bob", vec!["staff".to_string()]);

        let file = object(&system, &bob, "/up.txt");
        let err = file.create_output_stream(0).err().unwrap();
        assert!(matches!(err, StorageError::PermissionDenied(_)));
        assert_eq!(backend.stat("/data/ftp/bob/up.txt").unwrap().length, 4);

        let err = file.create_input_stream(0).err().unwrap();
        assert!(matches!(err, StorageError::PermissionDenied(_)));
    }

    #[test]
    fn first_level_entries_are_writable_in_a_read_only_home() {
        // Uploading a new first-level file only needs the chroot root as
        // parent, which is always writable; the home triad governs the
        // root itself, not entries created beneath it.
        let (system, backend, _alice) = fixture();
        backend.mkdirs("/data/ftp/carol").unwrap();
        backend.set_owner("/data/ftp/carol", "carol", "staff").unwrap();
        backend
            .set_permission("/data/ftp/carol", "r-xr-xr-x")
            .unwrap();
        let carol = DfsUser::new("carol", vec!["staff".to_string()]);

        assert!(object(&system, &carol, "/report.txt").is_writable());
        assert!(!object(&system, &carol, "/").is_writable());
    }

    #[test]
    fn enforcement_off_lets_anyone_through() {
        let backend = Arc::new(MemoryBackend::new("hdfs", "supergroup"));
        let handle = Arc::clone(&backend);
        let system = Arc::new(
            StorageSystem::with_connector(
                Box::new(move || Ok(Arc::clone(&handle) as Arc<dyn StorageBackend>)),
                "/data/ftp",
                "hdfs",
                "supergroup",
                false,
            )
            .unwrap(),
        );
        backend.mkdirs("/data/ftp/eve").unwrap();
        backend.set_owner("/data/ftp/eve", "root", "wheel").unwrap();
        backend.set_permission("/data/ftp/eve", "---------").unwrap();

        let eve = DfsUser::new("eve", vec![]);
        let home = DfsFileObject::new("/", &eve, Arc::clone(&system));
        assert!(home.is_readable());
        assert!(home.is_writable());
        assert!(home.list_files().is_some());
    }
}
