//! POSIX-style permission decisions against backend metadata.
//!
//! Every check fetches fresh metadata; nothing is cached between calls.
//! Checks take the user's virtual path and translate it per lookup.
//! Readability fails closed when the object cannot be inspected, while
//! writability climbs the virtual namespace to the nearest existing
//! ancestor; a climb that reaches the chroot root grants outright.

use log::debug;

use crate::backend::{FileStatus, StorageBackend};
use crate::path::{self, PathTranslator};
use crate::user::DfsUser;

const READ_OFFSET: usize = 0;
const WRITE_OFFSET: usize = 1;

/// Which third of the permission triad applies to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessCategory {
    Owner,
    Group,
    Other,
}

impl AccessCategory {
    fn of(status: &FileStatus, user: &DfsUser) -> Self {
        if user.name() == status.owner {
            AccessCategory::Owner
        } else if user.is_group_member(&status.group) {
            AccessCategory::Group
        } else {
            AccessCategory::Other
        }
    }

    fn base(&self) -> usize {
        match self {
            AccessCategory::Owner => 0,
            AccessCategory::Group => 3,
            AccessCategory::Other => 6,
        }
    }
}

fn triad_allows(status: &FileStatus, user: &DfsUser, offset: usize) -> bool {
    let category = AccessCategory::of(status, user);
    let expected = if offset == READ_OFFSET { b'r' } else { b'w' };
    let allowed = status.permissions.as_bytes().get(category.base() + offset) == Some(&expected);
    debug!(
        "permission check: user={} path={} category={:?} triad={} allowed={}",
        user.name(),
        status.path,
        category,
        status.permissions,
        allowed
    );
    allowed
}

/// Evaluates one user's access against one backend.
///
/// Built per check; holds no state beyond the borrowed backend handle,
/// the path translator, the enforcement switch, and the requesting user.
/// All paths passed in are virtual; every metadata lookup goes through
/// the translator into the user's own backend namespace.
pub struct PermissionEvaluator<'a> {
    backend: &'a dyn StorageBackend,
    translator: &'a PathTranslator,
    enforced: bool,
    user: &'a DfsUser,
}

impl<'a> PermissionEvaluator<'a> {
    pub fn new(
        backend: &'a dyn StorageBackend,
        translator: &'a PathTranslator,
        enforced: bool,
        user: &'a DfsUser,
    ) -> Self {
        PermissionEvaluator {
            backend,
            translator,
            enforced,
            user,
        }
    }

    /// Read bit of the applicable triad block. Any metadata failure
    /// denies; there is no fallback for reads.
    pub fn is_readable(&self, virtual_path: &str) -> bool {
        if !self.enforced {
            return true;
        }
        let backend_path = self.translator.to_backend(virtual_path, self.user);
        match self.backend.stat(&backend_path) {
            Ok(status) => triad_allows(&status, self.user, READ_OFFSET),
            Err(e) => {
                debug!("read check failed for {}: {}", virtual_path, e);
                false
            }
        }
    }

    /// Write bit of the applicable triad block, evaluated on the path
    /// itself when it exists, or else on the nearest existing virtual
    /// ancestor. The climb never leaves the user's namespace: as soon as
    /// the parent is the chroot root the answer is yes, without
    /// consulting the root's own triad.
    pub fn is_writable(&self, virtual_path: &str) -> bool {
        if !self.enforced {
            return true;
        }
        let mut current = path::normalize(virtual_path);
        loop {
            let backend_path = self.translator.to_backend(&current, self.user);
            match self.backend.stat(&backend_path) {
                Ok(status) => return triad_allows(&status, self.user, WRITE_OFFSET),
                Err(e) => {
                    debug!("write check ascending past {}: {}", current, e);
                    let parent = path::parent_of(&current);
                    if parent == "/" {
                        return true;
                    }
                    current = parent;
                }
            }
        }
    }

    /// Removal is governed by the same rule as writing.
    pub fn is_removable(&self, virtual_path: &str) -> bool {
        self.is_writable(virtual_path)
    }
}
