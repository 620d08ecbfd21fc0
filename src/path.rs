//! Path translation between the user-visible namespace and the backend.
//!
//! Every client addresses files with virtual paths rooted at its own chroot.
//! The backend address is always `root-dir/username/virtual-path`. This
//! module owns that mapping plus the normalization rules that keep it a
//! bijection over a user's subtree.

use crate::user::DfsUser;

/// Normalizes a virtual path: leading `/`, single separators, `.` dropped,
/// `..` resolved without escaping the chroot root.
///
/// An empty or relative input is interpreted from the root, so `""`, `"/"`
/// and `"/./"` all normalize to `"/"`.
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Resolves a client-supplied argument against the session's working
/// directory. Absolute arguments ignore the working directory.
pub fn resolve(cwd: &str, arg: &str) -> String {
    if arg.starts_with('/') {
        normalize(arg)
    } else {
        normalize(&format!("{}/{}", cwd, arg))
    }
}

/// Short name of a path, `""` for the root.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

/// Parent of a virtual path; the root is its own parent.
pub fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(pos) if pos > 0 => path[..pos].to_string(),
        _ => "/".to_string(),
    }
}

/// Joins two path fragments with exactly one separator between them,
/// regardless of which side already carries slashes.
fn join(left: &str, right: &str) -> String {
    let left = left.trim_end_matches('/');
    let right = right.trim_start_matches('/');
    if right.is_empty() {
        if left.is_empty() {
            "/".to_string()
        } else {
            left.to_string()
        }
    } else {
        format!("{}/{}", left, right)
    }
}

/// Maps virtual paths to backend paths and back for one configured root.
///
/// Translation is a bijection restricted to a user's subtree:
/// `to_virtual(to_backend(p, u), u) == normalize(p)`.
#[derive(Debug, Clone)]
pub struct PathTranslator {
    root_dir: String,
}

impl PathTranslator {
    pub fn new(root_dir: impl Into<String>) -> Self {
        let root = root_dir.into();
        let trimmed = root.trim_end_matches('/');
        Self {
            root_dir: if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            },
        }
    }

    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }

    /// The backend path of a user's chroot root.
    pub fn home_of(&self, user: &DfsUser) -> String {
        join(&self.root_dir, user.name())
    }

    /// Translates a virtual path into the backend namespace.
    ///
    /// Re-joining an already-joined path must not duplicate the prefix, so a
    /// path that already carries `root-dir/username` is stripped back to its
    /// virtual form first.
    pub fn to_backend(&self, path: &str, user: &DfsUser) -> String {
        let virtual_path = self.strip_prefix(path, user);
        let joined = join(&self.home_of(user), &virtual_path);
        let trimmed = joined.trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Translates a backend path back into the user-visible namespace; used
    /// when wrapping directory-listing entries. A path outside the user's
    /// prefix is returned unchanged apart from a guaranteed leading `/`.
    pub fn to_virtual(&self, backend_path: &str, user: &DfsUser) -> String {
        let stripped = self.strip_prefix(backend_path, user);
        normalize(&stripped)
    }

    fn strip_prefix(&self, path: &str, user: &DfsUser) -> String {
        let home = self.home_of(user);
        if let Some(rest) = path.strip_prefix(home.as_str()) {
            if rest.is_empty() {
                return "/".to_string();
            }
            if rest.starts_with('/') {
                return rest.to_string();
            }
        }
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        }
    }
}
