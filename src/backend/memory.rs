//! In-memory implementation of [`StorageBackend`].
//!
//! Backs the `mem://` scheme. One flat map of normalized absolute paths to
//! nodes behind an `RwLock`; the root directory `/` always exists. Used by
//! the integration tests and handy for running the server without a
//! cluster in reach.

use std::collections::HashMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::backend::{FileKind, FileStatus, StorageBackend};
use crate::error::{StorageError, StorageResult};
use crate::path;

const DIR_DEFAULT_PERMISSIONS: &str = "rwxr-xr-x";
const FILE_DEFAULT_PERMISSIONS: &str = "rw-r--r--";

#[derive(Debug, Clone)]
struct Node {
    kind: FileKind,
    owner: String,
    group: String,
    permissions: String,
    content: Vec<u8>,
    modified_ms: u64,
}

type Store = Arc<RwLock<HashMap<String, Node>>>;

pub struct MemoryBackend {
    store: Store,
    superuser: String,
    supergroup: String,
    write_checksum: AtomicBool,
    verify_checksum: AtomicBool,
}

impl MemoryBackend {
    pub fn new(superuser: &str, supergroup: &str) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            "/".to_string(),
            Node {
                kind: FileKind::Directory,
                owner: superuser.to_string(),
                group: supergroup.to_string(),
                permissions: DIR_DEFAULT_PERMISSIONS.to_string(),
                content: Vec::new(),
                modified_ms: now_ms(),
            },
        );
        MemoryBackend {
            store: Arc::new(RwLock::new(nodes)),
            superuser: superuser.to_string(),
            supergroup: supergroup.to_string(),
            write_checksum: AtomicBool::new(true),
            verify_checksum: AtomicBool::new(true),
        }
    }

    fn directory_node(&self) -> Node {
        Node {
            kind: FileKind::Directory,
            owner: self.superuser.clone(),
            group: self.supergroup.clone(),
            permissions: DIR_DEFAULT_PERMISSIONS.to_string(),
            content: Vec::new(),
            modified_ms: now_ms(),
        }
    }

    fn file_node(&self) -> Node {
        Node {
            kind: FileKind::File,
            owner: self.superuser.clone(),
            group: self.supergroup.clone(),
            permissions: FILE_DEFAULT_PERMISSIONS.to_string(),
            content: Vec::new(),
            modified_ms: now_ms(),
        }
    }

    /// Inserts every missing ancestor of `p`, `p` itself excluded.
    fn ensure_parents(&self, nodes: &mut HashMap<String, Node>, p: &str) -> StorageResult<()> {
        let mut missing = Vec::new();
        let mut current = path::parent_of(p);
        while !nodes.contains_key(&current) {
            missing.push(current.clone());
            if current == "/" {
                break;
            }
            current = path::parent_of(&current);
        }
        if let Some(node) = nodes.get(&current) {
            if node.kind.is_file() {
                return Err(StorageError::backend(format!(
                    "{} is a file, not a directory",
                    current
                )));
            }
        }
        for dir in missing.into_iter().rev() {
            nodes.insert(dir, self.directory_node());
        }
        Ok(())
    }

    fn status_of(path: &str, node: &Node) -> FileStatus {
        FileStatus {
            path: path.to_string(),
            kind: node.kind,
            owner: node.owner.clone(),
            group: node.group.clone(),
            permissions: node.permissions.clone(),
            length: node.content.len() as u64,
            modified_ms: node.modified_ms,
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn exists(&self, path: &str) -> StorageResult<bool> {
        let nodes = self.store.read().unwrap();
        Ok(nodes.contains_key(&normalize(path)))
    }

    fn stat(&self, path: &str) -> StorageResult<FileStatus> {
        let p = normalize(path);
        let nodes = self.store.read().unwrap();
        match nodes.get(&p) {
            Some(node) => Ok(Self::status_of(&p, node)),
            None => Err(StorageError::not_found(&p)),
        }
    }

    fn list_dir(&self, path: &str) -> StorageResult<Vec<FileStatus>> {
        let p = normalize(path);
        let nodes = self.store.read().unwrap();
        let dir = nodes.get(&p).ok_or_else(|| StorageError::not_found(&p))?;
        if dir.kind.is_file() {
            return Err(StorageError::backend(format!("{} is not a directory", p)));
        }
        let mut children: Vec<FileStatus> = nodes
            .iter()
            .filter(|(child, _)| child.as_str() != "/" && path::parent_of(child) == p)
            .map(|(child, node)| Self::status_of(child, node))
            .collect();
        children.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(children)
    }

    fn mkdirs(&self, path: &str) -> StorageResult<()> {
        let p = normalize(path);
        let mut nodes = self.store.write().unwrap();
        if let Some(existing) = nodes.get(&p) {
            if existing.kind.is_dir() {
                return Ok(());
            }
            return Err(StorageError::backend(format!("{} exists as a file", p)));
        }
        self.ensure_parents(&mut nodes, &p)?;
        nodes.insert(p, self.directory_node());
        Ok(())
    }

    fn set_owner(&self, path: &str, owner: &str, group: &str) -> StorageResult<()> {
        let p = normalize(path);
        let mut nodes = self.store.write().unwrap();
        let node = nodes.get_mut(&p).ok_or_else(|| StorageError::not_found(&p))?;
        node.owner = owner.to_string();
        node.group = group.to_string();
        Ok(())
    }

    fn set_permission(&self, path: &str, permissions: &str) -> StorageResult<()> {
        if permissions.len() != 9 {
            return Err(StorageError::backend(format!(
                "bad permission triad: {}",
                permissions
            )));
        }
        let p = normalize(path);
        let mut nodes = self.store.write().unwrap();
        let node = nodes.get_mut(&p).ok_or_else(|| StorageError::not_found(&p))?;
        node.permissions = permissions.to_string();
        Ok(())
    }

    fn delete(&self, path: &str, recursive: bool) -> StorageResult<()> {
        let p = normalize(path);
        if p == "/" {
            return Err(StorageError::backend("refusing to delete the root"));
        }
        let mut nodes = self.store.write().unwrap();
        let node = nodes.get(&p).ok_or_else(|| StorageError::not_found(&p))?;
        let subtree = format!("{}/", p);
        if node.kind.is_dir() {
            let occupied = nodes.keys().any(|k| k.starts_with(&subtree));
            if occupied && !recursive {
                return Err(StorageError::backend(format!("{} is not empty", p)));
            }
        }
        nodes.retain(|k, _| k != &p && !k.starts_with(&subtree));
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        let src = normalize(from);
        let dst = normalize(to);
        let mut nodes = self.store.write().unwrap();
        if !nodes.contains_key(&src) {
            return Err(StorageError::not_found(&src));
        }
        if nodes.contains_key(&dst) {
            return Err(StorageError::backend(format!("{} already exists", dst)));
        }
        let dst_parent = path::parent_of(&dst);
        match nodes.get(&dst_parent) {
            Some(parent) if parent.kind.is_dir() => {}
            _ => {
                return Err(StorageError::backend(format!(
                    "destination parent {} is missing",
                    dst_parent
                )));
            }
        }
        let src_subtree = format!("{}/", src);
        let moved: Vec<String> = nodes
            .keys()
            .filter(|k| *k == &src || k.starts_with(&src_subtree))
            .cloned()
            .collect();
        for old_key in moved {
            if let Some(mut node) = nodes.remove(&old_key) {
                node.modified_ms = now_ms();
                let new_key = format!("{}{}", dst, &old_key[src.len()..]);
                nodes.insert(new_key, node);
            }
        }
        Ok(())
    }

    fn open_read(&self, path: &str) -> StorageResult<Box<dyn Read + Send>> {
        let p = normalize(path);
        let nodes = self.store.read().unwrap();
        let node = nodes.get(&p).ok_or_else(|| StorageError::not_found(&p))?;
        if node.kind.is_dir() {
            return Err(StorageError::backend(format!("{} is a directory", p)));
        }
        Ok(Box::new(Cursor::new(node.content.clone())))
    }

    fn create_write(&self, path: &str) -> StorageResult<Box<dyn Write + Send>> {
        let p = normalize(path);
        {
            let mut nodes = self.store.write().unwrap();
            if let Some(existing) = nodes.get(&p) {
                if existing.kind.is_dir() {
                    return Err(StorageError::backend(format!("{} is a directory", p)));
                }
            }
            self.ensure_parents(&mut nodes, &p)?;
            nodes.insert(p.clone(), self.file_node());
        }
        Ok(Box::new(MemoryWriter {
            store: Arc::clone(&self.store),
            path: p,
        }))
    }

    fn set_working_directory(&self, _path: &str) -> StorageResult<()> {
        // Paths arriving here are always absolute, so nothing to track.
        Ok(())
    }

    fn set_write_checksum(&self, enabled: bool) {
        self.write_checksum.store(enabled, Ordering::SeqCst);
    }

    fn set_verify_checksum(&self, enabled: bool) {
        self.verify_checksum.store(enabled, Ordering::SeqCst);
    }
}

/// Write handle appending straight into the store, chunk by chunk.
struct MemoryWriter {
    store: Store,
    path: String,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut nodes = self.store.write().unwrap();
        match nodes.get_mut(&self.path) {
            Some(node) => {
                node.content.extend_from_slice(buf);
                node.modified_ms = now_ms();
                Ok(buf.len())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} removed while open for write", self.path),
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn normalize(p: &str) -> String {
    path::normalize(p)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
