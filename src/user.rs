//! User identities and the registry they are loaded from.
//!
//! A `DfsUser` is the identity every adapter operation runs under: a name,
//! an ordered group list (first entry is the primary group) and the
//! membership predicate permission checks consult. Accounts come from the
//! `[users]` table of the configuration file.

use std::collections::HashMap;

use serde::Deserialize;

/// Identity attached to a logged-in session and to every file object it
/// creates. The chroot root of a user is always `root-dir/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfsUser {
    name: String,
    groups: Vec<String>,
}

impl DfsUser {
    pub fn new(name: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            name: name.into(),
            groups,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary group, the one newly created objects are chowned to.
    pub fn main_group(&self) -> &str {
        self.groups.first().map(String::as_str).unwrap_or("")
    }

    pub fn is_group_member(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// One account as declared in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub password: String,
    pub groups: Vec<String>,
}

/// All configured accounts, keyed by login name.
#[derive(Debug, Default, Clone)]
pub struct UserRegistry {
    entries: HashMap<String, UserEntry>,
}

impl UserRegistry {
    pub fn new(entries: HashMap<String, UserEntry>) -> Self {
        Self { entries }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Checks a password and yields the identity on success.
    pub fn authenticate(&self, name: &str, password: &str) -> Option<DfsUser> {
        let entry = self.entries.get(name)?;
        if entry.password == password {
            Some(DfsUser::new(name, entry.groups.clone()))
        } else {
            None
        }
    }
}
