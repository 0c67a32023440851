//! Directory entry cache: the name-to-inode entries of every directory.

use std::collections::HashMap;

use hashlink::LinkedHashMap;
use thiserror::Error;

use crate::fs::InodeAddr;

/// Cached metadata for a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DValue {
    /// Inode address of this entry.
    pub ino: InodeAddr,
    /// Whether this entry is itself a directory.
    pub is_dir: bool,
}

/// Reasons an entry cannot be added to a directory.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirCacheError {
    /// The parent was never registered as a directory.
    #[error("inode {0} is not a directory")]
    NotADirectory(InodeAddr),

    /// A sibling already uses this name.
    #[error("entry '{0}' already exists")]
    AlreadyExists(String),

    /// Empty, `.`, `..`, or containing a `/`.
    #[error("invalid entry name '{0}'")]
    InvalidName(String),
}

/// Per-directory state: child entries in insertion order plus the parent link.
struct DirState {
    children: LinkedHashMap<String, DValue>,
    /// Target of this directory's `..`. The root points at itself.
    parent: InodeAddr,
}

/// In-memory directory entry cache with per-parent child maps.
///
/// Each directory gets its own [`DirState`] whose [`LinkedHashMap`] keeps
/// children in the order they were inserted, so listings are deterministic
/// and follow the seeded order. The implicit `.` and `..` entries are not
/// stored; `..` is answered by [`DCache::parent_of`].
#[derive(Default)]
pub struct DCache {
    dirs: HashMap<InodeAddr, DirState>,
}

impl DCache {
    /// Creates an empty directory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `root` as a directory that is its own parent.
    pub fn insert_root(&mut self, root: InodeAddr) {
        self.dirs.insert(
            root,
            DirState {
                children: LinkedHashMap::new(),
                parent: root,
            },
        );
    }

    /// Check that `name` could be inserted under `parent` without inserting it.
    ///
    /// # Errors
    ///
    /// See [`DirCacheError`].
    pub fn validate(&self, parent_ino: InodeAddr, name: &str) -> Result<(), DirCacheError> {
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(DirCacheError::InvalidName(name.to_owned()));
        }
        let state = self
            .dirs
            .get(&parent_ino)
            .ok_or(DirCacheError::NotADirectory(parent_ino))?;
        if state.children.contains_key(name) {
            return Err(DirCacheError::AlreadyExists(name.to_owned()));
        }
        Ok(())
    }

    /// Append a child entry to `parent_ino`.
    ///
    /// When `is_dir` is set the child is registered as a directory whose
    /// `..` is `parent_ino`.
    ///
    /// # Errors
    ///
    /// See [`DirCacheError`]. Nothing is modified on error.
    pub fn insert(
        &mut self,
        parent_ino: InodeAddr,
        name: &str,
        ino: InodeAddr,
        is_dir: bool,
    ) -> Result<(), DirCacheError> {
        self.validate(parent_ino, name)?;
        if let Some(state) = self.dirs.get_mut(&parent_ino) {
            state
                .children
                .insert(name.to_owned(), DValue { ino, is_dir });
        }
        if is_dir {
            self.dirs.insert(
                ino,
                DirState {
                    children: LinkedHashMap::new(),
                    parent: parent_ino,
                },
            );
        }
        Ok(())
    }

    /// Looks up a single child entry by parent inode and exact name.
    #[must_use]
    pub fn lookup(&self, parent_ino: InodeAddr, name: &str) -> Option<DValue> {
        self.dirs.get(&parent_ino)?.children.get(name).copied()
    }

    /// Iterate all children of `parent_ino` in insertion order.
    ///
    /// Does nothing if `parent_ino` is not a registered directory.
    pub fn readdir<'a>(&'a self, parent_ino: InodeAddr, mut f: impl FnMut(&'a str, &'a DValue)) {
        let Some(state) = self.dirs.get(&parent_ino) else {
            return;
        };
        for (name, value) in &state.children {
            f(name.as_str(), value);
        }
    }

    /// The directory that `dir_ino`'s `..` refers to.
    #[must_use]
    pub fn parent_of(&self, dir_ino: InodeAddr) -> Option<InodeAddr> {
        self.dirs.get(&dir_ino).map(|state| state.parent)
    }

    /// Number of stored entries in `dir_ino`, excluding `.` and `..`.
    #[must_use]
    pub fn entry_count(&self, dir_ino: InodeAddr) -> Option<usize> {
        self.dirs.get(&dir_ino).map(|state| state.children.len())
    }

    /// Addresses of every registered directory.
    pub fn dir_addrs(&self) -> impl Iterator<Item = InodeAddr> + '_ {
        self.dirs.keys().copied()
    }

    /// Every `(parent, entry)` pair in the cache, in unspecified directory order.
    pub fn entries(&self) -> impl Iterator<Item = (InodeAddr, &str, &DValue)> + '_ {
        self.dirs.iter().flat_map(|(parent, state)| {
            state
                .children
                .iter()
                .map(move |(name, value)| (*parent, name.as_str(), value))
        })
    }
}
