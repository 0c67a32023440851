//! Path resolution over the inode table and directory cache.
//!
//! Every call walks from the root; nothing about previously resolved paths is
//! remembered. The caller owns its working directory and turns relative paths
//! into absolute ones with [`resolve_path`] before asking the [`Filesystem`].

use bytes::Bytes;
use thiserror::Error;
use tracing::trace;

use crate::critical_bug;
use crate::fs::dcache::DCache;
use crate::fs::itable::{InodeTable, InodeTableError};
use crate::fs::{DirEntry, INode, InodeAddr};

/// Why a path failed to resolve.
///
/// [`Filesystem::namei`] collapses both variants into `None`; callers that
/// want to tell them apart use [`Filesystem::walk`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// A segment names no entry in its directory.
    #[error("no such file or directory")]
    NotFound,

    /// A segment tried to descend through something that is not a directory.
    #[error("not a directory")]
    NotADirectory,
}

/// Turn `path` into an absolute path relative to `cwd`.
///
/// Absolute paths are returned unchanged. Relative paths are appended to
/// `cwd` with exactly one `/` between them. `.` and `..` are left alone; they
/// are handled when the path is walked.
#[must_use]
pub fn resolve_path(path: &str, cwd: &str) -> String {
    if path.starts_with('/') {
        return path.to_owned();
    }
    let mut resolved = String::with_capacity(cwd.len() + 1 + path.len());
    resolved.push_str(cwd);
    if !resolved.ends_with('/') {
        resolved.push('/');
    }
    resolved.push_str(path);
    resolved
}

/// Lexically canonicalise an absolute path: drop empty and `.` segments and
/// fold `..` into its predecessor. `..` at the root stays at the root.
///
/// This agrees with what [`Filesystem::walk`] reaches because the tree has no
/// symbolic links.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            name => stack.push(name),
        }
    }
    format!("/{}", stack.join("/"))
}

/// The read-only filesystem: an inode table, its directory tree and the root.
///
/// Built once by [`FilesystemBuilder`](super::seed::FilesystemBuilder) and
/// never mutated afterwards, so a single instance can be shared between any
/// number of shell sessions.
pub struct Filesystem {
    itable: InodeTable,
    dcache: DCache,
    root: InodeAddr,
}

impl Filesystem {
    pub(crate) fn from_parts(itable: InodeTable, dcache: DCache, root: InodeAddr) -> Self {
        Self {
            itable,
            dcache,
            root,
        }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &INode {
        self.inode(self.root)
    }

    /// Look an inode up by address.
    ///
    /// # Errors
    ///
    /// Returns [`InodeTableError::InodeNotFound`] for addresses that were never allocated.
    pub fn get(&self, addr: InodeAddr) -> Result<&INode, InodeTableError> {
        self.itable.get(addr)
    }

    /// The underlying inode table.
    #[must_use]
    pub fn inode_table(&self) -> &InodeTable {
        &self.itable
    }

    /// The underlying directory cache.
    #[must_use]
    pub fn dcache(&self) -> &DCache {
        &self.dcache
    }

    /// Walk `path` from the root and report exactly why it failed, if it did.
    ///
    /// The path is split on `/` with empty segments discarded, so `/`,
    /// `//usr//games/` and `usr/games` all walk the same way. Resolution
    /// stops at the first segment that cannot be followed.
    ///
    /// # Errors
    ///
    /// [`ResolveError::NotADirectory`] if a segment follows a non-directory,
    /// [`ResolveError::NotFound`] if a segment names no entry.
    pub fn walk(&self, path: &str) -> Result<&INode, ResolveError> {
        let mut current = self.root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !current.is_directory() {
                trace!(path, segment, "walk through non-directory");
                return Err(ResolveError::NotADirectory);
            }
            current = match segment {
                "." => current,
                ".." => self.inode(self.parent_addr(current.addr)),
                name => match self.dcache.lookup(current.addr, name) {
                    Some(dv) => self.inode(dv.ino),
                    None => {
                        trace!(path, segment, "no such entry");
                        return Err(ResolveError::NotFound);
                    }
                },
            };
        }
        Ok(current)
    }

    /// Resolve an absolute path to its inode, or `None` if it does not resolve.
    #[must_use]
    pub fn namei(&self, path: &str) -> Option<&INode> {
        self.walk(path).ok()
    }

    /// List a directory: `.`, `..`, then its entries in the order they were created.
    ///
    /// Returns `None` if `path` does not resolve or is not a directory.
    #[must_use]
    pub fn readdir(&self, path: &str) -> Option<Vec<DirEntry<'_>>> {
        let dir = self.namei(path)?;
        if !dir.is_directory() {
            return None;
        }

        let mut entries = Vec::with_capacity(self.dcache.entry_count(dir.addr).unwrap_or(0) + 2);
        entries.push(DirEntry {
            name: ".",
            inode: dir,
        });
        entries.push(DirEntry {
            name: "..",
            inode: self.inode(self.parent_addr(dir.addr)),
        });
        self.dcache.readdir(dir.addr, |name, dv| {
            entries.push(DirEntry {
                name,
                inode: self.inode(dv.ino),
            });
        });
        Some(entries)
    }

    /// Read a file's full content.
    ///
    /// Returns `None` both when `path` does not resolve and when it names a
    /// directory; callers display the two identically.
    #[must_use]
    pub fn read(&self, path: &str) -> Option<Bytes> {
        match self.walk(path) {
            Ok(inode) if !inode.is_directory() => Some(inode.content.clone()),
            _ => None,
        }
    }

    /// Fetch an inode that the directory tree says must exist.
    fn inode(&self, addr: InodeAddr) -> &INode {
        match self.itable.get(addr) {
            Ok(inode) => inode,
            Err(e) => critical_bug!("directory tree references a missing inode: {e}"),
        }
    }

    fn parent_addr(&self, dir: InodeAddr) -> InodeAddr {
        let Some(parent) = self.dcache.parent_of(dir) else {
            critical_bug!("directory inode {dir} has no directory state");
        };
        parent
    }
}
