//! Inode table with monotonically allocated addresses.

use std::collections::HashMap;
use std::time::SystemTime;

use bytes::Bytes;
use thiserror::Error;
use tracing::trace;

use crate::fs::{INode, INodeType, InodeAddr, InodePerms, ROOT_ADDR};

/// Errors returned by [`InodeTable`] lookups.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InodeTableError {
    /// No inode has been allocated at this address.
    #[error("inode {0} not found")]
    InodeNotFound(InodeAddr),
}

/// Monotonically increasing inode allocator.
struct InodeFactory {
    next_inode: InodeAddr,
}

impl InodeFactory {
    fn new(start: InodeAddr) -> Self {
        Self { next_inode: start }
    }

    fn allocate(&mut self) -> InodeAddr {
        let ino = self.next_inode;
        self.next_inode += 1;
        ino
    }
}

/// Owns every inode record, addressed by [`InodeAddr`].
///
/// The table knows nothing about names or paths; those live in the
/// [`DCache`](super::dcache::DCache). Records are only created and adjusted
/// while the tree is being seeded, after which the table is read-only.
pub struct InodeTable {
    inodes: HashMap<InodeAddr, INode>,
    factory: InodeFactory,
    /// Timestamp stamped on every inode created by this table.
    mtime: SystemTime,
}

impl InodeTable {
    /// Create an empty table whose inodes will all carry `mtime`.
    #[must_use]
    pub fn new(mtime: SystemTime) -> Self {
        Self {
            inodes: HashMap::new(),
            factory: InodeFactory::new(ROOT_ADDR),
            mtime,
        }
    }

    /// Allocate a new inode and return its address.
    ///
    /// The link count starts at 1. Files take their size from `content`;
    /// directories ignore `content` and start with size 0.
    pub fn create(
        &mut self,
        itype: INodeType,
        content: Bytes,
        permissions: InodePerms,
    ) -> InodeAddr {
        let addr = self.factory.allocate();
        let content = if itype == INodeType::Directory {
            Bytes::new()
        } else {
            content
        };
        let inode = INode {
            addr,
            permissions,
            last_modified_at: self.mtime,
            nlink: 1,
            size: content.len() as u64,
            itype,
            content,
        };
        trace!(addr, ?itype, size = inode.size, "created inode");
        self.inodes.insert(addr, inode);
        addr
    }

    /// Fetch the inode at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`InodeTableError::InodeNotFound`] if nothing was allocated at `addr`.
    pub fn get(&self, addr: InodeAddr) -> Result<&INode, InodeTableError> {
        self.inodes
            .get(&addr)
            .ok_or(InodeTableError::InodeNotFound(addr))
    }

    /// Whether an inode exists at `addr`.
    #[must_use]
    pub fn contains(&self, addr: InodeAddr) -> bool {
        self.inodes.contains_key(&addr)
    }

    /// Record one more directory entry referencing `addr`. Returns the new link count.
    ///
    /// # Errors
    ///
    /// Returns [`InodeTableError::InodeNotFound`] if nothing was allocated at `addr`.
    pub fn link(&mut self, addr: InodeAddr) -> Result<u32, InodeTableError> {
        let inode = self.get_mut(addr)?;
        inode.nlink += 1;
        Ok(inode.nlink)
    }

    /// Overwrite the size of `addr`. Used to give directories their entry-derived size.
    ///
    /// # Errors
    ///
    /// Returns [`InodeTableError::InodeNotFound`] if nothing was allocated at `addr`.
    pub fn set_size(&mut self, addr: InodeAddr, size: u64) -> Result<(), InodeTableError> {
        self.get_mut(addr)?.size = size;
        Ok(())
    }

    /// Number of inodes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inodes.len()
    }

    /// Whether the table holds no inodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inodes.is_empty()
    }

    /// Iterate all inodes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &INode> {
        self.inodes.values()
    }

    fn get_mut(&mut self, addr: InodeAddr) -> Result<&mut INode, InodeTableError> {
        self.inodes
            .get_mut(&addr)
            .ok_or(InodeTableError::InodeNotFound(addr))
    }
}
