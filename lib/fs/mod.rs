//! The Unix V4 filesystem, simulated in memory.
/// Directory entry cache for parent-child lookups.
pub mod dcache;
/// Inode storage and allocation.
pub mod itable;
/// Path resolution (`namei`), directory listing and file reads.
pub mod resolve;
/// Boot-time construction of the fixed directory tree.
pub mod seed;

pub use resolve::{Filesystem, ResolveError, normalize_path, resolve_path};

use std::time::SystemTime;

use bitflags::bitflags;
use bytes::Bytes;

/// Type representing an inode identifier.
pub type InodeAddr = u64;

/// The address of the root directory. Allocation starts here, so the root is
/// always the first inode created.
pub const ROOT_ADDR: InodeAddr = 1;

bitflags! {
    /// Permission bits for an inode, similar to Unix file permissions.
    ///
    /// These are displayed by `ls -l` and never checked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InodePerms: u16 {
        /// Other: execute permission.
        const OTHER_EXECUTE = 1 << 0;
        /// Other: write permission.
        const OTHER_WRITE   = 1 << 1;
        /// Other: read permission.
        const OTHER_READ    = 1 << 2;

        /// Group: execute permission.
        const GROUP_EXECUTE = 1 << 3;
        /// Group: write permission.
        const GROUP_WRITE   = 1 << 4;
        /// Group: read permission.
        const GROUP_READ    = 1 << 5;

        /// Owner: execute permission.
        const OWNER_EXECUTE = 1 << 6;
        /// Owner: write permission.
        const OWNER_WRITE   = 1 << 7;
        /// Owner: read permission.
        const OWNER_READ    = 1 << 8;

        /// Sticky bit.
        const STICKY        = 1 << 9;
        /// Set-group-ID bit.
        const SETGID        = 1 << 10;
        /// Set-user-ID bit.
        const SETUID        = 1 << 11;

        /// Other: read, write, and execute.
        const OTHER_RWX = Self::OTHER_READ.bits()
            | Self::OTHER_WRITE.bits()
            | Self::OTHER_EXECUTE.bits();
        /// Group: read, write, and execute.
        const GROUP_RWX = Self::GROUP_READ.bits()
            | Self::GROUP_WRITE.bits()
            | Self::GROUP_EXECUTE.bits();
        /// Owner: read, write, and execute.
        const OWNER_RWX = Self::OWNER_READ.bits()
            | Self::OWNER_WRITE.bits()
            | Self::OWNER_EXECUTE.bits();
        /// Any of the three execute bits.
        const ANY_EXECUTE = Self::OWNER_EXECUTE.bits()
            | Self::GROUP_EXECUTE.bits()
            | Self::OTHER_EXECUTE.bits();
    }
}

impl InodePerms {
    /// `rwxr-xr-x`
    pub const MODE_755: Self = Self::from_bits_truncate(0o755);
    /// `rw-r--r--`
    pub const MODE_644: Self = Self::from_bits_truncate(0o644);
    /// `rw-rw-rw-`
    pub const MODE_666: Self = Self::from_bits_truncate(0o666);
    /// `rwxrwxrwt`
    pub const MODE_1777: Self = Self::from_bits_truncate(0o1777);

    /// Render the nine `rwx` characters in owner, group, other order.
    #[must_use]
    pub fn rwx_string(self) -> String {
        const TRIADS: [(InodePerms, InodePerms, InodePerms); 3] = [
            (
                InodePerms::OWNER_READ,
                InodePerms::OWNER_WRITE,
                InodePerms::OWNER_EXECUTE,
            ),
            (
                InodePerms::GROUP_READ,
                InodePerms::GROUP_WRITE,
                InodePerms::GROUP_EXECUTE,
            ),
            (
                InodePerms::OTHER_READ,
                InodePerms::OTHER_WRITE,
                InodePerms::OTHER_EXECUTE,
            ),
        ];

        let mut out = String::with_capacity(9);
        for (read, write, execute) in TRIADS {
            out.push(if self.contains(read) { 'r' } else { '-' });
            out.push(if self.contains(write) { 'w' } else { '-' });
            out.push(if self.contains(execute) { 'x' } else { '-' });
        }
        out
    }
}

/// The type of an inode entry in the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum INodeType {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// An executable program. Stored exactly like a regular file.
    Executable,
}

/// Representation of an inode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct INode {
    /// The address of this inode, which serves as its unique identifier.
    pub addr: InodeAddr,
    /// The permissions associated with this inode, represented as a bitfield.
    pub permissions: InodePerms,
    /// The time this inode was last modified at.
    pub last_modified_at: SystemTime,
    /// Number of directory entries referencing this inode.
    pub nlink: u32,
    /// The size of the file represented by this inode, in bytes.
    pub size: u64,
    /// Additional information about the type of this inode (e.g., file vs directory).
    pub itype: INodeType,
    /// File payload. Always empty for directories.
    pub content: Bytes,
}

impl INode {
    /// Check if this inode is a directory.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.itype == INodeType::Directory
    }

    /// Check if this inode can be run as a program.
    ///
    /// Executables always qualify. Regular files qualify when any execute bit
    /// is set, which covers shell scripts such as `/etc/rc`.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        match self.itype {
            INodeType::Executable => true,
            INodeType::File => self.permissions.intersects(InodePerms::ANY_EXECUTE),
            INodeType::Directory => false,
        }
    }

    /// The ten-character `ls -l` mode string, e.g. `drwxr-xr-x`.
    #[must_use]
    pub fn permission_string(&self) -> String {
        let kind = if self.is_directory() { 'd' } else { '-' };
        let mut out = String::with_capacity(10);
        out.push(kind);
        out.push_str(&self.permissions.rwx_string());
        out
    }
}

/// A directory entry yielded by [`Filesystem::readdir`].
///
/// Borrows both the entry name and the inode from the filesystem.
#[derive(Debug, Clone, Copy)]
pub struct DirEntry<'a> {
    /// The name of this entry within its parent directory.
    pub name: &'a str,
    /// The full inode data for this entry.
    pub inode: &'a INode,
}
