//! Boot-time construction of the fixed Unix V4 tree.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::{BufMut as _, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::critical_bug;
use crate::fs::dcache::{DCache, DirCacheError};
use crate::fs::itable::InodeTable;
use crate::fs::{Filesystem, INodeType, InodeAddr, InodePerms};

/// Bytes a V4 directory spends per entry (2-byte inode number plus 14-byte name).
pub const DIRENT_SIZE: u64 = 16;

/// Length of a PDP-11 `a.out` header.
pub const AOUT_HEADER_LEN: usize = 16;

/// `0407`: the magic number of a plain PDP-11 executable.
const AOUT_MAGIC: u16 = 0o407;

/// 1973-11-06T00:00:00Z, the date stamped on the recovered V4 tape contents.
const DEFAULT_EPOCH_SECS: u64 = 121_392_000;

fn default_epoch() -> u64 {
    DEFAULT_EPOCH_SECS
}

/// Knobs for [`boot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeedConfig {
    /// Modification time of every seeded inode, in seconds since the Unix epoch.
    #[serde(default = "default_epoch")]
    pub epoch: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            epoch: DEFAULT_EPOCH_SECS,
        }
    }
}

impl SeedConfig {
    /// The seed timestamp as a [`SystemTime`].
    #[must_use]
    pub fn mtime(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.epoch)
    }
}

/// Build a synthetic PDP-11 executable image exactly `size` bytes long.
///
/// The image is an `a.out` header whose text segment covers the rest of the
/// file, followed by zeroed text. Images shorter than a header are all zeros.
#[must_use]
pub fn aout_image(size: usize) -> Bytes {
    let mut buf = BytesMut::with_capacity(size);
    if size >= AOUT_HEADER_LEN {
        let text = u16::try_from(size - AOUT_HEADER_LEN).unwrap_or(u16::MAX);
        buf.put_u16_le(AOUT_MAGIC);
        buf.put_u16_le(text);
        // data, bss, symbols, entry point, unused, relocation-stripped flag
        buf.put_u16_le(0);
        buf.put_u16_le(0);
        buf.put_u16_le(0);
        buf.put_u16_le(0);
        buf.put_u16_le(0);
        buf.put_u16_le(1);
    }
    buf.resize(size, 0);
    buf.freeze()
}

/// Incrementally assembles a [`Filesystem`].
///
/// Keeps link counts consistent as entries are added: every new directory
/// gains a link for its own `.` and gives its parent one for its `..`.
pub struct FilesystemBuilder {
    itable: InodeTable,
    dcache: DCache,
    root: InodeAddr,
}

impl FilesystemBuilder {
    /// Start a tree containing only a `drwxr-xr-x` root stamped with `mtime`.
    #[must_use]
    pub fn new(mtime: SystemTime) -> Self {
        let mut itable = InodeTable::new(mtime);
        let mut dcache = DCache::new();
        let root = itable.create(INodeType::Directory, Bytes::new(), InodePerms::MODE_755);
        Self::link_or_bug(&mut itable, root);
        dcache.insert_root(root);
        Self {
            itable,
            dcache,
            root,
        }
    }

    /// Address of the root directory.
    #[must_use]
    pub fn root(&self) -> InodeAddr {
        self.root
    }

    /// Create a directory named `name` inside `parent`.
    ///
    /// # Errors
    ///
    /// Fails without allocating anything if `name` is invalid, already taken,
    /// or `parent` is not a directory.
    pub fn mkdir(
        &mut self,
        parent: InodeAddr,
        name: &str,
        permissions: InodePerms,
    ) -> Result<InodeAddr, DirCacheError> {
        self.dcache.validate(parent, name)?;
        let addr = self
            .itable
            .create(INodeType::Directory, Bytes::new(), permissions);
        self.dcache.insert(parent, name, addr, true)?;
        Self::link_or_bug(&mut self.itable, addr);
        Self::link_or_bug(&mut self.itable, parent);
        debug!(parent, name, addr, "seeded directory");
        Ok(addr)
    }

    /// Create a regular file named `name` inside `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`mkdir`](Self::mkdir).
    pub fn mkfile(
        &mut self,
        parent: InodeAddr,
        name: &str,
        content: impl Into<Bytes>,
        permissions: InodePerms,
    ) -> Result<InodeAddr, DirCacheError> {
        self.mknod(parent, name, INodeType::File, content.into(), permissions)
    }

    /// Create a `rwxr-xr-x` executable of exactly `size` bytes inside `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`mkdir`](Self::mkdir).
    pub fn mkexec(
        &mut self,
        parent: InodeAddr,
        name: &str,
        size: usize,
    ) -> Result<InodeAddr, DirCacheError> {
        self.mknod(
            parent,
            name,
            INodeType::Executable,
            aout_image(size),
            InodePerms::MODE_755,
        )
    }

    fn mknod(
        &mut self,
        parent: InodeAddr,
        name: &str,
        itype: INodeType,
        content: Bytes,
        permissions: InodePerms,
    ) -> Result<InodeAddr, DirCacheError> {
        self.dcache.validate(parent, name)?;
        let addr = self.itable.create(itype, content, permissions);
        self.dcache.insert(parent, name, addr, false)?;
        debug!(parent, name, addr, ?itype, "seeded file");
        Ok(addr)
    }

    /// Finish the tree: size every directory from its entry count and check
    /// that no entry points at a missing inode.
    #[must_use]
    pub fn build(mut self) -> Filesystem {
        let dirs: Vec<InodeAddr> = self.dcache.dir_addrs().collect();
        for dir in dirs {
            let entries = self.dcache.entry_count(dir).unwrap_or(0) as u64;
            if let Err(e) = self.itable.set_size(dir, (entries + 2) * DIRENT_SIZE) {
                critical_bug!("directory without an inode: {e}");
            }
        }
        for (parent, name, dv) in self.dcache.entries() {
            if !self.itable.contains(dv.ino) {
                critical_bug!("entry '{name}' in directory {parent} points at missing inode {}", dv.ino);
            }
        }
        debug!(inodes = self.itable.len(), "filesystem built");
        Filesystem::from_parts(self.itable, self.dcache, self.root)
    }

    fn link_or_bug(itable: &mut InodeTable, addr: InodeAddr) {
        if let Err(e) = itable.link(addr) {
            critical_bug!("linking a freshly created inode failed: {e}");
        }
    }
}

/// Top-level directories, in the order `ls /` shows them.
pub const TOP_LEVEL: [&str; 6] = ["bin", "dev", "etc", "lib", "tmp", "usr"];

/// Programs in `/bin` with their sizes in bytes.
const BIN: [(&str, usize); 8] = [
    ("sh", 3_438),
    ("ls", 2_984),
    ("cat", 452),
    ("echo", 136),
    ("date", 1_238),
    ("who", 884),
    ("uname", 312),
    ("pwd", 650),
];

/// The games in `/usr/games`, with the sizes of the binaries on the V4 tape.
pub const GAMES: [(&str, usize, &str); 6] = [
    ("moo", 624, "Bulls and Cows"),
    ("ttt", 2_192, "Tic-Tac-Toe with learning"),
    ("wump", 5_386, "Hunt the Wumpus"),
    ("bj", 3_020, "Blackjack"),
    ("chess", 18_622, "Chess"),
    ("cubic", 7_028, "4x4x4 Tic-Tac-Toe"),
];

const MOTD: &str = "\
UNIX Time-Sharing System, Fourth Edition
Bell Telephone Laboratories, Murray Hill

Games live in /usr/games. Type 'help' for commands.
";

const PASSWD: &str = "\
root::0:1::/:
daemon::1:1::/:
bin::3:1::/bin:
ken::6:1::/usr/ken:
dmr::7:1::/usr/dmr:
";

const GROUP: &str = "\
other::1:
bin::3:
";

const RC: &str = "\
/etc/mount /dev/rk1 /usr
rm -f /etc/mtab
/etc/update
";

fn populate(b: &mut FilesystemBuilder) -> Result<(), DirCacheError> {
    let root = b.root();
    let mut dirs = [root; TOP_LEVEL.len()];
    for (slot, name) in dirs.iter_mut().zip(TOP_LEVEL) {
        let perms = if name == "tmp" {
            InodePerms::MODE_1777
        } else {
            InodePerms::MODE_755
        };
        *slot = b.mkdir(root, name, perms)?;
    }
    let [bin, dev, etc, _lib, _tmp, usr] = dirs;

    for (name, size) in BIN {
        b.mkexec(bin, name, size)?;
    }

    b.mkfile(dev, "tty0", Bytes::new(), InodePerms::MODE_666)?;
    b.mkfile(dev, "null", Bytes::new(), InodePerms::MODE_666)?;

    b.mkfile(etc, "motd", MOTD, InodePerms::MODE_644)?;
    b.mkfile(etc, "passwd", PASSWD, InodePerms::MODE_644)?;
    b.mkfile(etc, "group", GROUP, InodePerms::MODE_644)?;
    b.mkfile(etc, "rc", RC, InodePerms::MODE_755)?;

    b.mkdir(usr, "bin", InodePerms::MODE_755)?;
    let games = b.mkdir(usr, "games", InodePerms::MODE_755)?;
    b.mkdir(usr, "lib", InodePerms::MODE_755)?;
    b.mkdir(usr, "src", InodePerms::MODE_755)?;

    for (name, size, _) in GAMES {
        b.mkexec(games, name, size)?;
    }
    b.mkfile(games, "ttt.k", Bytes::new(), InodePerms::MODE_666)?;

    Ok(())
}

/// Build the fixed Unix V4 tree.
///
/// The result is identical on every call for the same `config`.
#[must_use]
pub fn boot(config: &SeedConfig) -> Filesystem {
    let mut builder = FilesystemBuilder::new(config.mtime());
    if let Err(e) = populate(&mut builder) {
        critical_bug!("seed tree is malformed: {e}");
    }
    builder.build()
}
