#![allow(clippy::unwrap_used, missing_docs)]

mod common;

use bytes::Bytes;

use unix_v4::fs::itable::{InodeTable, InodeTableError};
use unix_v4::fs::{INodeType, InodePerms, ROOT_ADDR};

#[test]
fn first_allocation_is_root_addr() {
    let mut table = InodeTable::new(common::seed_time());
    let addr = table.create(INodeType::Directory, Bytes::new(), InodePerms::MODE_755);
    assert_eq!(addr, ROOT_ADDR);
}

#[test]
fn addresses_are_unique_and_increasing() {
    let mut table = InodeTable::new(common::seed_time());
    let a = table.create(INodeType::File, Bytes::from_static(b"a"), InodePerms::MODE_644);
    let b = table.create(INodeType::File, Bytes::from_static(b"b"), InodePerms::MODE_644);
    let c = table.create(INodeType::Directory, Bytes::new(), InodePerms::MODE_755);
    assert!(a < b && b < c, "got {a}, {b}, {c}");
    assert_eq!(table.len(), 3);
}

#[test]
fn create_records_metadata() {
    let mut table = InodeTable::new(common::seed_time());
    let addr = table.create(
        INodeType::File,
        Bytes::from_static(b"hello\n"),
        InodePerms::MODE_644,
    );
    let inode = table.get(addr).unwrap();
    assert_eq!(inode.addr, addr);
    assert_eq!(inode.size, 6);
    assert_eq!(inode.nlink, 1);
    assert_eq!(inode.last_modified_at, common::seed_time());
    assert_eq!(inode.content, Bytes::from_static(b"hello\n"));
    assert_eq!(inode.permissions, InodePerms::MODE_644);
}

#[test]
fn directories_drop_content() {
    let mut table = InodeTable::new(common::seed_time());
    let addr = table.create(
        INodeType::Directory,
        Bytes::from_static(b"ignored"),
        InodePerms::MODE_755,
    );
    let inode = table.get(addr).unwrap();
    assert!(inode.content.is_empty());
    assert_eq!(inode.size, 0);
}

#[test]
fn get_unknown_addr_fails() {
    let table = InodeTable::new(common::seed_time());
    assert!(table.is_empty());
    assert_eq!(table.get(42), Err(InodeTableError::InodeNotFound(42)));
    assert!(!table.contains(42));
}

#[test]
fn link_and_set_size_update_the_record() {
    let mut table = InodeTable::new(common::seed_time());
    let addr = table.create(INodeType::Directory, Bytes::new(), InodePerms::MODE_755);
    assert_eq!(table.link(addr).unwrap(), 2);
    assert_eq!(table.link(addr).unwrap(), 3);
    table.set_size(addr, 64).unwrap();
    let inode = table.get(addr).unwrap();
    assert_eq!(inode.nlink, 3);
    assert_eq!(inode.size, 64);

    assert_eq!(table.link(99), Err(InodeTableError::InodeNotFound(99)));
    assert_eq!(table.set_size(99, 1), Err(InodeTableError::InodeNotFound(99)));
}

#[test]
fn classification_predicates() {
    let mut table = InodeTable::new(common::seed_time());
    let dir = table.create(INodeType::Directory, Bytes::new(), InodePerms::MODE_755);
    let exe = table.create(INodeType::Executable, Bytes::new(), InodePerms::MODE_755);
    let script = table.create(INodeType::File, Bytes::new(), InodePerms::MODE_755);
    let text = table.create(INodeType::File, Bytes::new(), InodePerms::MODE_644);

    let dir = table.get(dir).unwrap();
    assert!(dir.is_directory());
    assert!(!dir.is_executable(), "directories are never runnable");

    assert!(table.get(exe).unwrap().is_executable());
    assert!(!table.get(exe).unwrap().is_directory());
    assert!(table.get(script).unwrap().is_executable());
    assert!(!table.get(text).unwrap().is_executable());
}

#[test]
fn permission_strings() {
    let mut table = InodeTable::new(common::seed_time());
    let dir = table.create(INodeType::Directory, Bytes::new(), InodePerms::MODE_755);
    let exe = table.create(INodeType::Executable, Bytes::new(), InodePerms::MODE_755);
    let text = table.create(INodeType::File, Bytes::new(), InodePerms::MODE_644);
    let dev = table.create(INodeType::File, Bytes::new(), InodePerms::MODE_666);

    assert_eq!(table.get(dir).unwrap().permission_string(), "drwxr-xr-x");
    assert_eq!(table.get(exe).unwrap().permission_string(), "-rwxr-xr-x");
    assert_eq!(table.get(text).unwrap().permission_string(), "-rw-r--r--");
    assert_eq!(table.get(dev).unwrap().permission_string(), "-rw-rw-rw-");
}

#[test]
fn sticky_bit_is_not_rendered() {
    assert_eq!(InodePerms::MODE_1777.rwx_string(), "rwxrwxrwx");
    assert!(InodePerms::MODE_1777.contains(InodePerms::STICKY));
}
