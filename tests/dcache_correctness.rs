#![allow(clippy::unwrap_used, missing_docs)]

use unix_v4::fs::dcache::{DCache, DValue, DirCacheError};

fn with_root() -> DCache {
    let mut cache = DCache::new();
    cache.insert_root(1);
    cache
}

#[test]
fn lookup_returns_none_for_missing_entry() {
    let cache = with_root();
    assert!(cache.lookup(1, "foo").is_none());
    assert!(cache.lookup(7, "foo").is_none(), "unknown parent");
}

#[test]
fn insert_then_lookup() {
    let mut cache = with_root();
    cache.insert(1, "foo", 10, false).unwrap();
    let dv = cache.lookup(1, "foo");
    assert!(dv.is_some(), "entry should be present after insert");
    let dv = dv.expect("checked above");
    assert_eq!(dv.ino, 10);
    assert!(!dv.is_dir);
}

#[test]
fn lookup_is_exact_and_case_sensitive() {
    let mut cache = with_root();
    cache.insert(1, "games", 10, true).unwrap();
    assert!(cache.lookup(1, "Games").is_none());
    assert!(cache.lookup(1, "game").is_none());
    assert!(cache.lookup(1, "games ").is_none());
}

#[test]
fn readdir_returns_only_children_of_parent() {
    let mut cache = with_root();
    cache.insert(1, "a", 10, false).unwrap();
    cache.insert(1, "b", 11, true).unwrap();
    cache.insert(11, "c", 12, false).unwrap();

    let mut children = Vec::new();
    cache.readdir(1, |name, dvalue| {
        children.push((name.to_owned(), *dvalue));
    });
    assert_eq!(
        children,
        vec![
            ("a".to_owned(), DValue { ino: 10, is_dir: false }),
            ("b".to_owned(), DValue { ino: 11, is_dir: true }),
        ]
    );
}

#[test]
fn readdir_preserves_insertion_order() {
    let mut cache = with_root();
    for (i, name) in ["zeta", "alpha", "mid", "beta"].into_iter().enumerate() {
        cache.insert(1, name, 10 + i as u64, false).unwrap();
    }
    let mut names = Vec::new();
    cache.readdir(1, |name, _| names.push(name));
    assert_eq!(names, ["zeta", "alpha", "mid", "beta"]);
}

#[test]
fn readdir_on_unknown_parent_yields_nothing() {
    let cache = with_root();
    let mut called = false;
    cache.readdir(99, |_, _| called = true);
    assert!(!called);
}

#[test]
fn root_is_its_own_parent() {
    let cache = with_root();
    assert_eq!(cache.parent_of(1), Some(1));
}

#[test]
fn child_directory_records_parent() {
    let mut cache = with_root();
    cache.insert(1, "usr", 2, true).unwrap();
    cache.insert(2, "games", 3, true).unwrap();
    cache.insert(3, "moo", 4, false).unwrap();
    assert_eq!(cache.parent_of(2), Some(1));
    assert_eq!(cache.parent_of(3), Some(2));
    assert_eq!(cache.parent_of(4), None, "files have no directory state");
}

#[test]
fn duplicate_name_is_rejected_and_first_entry_kept() {
    let mut cache = with_root();
    cache.insert(1, "foo", 10, false).unwrap();
    assert_eq!(
        cache.insert(1, "foo", 20, true),
        Err(DirCacheError::AlreadyExists("foo".to_owned()))
    );
    assert_eq!(cache.lookup(1, "foo").unwrap().ino, 10);
    assert_eq!(cache.entry_count(1), Some(1));
    assert_eq!(cache.parent_of(20), None, "rejected directory was not registered");
}

#[test]
fn same_name_in_different_directories_is_fine() {
    let mut cache = with_root();
    cache.insert(1, "bin", 2, true).unwrap();
    cache.insert(1, "usr", 3, true).unwrap();
    cache.insert(3, "bin", 4, true).unwrap();
    assert_eq!(cache.lookup(1, "bin").unwrap().ino, 2);
    assert_eq!(cache.lookup(3, "bin").unwrap().ino, 4);
}

#[test]
fn invalid_names_are_rejected() {
    let mut cache = with_root();
    for name in ["", ".", "..", "a/b"] {
        assert_eq!(
            cache.insert(1, name, 10, false),
            Err(DirCacheError::InvalidName(name.to_owned())),
            "{name:?} should be rejected"
        );
    }
    assert_eq!(cache.entry_count(1), Some(0));
}

#[test]
fn insert_under_non_directory_fails() {
    let mut cache = with_root();
    cache.insert(1, "file", 10, false).unwrap();
    assert_eq!(
        cache.insert(10, "child", 11, false),
        Err(DirCacheError::NotADirectory(10))
    );
}

#[test]
fn entries_and_dir_addrs_cover_the_tree() {
    let mut cache = with_root();
    cache.insert(1, "usr", 2, true).unwrap();
    cache.insert(2, "moo", 3, false).unwrap();

    let mut dirs: Vec<_> = cache.dir_addrs().collect();
    dirs.sort_unstable();
    assert_eq!(dirs, [1, 2]);

    let mut entries: Vec<_> = cache
        .entries()
        .map(|(parent, name, dv)| (parent, name.to_owned(), dv.ino))
        .collect();
    entries.sort();
    assert_eq!(
        entries,
        [(1, "usr".to_owned(), 2), (2, "moo".to_owned(), 3)]
    );
}
