//! unix-v4 shared library.

/// The in-memory filesystem: inode table, directory cache, path resolution and seeding.
pub mod fs;
/// The line-oriented shell that drives the filesystem.
pub mod shell;
/// Crate-wide helpers.
pub mod util;
