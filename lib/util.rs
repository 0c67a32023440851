//! Small helpers shared across the crate.

/// Abort on a broken internal invariant.
///
/// Reserved for states that can only be reached through a bug in the seeded
/// tree (for example a directory entry pointing at an inode that was never
/// created). These are never user-facing conditions.
#[macro_export]
macro_rules! critical_bug {
    ($($arg:tt)*) => {
        panic!("Critical error in unix-v4, the filesystem is inconsistent: {}", format_args!($($arg)*))
    };
}
