#![allow(dead_code, missing_docs, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use unix_v4::fs::Filesystem;
use unix_v4::fs::seed::{self, SeedConfig};
use unix_v4::shell::{Shell, ShellConfig};

/// The default seed timestamp, 1973-11-06T00:00:00Z.
pub const SEED_EPOCH: u64 = 121_392_000;

/// Boots the standard tree with the default seed.
pub fn booted() -> Filesystem {
    seed::boot(&SeedConfig::default())
}

/// Same as [`booted`], shared.
pub fn shared() -> Arc<Filesystem> {
    Arc::new(booted())
}

pub fn seed_time() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(SEED_EPOCH)
}

/// Runs each line through `execute` on a fresh shell and returns everything written.
pub async fn exec_lines(lines: &[&str]) -> String {
    exec_lines_with(ShellConfig::default(), lines).await
}

pub async fn exec_lines_with(config: ShellConfig, lines: &[&str]) -> String {
    let input: &[u8] = &[];
    let mut shell = Shell::new(
        shared(),
        config,
        tokio::io::BufReader::new(input),
        Vec::new(),
    );
    for line in lines {
        shell.execute(line).await.unwrap();
    }
    String::from_utf8(shell.into_writer()).unwrap()
}

/// Feeds `input` to a full interactive session and returns its output.
pub async fn run_session(input: &str) -> String {
    run_session_bytes(input.as_bytes()).await
}

pub async fn run_session_bytes(input: &[u8]) -> String {
    let mut shell = Shell::new(
        shared(),
        ShellConfig::default(),
        tokio::io::BufReader::new(input),
        Vec::new(),
    );
    shell.run().await.unwrap();
    String::from_utf8(shell.into_writer()).unwrap()
}
