//! Wires a shell session to the process's stdin and stdout.

use std::sync::Arc;

use tokio::io::{AsyncWriteExt as _, BufReader, BufWriter};
use tokio::select;
use tracing::{debug, info};

use unix_v4::fs::seed;
use unix_v4::shell::{Shell, ShellError};

use crate::app_config::Config;
use crate::banner::BANNER;
use crate::term;

/// What the session should do once the filesystem is up.
pub enum Mode {
    /// Read commands from stdin until `exit`, end of input, or Ctrl+C.
    Interactive,
    /// Run one command line and return.
    Once(String),
}

async fn run(config: Config, mode: Mode) -> Result<(), ShellError> {
    let fs = Arc::new(seed::boot(&config.seed));
    info!(inodes = fs.inode_table().len(), "Filesystem seeded.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = BufWriter::new(tokio::io::stdout());

    match mode {
        Mode::Once(line) => {
            let mut shell = Shell::new(fs, config.shell, stdin, stdout);
            shell.execute(&line).await?;
            shell.flush().await
        }
        Mode::Interactive => {
            if config.banner && term::is_interactive() {
                stdout.write_all(BANNER.as_bytes()).await?;
            }
            let mut shell = Shell::new(fs, config.shell, stdin, stdout);
            select! {
                res = shell.run() => res,
                _ = tokio::signal::ctrl_c() => {
                    debug!("Received Ctrl+C signal, ending session...");
                    Ok(())
                },
            }
        }
    }
}

/// Main entry point for a session. Blocks until the session ends.
pub fn spawn(config: Config, mode: Mode) -> Result<(), ShellError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config, mode))
}
