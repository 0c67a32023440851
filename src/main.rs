//! Boot the Unix Fourth Edition filesystem and talk to it through its shell.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

mod app_config;
mod banner;
mod session;
mod term;
mod trc;

use crate::app_config::Config;
use crate::session::Mode;
use crate::trc::Trc;

#[derive(Parser)]
#[command(
    version,
    about = "The Unix Fourth Edition filesystem and shell, simulated in memory."
)]
struct Args {
    #[arg(
        short,
        long,
        value_parser,
        help = "Optional path to a unix-v4 config TOML."
    )]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive shell session.
    Run,

    /// Run a single command line and exit.
    Exec {
        /// The command and its arguments, e.g. `ls -l /usr/games`.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
}

/// Main entry point for the application.
fn main() {
    let args = Args::parse();

    Trc::default().init().unwrap_or_else(|e| {
        eprintln!(
            "Failed to initialize logging. Without logging, we can't provide any useful error \
             messages, so we have to exit: {e}"
        );
        std::process::exit(1);
    });

    let config = match Config::load(args.config_path.as_deref()) {
        Ok(config) => config,
        Err(app_config::ConfigError::ValidationErrors(messages)) => {
            error!("Configuration is invalid.");
            for msg in &messages {
                error!(" - {msg}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let mode = match args.command.unwrap_or(Command::Run) {
        Command::Run => Mode::Interactive,
        Command::Exec { words } => Mode::Once(words.join(" ")),
    };

    if let Err(e) = session::spawn(config, mode) {
        error!("Session failed: {e}");
        std::process::exit(1);
    }
}
