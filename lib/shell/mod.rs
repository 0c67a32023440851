//! A recreation of the Unix V4 shell.
//!
//! The shell owns the session state (working directory, running flag) and
//! talks to the shared [`Filesystem`] only through `namei`, `readdir` and
//! `read`. Programs found on disk are never run; only built-ins do anything.

mod builtin;

pub use builtin::{Builtin, CommandLine, LsFlags};

use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _};
use tracing::{debug, trace, warn};

use crate::fs::seed::GAMES;
use crate::fs::{Filesystem, INode, normalize_path, resolve_path};

/// Errors that end a shell session.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ShellConfig {
    /// Printed before every command.
    pub prompt: String,
    /// Initial working directory and the target of a bare `cd`.
    pub home: String,
    /// Colon-separated program search path. An empty component means the
    /// working directory.
    pub path: String,
    /// Shown by `who`.
    pub user: String,
    /// Shown by `uname` and at login.
    pub system_name: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "# ".to_owned(),
            home: "/".to_owned(),
            path: "/bin:/usr/bin:/usr/games".to_owned(),
            user: "root".to_owned(),
            system_name: "Unix Fourth Edition".to_owned(),
        }
    }
}

impl ShellConfig {
    /// Check the settings for mistakes.
    ///
    /// # Errors
    ///
    /// Returns every problem found, one message each.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !self.home.starts_with('/') {
            errors.push(format!("home '{}' is not an absolute path.", self.home));
        }
        for dir in self.path.split(':').filter(|d| !d.is_empty()) {
            if !dir.starts_with('/') {
                errors.push(format!("path entry '{dir}' is not an absolute path."));
            }
        }
        if self.prompt.contains('\n') {
            errors.push("prompt must not contain a newline.".to_owned());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Format a timestamp the way `ls -l` shows it, e.g. `Nov  6 00:00`. Always UTC.
#[must_use]
pub fn format_mtime(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format("%b %e %H:%M").to_string()
}

/// One `ls -l` line, newline included.
#[must_use]
pub fn long_listing(name: &str, inode: &INode) -> String {
    format!(
        "{} {} root {:>6} {} {}\n",
        inode.permission_string(),
        inode.nlink,
        inode.size,
        format_mtime(inode.last_modified_at),
        name
    )
}

const HELP_COMMANDS: &str = "\
Unix V4 Shell Commands:
  ls [-la]      - list directory contents
  cd [dir]      - change directory
  pwd           - print working directory
  cat file      - display file contents
  echo text     - display text
  date          - show current date/time
  who           - show logged in users
  uname         - show system name
  clear         - clear screen
  exit          - exit shell
";

/// An interactive shell session reading commands from `R` and writing to `W`.
pub struct Shell<R, W> {
    fs: Arc<Filesystem>,
    config: ShellConfig,
    cwd: String,
    running: bool,
    reader: R,
    writer: W,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Start a session in `config.home`, or in `/` if that is not a directory.
    pub fn new(fs: Arc<Filesystem>, config: ShellConfig, reader: R, writer: W) -> Self {
        let mut config = config;
        let home = normalize_path(&config.home);
        let cwd = if fs.namei(&home).is_some_and(INode::is_directory) {
            home
        } else {
            warn!(home = %config.home, "home is not a directory, starting in /");
            "/".to_owned()
        };
        config.home.clone_from(&cwd);
        Self {
            fs,
            config,
            cwd,
            running: true,
            reader,
            writer,
        }
    }

    /// The current working directory, always absolute and normalised.
    #[must_use]
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Whether `exit` has been run.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Consume the session and hand back its output sink.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Flush buffered output.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub async fn flush(&mut self) -> Result<(), ShellError> {
        self.writer.flush().await?;
        Ok(())
    }

    /// Print the login banner.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub async fn login(&mut self) -> Result<(), ShellError> {
        let banner = format!(
            "\n{}\nBell Telephone Laboratories\n1973\n\n",
            self.config.system_name
        );
        self.write(&banner).await
    }

    /// Run the read-execute loop until `exit` or end of input.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures. Undecodable input is read lossily; command failures are reported on the output
    /// and do not end the session.
    pub async fn run(&mut self) -> Result<(), ShellError> {
        self.login().await?;

        let mut buf = Vec::new();
        while self.running {
            let prompt = self.config.prompt.clone();
            self.write(&prompt).await?;
            self.flush().await?;

            buf.clear();
            if self.reader.read_until(b'\n', &mut buf).await? == 0 {
                debug!("end of input");
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            self.execute(line.trim_end_matches(['\n', '\r'])).await?;
        }

        self.write("logout\n").await?;
        self.flush().await
    }

    /// Execute a single command line.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub async fn execute(&mut self, line: &str) -> Result<(), ShellError> {
        let Some(CommandLine { cmd, args }) = CommandLine::parse(line) else {
            return Ok(());
        };
        trace!(cmd, ?args, "execute");

        match cmd.parse::<Builtin>() {
            Ok(Builtin::Exit) => {
                self.running = false;
                Ok(())
            }
            Ok(Builtin::Pwd) => {
                let out = format!("{}\n", self.cwd);
                self.write(&out).await
            }
            Ok(Builtin::Cd) => self.cd(&args).await,
            Ok(Builtin::Ls) => self.ls(&args).await,
            Ok(Builtin::Cat) => self.cat(&args).await,
            Ok(Builtin::Echo) => {
                let out = format!("{}\n", args.join(" "));
                self.write(&out).await
            }
            Ok(Builtin::Date) => {
                let out = format!("{}\n", Local::now().format("%a %b %e %H:%M:%S %Z %Y"));
                self.write(&out).await
            }
            Ok(Builtin::Who) => {
                let out = format!("{:<8} tty0    Jun 10 00:00\n", self.config.user);
                self.write(&out).await
            }
            Ok(Builtin::Uname) => {
                let out = format!("{}\n", self.config.system_name);
                self.write(&out).await
            }
            Ok(Builtin::Help) => {
                let out = self.help_text();
                self.write(&out).await
            }
            Ok(Builtin::Clear) => self.write("\x1b[2J\x1b[H").await,
            Err(()) => self.exec_program(cmd).await,
        }
    }

    async fn cd(&mut self, args: &[&str]) -> Result<(), ShellError> {
        let target = args
            .first()
            .map_or_else(|| self.config.home.clone(), |s| (*s).to_owned());
        let resolved = resolve_path(&target, &self.cwd);

        let failure = match self.fs.namei(&resolved) {
            None => Some("not found"),
            Some(inode) if !inode.is_directory() => Some("not a directory"),
            Some(_) => None,
        };
        if let Some(reason) = failure {
            return self.write(&format!("cd: {target}: {reason}\n")).await;
        }

        self.cwd = normalize_path(&resolved);
        debug!(cwd = %self.cwd, "changed directory");
        Ok(())
    }

    async fn ls(&mut self, args: &[&str]) -> Result<(), ShellError> {
        let (flags, operand) = LsFlags::parse(args);
        let shown = operand.map_or_else(|| self.cwd.clone(), str::to_owned);
        let resolved = resolve_path(&shown, &self.cwd);

        let fs = Arc::clone(&self.fs);
        let Some(entries) = fs.readdir(&resolved) else {
            return self.write(&format!("ls: {shown}: not found\n")).await;
        };

        let mut out = String::new();
        for entry in entries {
            if !flags.all && (entry.name == "." || entry.name == "..") {
                continue;
            }
            if flags.long {
                out.push_str(&long_listing(entry.name, entry.inode));
            } else {
                out.push_str(entry.name);
                out.push('\n');
            }
        }
        self.write(&out).await
    }

    async fn cat(&mut self, args: &[&str]) -> Result<(), ShellError> {
        if args.is_empty() {
            return self.write("cat: missing file operand\n").await;
        }

        for path in args {
            let resolved = resolve_path(path, &self.cwd);
            match self.fs.read(&resolved) {
                None => {
                    self.write(&format!("cat: {path}: not found or is directory\n"))
                        .await?;
                }
                Some(content) => {
                    self.writer.write_all(&content).await?;
                    if !content.ends_with(b"\n") {
                        self.write("\n").await?;
                    }
                }
            }
        }
        Ok(())
    }

    async fn exec_program(&mut self, cmd: &str) -> Result<(), ShellError> {
        let runnable = self.find_program(cmd).is_some_and(INode::is_executable);
        let out = if runnable {
            format!("{cmd}: execution not supported\n")
        } else {
            format!("{cmd}: not found\n")
        };
        self.write(&out).await
    }

    /// Locate `cmd` on disk. Names containing a `/` are resolved against the
    /// working directory; bare names are searched for along the path and
    /// only executables match.
    fn find_program(&self, cmd: &str) -> Option<&INode> {
        if cmd.contains('/') {
            return self.fs.namei(&resolve_path(cmd, &self.cwd));
        }
        self.config.path.split(':').find_map(|dir| {
            let base = if dir.is_empty() { self.cwd.as_str() } else { dir };
            self.fs
                .namei(&resolve_path(cmd, base))
                .filter(|inode| inode.is_executable())
        })
    }

    fn help_text(&self) -> String {
        let mut out = String::from(HELP_COMMANDS);
        out.push_str("\nGames (in /usr/games):\n");
        for (name, _, title) in GAMES {
            let size = self
                .fs
                .namei(&format!("/usr/games/{name}"))
                .map_or(0, |inode| inode.size);
            out.push_str(&format!("  {name:<14}- {title} ({size} bytes)\n"));
        }
        out.push_str("\nThe games are installed but cannot be run here.\n");
        out
    }

    async fn write(&mut self, s: &str) -> Result<(), ShellError> {
        self.writer.write_all(s.as_bytes()).await?;
        Ok(())
    }
}
