//! Terminal capability checks.

use std::io::IsTerminal;

fn env_flag(name: &str) -> bool {
    std::env::var_os(name).is_some_and(|v| !v.is_empty())
}

/// Whether output to `stream` should carry ANSI colour codes.
///
/// `FORCE_COLOR` always enables colour; `NO_COLOR` disables it on a terminal.
pub fn should_use_color<T: IsTerminal>(stream: &T) -> bool {
    env_flag("FORCE_COLOR") || (stream.is_terminal() && !env_flag("NO_COLOR"))
}

/// Whether a person is at the keyboard: both stdin and stdout are terminals.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}
