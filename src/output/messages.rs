//! Error message output.

use std::io::{self, IsTerminal};

use super::colors::*;

/// Formats an error message with the `ztime:` prefix.
///
/// The prefix is colored only when `color` is set; redirected stderr gets a
/// plain `ztime: <message>` line.
pub fn format_error(msg: &str, color: bool) -> String {
    if color {
        format!("{RED}{BOLD}ztime:{RESET} {}", msg)
    } else {
        format!("ztime: {}", msg)
    }
}

/// Print an error message to stderr, colored when stderr is a terminal.
pub fn print_error(msg: &str) {
    let stderr = io::stderr();
    let color = stderr.is_terminal();
    eprintln!("{}", format_error(msg, color));
}
