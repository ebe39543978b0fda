//! Terminal output for ztime.
//!
//! Everything here writes to stderr; stdout belongs to the timed command.
//!
//! - [`messages`] - Error messages
//! - [`report`] - The timing report printed after the command finishes

pub mod messages;
pub mod report;

/// ANSI color codes for terminal output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RED: &str = "\x1b[31m";
}

pub use colors::*;

pub use messages::{format_error, print_error};
pub use report::{print_report, report_text};
