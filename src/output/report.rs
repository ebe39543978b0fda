//! The timing report printed after the command finishes.

use std::io::{self, Write};

use crate::config::{Config, OutputMode};
use crate::error::Result;
use crate::format::render;
use crate::metrics::Metrics;

/// Builds the report text for `metrics`, or `None` in quiet mode.
pub fn report_text(metrics: &Metrics, config: &Config) -> Result<Option<String>> {
    let text = match config.output {
        OutputMode::Quiet => return Ok(None),
        OutputMode::Json => serde_json::to_string_pretty(metrics)?,
        OutputMode::Template => render(&config.template, metrics),
    };
    Ok(Some(text))
}

/// Writes the report to stderr.
pub fn print_report(metrics: &Metrics, config: &Config) -> Result<()> {
    if let Some(text) = report_text(metrics, config)? {
        let mut stderr = io::stderr().lock();
        // Nothing useful can be done if stderr is gone.
        let _ = writeln!(stderr, "{text}");
    }
    Ok(())
}
