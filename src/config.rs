//! Report configuration.
//!
//! The configuration is resolved once at startup from command-line flags and
//! the environment and then passed explicitly to the report step. Nothing
//! downstream reads the environment.
//!
//! Precedence for the template, highest first:
//! 1. `--format` on the command line
//! 2. the `TIMEFMT` environment variable
//! 3. [`DEFAULT_TEMPLATE`]
//!
//! Empty values at any level fall through to the next one, the same way zsh
//! treats an empty `TIMEFMT`.

use std::env;

/// Environment variable holding the report template.
pub const TEMPLATE_ENV_VAR: &str = "TIMEFMT";

/// zsh's default `TIMEFMT`.
pub const DEFAULT_TEMPLATE: &str = "%J  %U user %S system %P cpu %*E total";

/// How the report is emitted after the command finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One line rendered from the template.
    #[default]
    Template,
    /// Pretty-printed JSON of every metric.
    Json,
    /// No report at all.
    Quiet,
}

impl OutputMode {
    /// Picks the mode from the CLI flags. `--quiet` wins over `--json`.
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputMode::Quiet
        } else if json {
            OutputMode::Json
        } else {
            OutputMode::Template
        }
    }
}

/// Resolved settings for one ztime invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Template used in [`OutputMode::Template`].
    pub template: String,
    pub output: OutputMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            output: OutputMode::Template,
        }
    }
}

impl Config {
    /// Builds the configuration from CLI values and the process environment.
    pub fn from_env(format: Option<String>, output: OutputMode) -> Self {
        Self::resolve(format, env::var(TEMPLATE_ENV_VAR).ok(), output)
    }

    /// Builds the configuration from explicit values.
    pub fn resolve(
        format: Option<String>,
        env_template: Option<String>,
        output: OutputMode,
    ) -> Self {
        let template = [format, env_template]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());

        Self { template, output }
    }
}
