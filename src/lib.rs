pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod output;
pub mod runner;
pub mod signal;
pub mod usage;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{Config, OutputMode, DEFAULT_TEMPLATE, TEMPLATE_ENV_VAR};
pub use error::{Result, ZtimeError};
pub use format::render;
pub use metrics::{Metrics, ProcessUsage, ResourceCounters};
pub use runner::{Disposition, RunOutcome, Runner};
pub use usage::{NullProvider, PlatformProvider, UsageProvider};
