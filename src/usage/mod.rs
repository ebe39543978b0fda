//! Resource accounting for reaped child processes.
//!
//! Providers own the final reap of the child so the accounting the kernel
//! attaches to that reap is not lost. Which provider is used is decided at
//! compile time through [`PlatformProvider`]:
//!
//! - [`RusageProvider`] on Unix, backed by `wait4(2)`
//! - [`NullProvider`] everywhere else, reporting zeros

mod null;
#[cfg(unix)]
mod rusage;

use std::io;
use std::process::{Child, ExitStatus};

use crate::metrics::ProcessUsage;

pub use null::NullProvider;
#[cfg(unix)]
pub use rusage::RusageProvider;

/// Reaps a terminated child and reports what the platform accounted for it.
pub trait UsageProvider: Clone + Send + 'static {
    /// Waits for `child` to be reaped and returns its exit status with usage.
    ///
    /// Platforms without accounting return [`ProcessUsage::default`] rather
    /// than an error.
    fn collect(&self, child: Child) -> io::Result<(ExitStatus, ProcessUsage)>;
}

/// The provider for the platform ztime was built for.
#[cfg(unix)]
pub type PlatformProvider = RusageProvider;

/// The provider for the platform ztime was built for.
#[cfg(not(unix))]
pub type PlatformProvider = NullProvider;
