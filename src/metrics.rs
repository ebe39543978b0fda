//! Timing and resource usage of a finished command.
//!
//! A [`Metrics`] value is built exactly once, after the child has been reaped,
//! and is read-only afterwards. `cpu_percent` is always derived from the
//! durations it is built from.

use std::time::Duration;

use serde::{Serialize, Serializer};

/// Resource counters reported by the OS for a reaped child.
///
/// Every field is copied verbatim from the platform's accounting and is zero
/// when the platform keeps none. Units follow the OS (`max_rss` is KiB on
/// Linux and bytes on macOS).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceCounters {
    /// Maximum resident set size.
    pub max_rss: i64,
    /// Integral shared memory size.
    pub shared_rss: i64,
    /// Unshared resident set size. No Unix rusage field feeds this one.
    pub unshared_rss: i64,
    /// Integral unshared data size.
    pub unshared_data: i64,
    /// Integral unshared stack size.
    pub unshared_stk: i64,
    /// Major page faults.
    pub page_faults: i64,
    /// Minor page faults (page reclaims).
    pub page_reclaims: i64,
    pub swaps: i64,
    pub block_input: i64,
    pub block_output: i64,
    pub msgs_sent: i64,
    pub msgs_recv: i64,
    pub signals: i64,
    pub v_ctx_switches: i64,
    pub i_ctx_switches: i64,
}

impl ResourceCounters {
    /// Unshared data plus unshared stack.
    pub fn unshared_total(&self) -> i64 {
        self.unshared_data + self.unshared_stk
    }

    /// Shared memory plus unshared data and stack.
    pub fn memory_total(&self) -> i64 {
        self.shared_rss + self.unshared_total()
    }
}

/// Raw accounting gathered by a [`UsageProvider`](crate::usage::UsageProvider).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessUsage {
    pub user_time: Duration,
    pub system_time: Duration,
    pub counters: ResourceCounters,
}

/// Everything ztime knows about one run of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metrics {
    command: String,
    #[serde(serialize_with = "serialize_nanos")]
    user_time: Duration,
    #[serde(serialize_with = "serialize_nanos")]
    system_time: Duration,
    #[serde(serialize_with = "serialize_nanos")]
    elapsed_time: Duration,
    cpu_percent: u64,
    #[serde(flatten)]
    counters: ResourceCounters,
}

impl Metrics {
    /// Combines the command line, wall-clock time and raw usage into metrics.
    pub fn new(command: impl Into<String>, elapsed: Duration, usage: ProcessUsage) -> Self {
        Self {
            command: command.into(),
            user_time: usage.user_time,
            system_time: usage.system_time,
            elapsed_time: elapsed,
            cpu_percent: cpu_percent(usage.user_time, usage.system_time, elapsed),
            counters: usage.counters,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn user_time(&self) -> Duration {
        self.user_time
    }

    pub fn system_time(&self) -> Duration {
        self.system_time
    }

    pub fn elapsed_time(&self) -> Duration {
        self.elapsed_time
    }

    pub fn cpu_percent(&self) -> u64 {
        self.cpu_percent
    }

    pub fn counters(&self) -> &ResourceCounters {
        &self.counters
    }
}

/// Percentage of wall-clock time spent on CPU, truncated toward zero.
///
/// Exceeds 100 when the command keeps several cores busy. Returns 0 when no
/// wall-clock time elapsed.
pub fn cpu_percent(user: Duration, system: Duration, elapsed: Duration) -> u64 {
    let elapsed_nanos = elapsed.as_nanos();
    if elapsed_nanos == 0 {
        return 0;
    }

    let cpu_nanos = user.as_nanos() + system.as_nanos();
    u64::try_from(cpu_nanos * 100 / elapsed_nanos).unwrap_or(u64::MAX)
}

fn serialize_nanos<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}
