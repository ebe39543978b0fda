//! Test utilities shared across modules.
//!
//! This module provides common fixtures and the synchronization primitive for
//! tests that deliver signals inside the test process.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::metrics::{Metrics, ProcessUsage, ResourceCounters};

/// Mutex to serialize tests that run a signal relay or signal the test process.
///
/// Signal subscriptions are process-wide, so a signal raised by one test is
/// seen by every relay that is alive at the same time. Tests that either:
/// - Start a relay bound to a real child (directly or through the runner)
/// - Send a relayed signal to the test process
///
/// must hold this lock for their whole duration.
pub static SIGNAL_MUTEX: Mutex<()> = Mutex::new(());

/// Acquires [`SIGNAL_MUTEX`], ignoring poisoning left by a failed test.
pub fn lock_signals() -> MutexGuard<'static, ()> {
    SIGNAL_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

/// Metrics for `sleep 1` with every counter populated.
pub fn sample_metrics() -> Metrics {
    let usage = ProcessUsage {
        user_time: Duration::from_millis(500),
        system_time: Duration::from_millis(250),
        counters: sample_counters(),
    };
    Metrics::new("sleep 1", Duration::from_millis(2500), usage)
}

/// Metrics carrying only an elapsed time.
pub fn elapsed_metrics(elapsed: Duration) -> Metrics {
    Metrics::new("", elapsed, ProcessUsage::default())
}

pub fn sample_counters() -> ResourceCounters {
    ResourceCounters {
        max_rss: 1024,
        shared_rss: 512,
        unshared_rss: 0,
        unshared_data: 256,
        unshared_stk: 128,
        page_faults: 10,
        page_reclaims: 20,
        swaps: 5,
        block_input: 100,
        block_output: 200,
        msgs_sent: 60,
        msgs_recv: 50,
        signals: 2,
        v_ctx_switches: 15,
        i_ctx_switches: 25,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_mutex_can_be_acquired_multiple_times_sequentially() {
        {
            let _lock = lock_signals();
        }
        {
            let _lock = lock_signals();
        }
    }

    #[test]
    fn test_sample_metrics_is_consistent() {
        let metrics = sample_metrics();
        assert_eq!(metrics.cpu_percent(), 30);
        assert_eq!(metrics.counters().max_rss, 1024);
    }
}
