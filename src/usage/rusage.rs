//! `wait4(2)` based accounting.

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, ExitStatus};
use std::time::Duration;

use tracing::trace;

use super::UsageProvider;
use crate::metrics::{ProcessUsage, ResourceCounters};

/// Reaps the child with `wait4` and copies its `rusage` into [`ProcessUsage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RusageProvider;

impl UsageProvider for RusageProvider {
    fn collect(&self, child: Child) -> io::Result<(ExitStatus, ProcessUsage)> {
        let pid = child.id() as libc::pid_t;
        let (status, usage) = wait4(pid)?;
        trace!(pid, status, "child reaped");

        // `child` was reaped behind std's back; dropping it does not wait again.
        drop(child);

        Ok((ExitStatus::from_raw(status), process_usage(&usage)))
    }
}

fn wait4(pid: libc::pid_t) -> io::Result<(libc::c_int, libc::rusage)> {
    let mut status: libc::c_int = 0;
    // SAFETY: rusage is plain old data; all-zero is a valid value.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };

    loop {
        // SAFETY: both out-pointers reference live, properly sized locals.
        let ret = unsafe { libc::wait4(pid, &mut status, 0, &mut usage) };
        if ret == pid {
            return Ok((status, usage));
        }

        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

fn process_usage(usage: &libc::rusage) -> ProcessUsage {
    ProcessUsage {
        user_time: timeval_to_duration(&usage.ru_utime),
        system_time: timeval_to_duration(&usage.ru_stime),
        counters: ResourceCounters {
            max_rss: i64::from(usage.ru_maxrss),
            shared_rss: i64::from(usage.ru_ixrss),
            unshared_rss: 0,
            unshared_data: i64::from(usage.ru_idrss),
            unshared_stk: i64::from(usage.ru_isrss),
            page_faults: i64::from(usage.ru_majflt),
            page_reclaims: i64::from(usage.ru_minflt),
            swaps: i64::from(usage.ru_nswap),
            block_input: i64::from(usage.ru_inblock),
            block_output: i64::from(usage.ru_oublock),
            msgs_sent: i64::from(usage.ru_msgsnd),
            msgs_recv: i64::from(usage.ru_msgrcv),
            signals: i64::from(usage.ru_nsignals),
            v_ctx_switches: i64::from(usage.ru_nvcsw),
            i_ctx_switches: i64::from(usage.ru_nivcsw),
        },
    }
}

fn timeval_to_duration(tv: &libc::timeval) -> Duration {
    let secs = u64::try_from(tv.tv_sec).unwrap_or(0);
    let micros = u64::try_from(tv.tv_usec).unwrap_or(0);
    Duration::from_secs(secs) + Duration::from_micros(micros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};

    #[test]
    fn test_timeval_to_duration() {
        let tv = libc::timeval {
            tv_sec: 2,
            tv_usec: 250_000,
        };
        assert_eq!(timeval_to_duration(&tv), Duration::from_millis(2250));
    }

    #[test]
    fn test_negative_timeval_clamps_to_zero() {
        let tv = libc::timeval {
            tv_sec: -1,
            tv_usec: -5,
        };
        assert_eq!(timeval_to_duration(&tv), Duration::ZERO);
    }

    #[test]
    fn test_rusage_provider_reaps_child_and_reports_exit_code() {
        let child = Command::new("sh")
            .args(["-c", "exit 7"])
            .stdout(Stdio::null())
            .spawn()
            .unwrap();

        let (status, _usage) = RusageProvider.collect(child).unwrap();

        assert_eq!(status.code(), Some(7));
    }

    #[test]
    fn test_rusage_provider_reports_memory() {
        let child = Command::new("sh")
            .args(["-c", "i=0; while [ $i -lt 2000 ]; do i=$((i+1)); done"])
            .spawn()
            .unwrap();

        let (status, usage) = RusageProvider.collect(child).unwrap();

        assert!(status.success());
        assert!(usage.counters.max_rss > 0);
        assert!(usage.counters.page_reclaims > 0);
    }
}
