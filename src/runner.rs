//! Runs one command and measures it.
//!
//! The [`Runner`] owns the whole lifetime of the child:
//! subscribe to relayed signals, spawn with inherited stdio, forward signals
//! while the child runs, observe termination, stop the relay, then hand the
//! child to a [`UsageProvider`] to be reaped and accounted.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Instant;

use tokio::task;
use tracing::debug;

use crate::error::{Result, ZtimeError};
use crate::metrics::Metrics;
use crate::signal::SignalSubscription;
use crate::usage::{PlatformProvider, UsageProvider};

/// How the child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Exited normally with this code.
    Exited(i32),
    /// Killed by this signal number.
    Signaled(i32),
}

impl Disposition {
    pub fn from_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Disposition::Signaled(signal);
            }
        }

        Disposition::Exited(status.code().unwrap_or(1))
    }

    /// The exit code ztime should report: the child's own code, or
    /// `128 + signal` when the child was killed.
    pub fn exit_code(self) -> i32 {
        match self {
            Disposition::Exited(code) => code,
            Disposition::Signaled(signal) => 128 + signal,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub metrics: Metrics,
    pub disposition: Disposition,
}

/// Launches commands and collects their metrics.
#[derive(Debug, Clone, Default)]
pub struct Runner<P = PlatformProvider> {
    provider: P,
}

impl Runner {
    /// Creates a runner using the platform's usage provider.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: UsageProvider> Runner<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    /// Runs `argv[0]` with `argv[1..]` and waits for it to terminate.
    ///
    /// Must be called from within a tokio runtime. The child's stdio is the
    /// caller's stdio. Relayed signals received by this process are forwarded
    /// to the child until it terminates.
    ///
    /// # Errors
    ///
    /// - [`ZtimeError::EmptyCommand`] if `argv` is empty
    /// - [`ZtimeError::Launch`] if the program could not be started
    /// - [`ZtimeError::SignalSetup`] or [`ZtimeError::Wait`] on OS failures
    ///
    /// A non-zero exit or death by signal is not an error; it is reported in
    /// [`RunOutcome::disposition`].
    pub async fn run(&self, argv: &[String]) -> Result<RunOutcome> {
        let (program, args) = argv.split_first().ok_or(ZtimeError::EmptyCommand)?;
        let command_line = argv.join(" ");

        let subscription = SignalSubscription::new().map_err(ZtimeError::SignalSetup)?;

        let start = Instant::now();
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ZtimeError::Launch {
                program: program.clone(),
                source,
            })?;

        let pid = child.id();
        debug!(pid, command = %command_line, "child started");

        let relay = subscription.relay_to(pid);
        let exited = task::spawn_blocking(move || wait_for_exit(child)).await;
        let end = Instant::now();
        relay.stop().await;

        let child = exited?.map_err(ZtimeError::Wait)?;
        let provider = self.provider.clone();
        let (status, usage) = task::spawn_blocking(move || provider.collect(child))
            .await?
            .map_err(ZtimeError::Wait)?;

        let metrics = Metrics::new(command_line, end.duration_since(start), usage);
        let disposition = Disposition::from_status(status);
        debug!(?disposition, elapsed = ?metrics.elapsed_time(), "child finished");

        Ok(RunOutcome {
            metrics,
            disposition,
        })
    }
}

/// Blocks until the child has terminated, leaving it unreaped so its pid
/// stays reserved until the relay has stopped.
#[cfg(unix)]
fn wait_for_exit(child: Child) -> io::Result<Child> {
    let pid = child.id() as libc::id_t;
    // SAFETY: siginfo_t is plain old data; all-zero is a valid value.
    let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };

    loop {
        // SAFETY: `info` is a live, properly sized out-parameter.
        let ret = unsafe {
            libc::waitid(
                libc::P_PID,
                pid,
                &mut info,
                libc::WEXITED | libc::WNOWAIT,
            )
        };
        if ret == 0 {
            return Ok(child);
        }

        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
fn wait_for_exit(mut child: Child) -> io::Result<Child> {
    child.wait()?;
    Ok(child)
}
