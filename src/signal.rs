//! Signal relay from ztime to the command it is timing.
//!
//! ztime subscribes to every signal in [`RELAYED_SIGNALS`] before the child
//! is spawned, then forwards every receipt to the child until the child
//! terminates. Anything outside that set (notably `SIGCHLD`) is left alone.
//!
//! The relay runs as a single tokio task paired with a oneshot stop channel.
//! [`SignalRelay::stop`] ends it explicitly; dropping a [`SignalRelay`] aborts
//! the task, so no forwarding can outlive the run on any path.

use std::io;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

#[cfg(unix)]
use std::task::Poll;
#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Signals forwarded to the child, by raw number.
#[cfg(unix)]
pub const RELAYED_SIGNALS: [libc::c_int; 6] = [
    libc::SIGHUP,
    libc::SIGINT,
    libc::SIGQUIT,
    libc::SIGTERM,
    libc::SIGUSR1,
    libc::SIGUSR2,
];

/// Active subscription to the relayed signals, not yet bound to a child.
///
/// Signals delivered while this is held are queued by tokio and forwarded as
/// soon as [`SignalSubscription::relay_to`] starts the relay. Dropping it
/// without relaying just unsubscribes.
pub struct SignalSubscription {
    #[cfg(unix)]
    streams: Vec<(libc::c_int, Signal)>,
}

impl SignalSubscription {
    /// Subscribes to every relayed signal.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if a signal handler cannot be registered.
    #[cfg(unix)]
    pub fn new() -> io::Result<Self> {
        let streams = RELAYED_SIGNALS
            .iter()
            .map(|&signum| Ok((signum, signal(SignalKind::from_raw(signum))?)))
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Self { streams })
    }

    /// Platforms without POSIX signals have nothing to relay.
    #[cfg(not(unix))]
    pub fn new() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Starts forwarding received signals to the process `pid`.
    #[cfg(unix)]
    pub fn relay_to(self, pid: u32) -> SignalRelay {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(relay_loop(self.streams, pid, stop_rx));
        debug!(pid, "signal relay started");

        SignalRelay {
            stop: Some(stop_tx),
            task: Some(task),
        }
    }

    #[cfg(not(unix))]
    pub fn relay_to(self, _pid: u32) -> SignalRelay {
        SignalRelay {
            stop: None,
            task: None,
        }
    }
}

/// Handle to the running relay task.
pub struct SignalRelay {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<usize>>,
}

impl SignalRelay {
    /// Stops forwarding and waits for the relay task to finish.
    ///
    /// Returns how many signals were forwarded. Signals still pending when
    /// the stop arrives are discarded.
    pub async fn stop(mut self) -> usize {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }

        let forwarded = match self.task.take() {
            Some(task) => task.await.unwrap_or(0),
            None => 0,
        };
        debug!(forwarded, "signal relay stopped");
        forwarded
    }
}

impl Drop for SignalRelay {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(unix)]
async fn relay_loop(
    mut streams: Vec<(libc::c_int, Signal)>,
    pid: u32,
    mut stop: oneshot::Receiver<()>,
) -> usize {
    let mut forwarded = 0;

    loop {
        let signum = tokio::select! {
            biased;
            _ = &mut stop => break,
            signum = next_signal(&mut streams) => signum,
        };

        forward(pid, signum);
        forwarded += 1;
    }

    // Streams drop here, releasing the subscriptions before the caller resumes.
    forwarded
}

/// Resolves with the next signal received on any of `streams`.
#[cfg(unix)]
async fn next_signal(streams: &mut [(libc::c_int, Signal)]) -> libc::c_int {
    std::future::poll_fn(|cx| {
        for (signum, stream) in streams.iter_mut() {
            if let Poll::Ready(Some(())) = stream.poll_recv(cx) {
                return Poll::Ready(*signum);
            }
        }
        Poll::Pending
    })
    .await
}

/// Delivers `signum` to `pid` once. Failures are logged and otherwise ignored.
#[cfg(unix)]
fn forward(pid: u32, signum: libc::c_int) {
    // SAFETY: kill(2) has no memory-safety preconditions.
    let ret = unsafe { libc::kill(pid as libc::pid_t, signum) };
    if ret == 0 {
        debug!(pid, signum, "forwarded signal to child");
    } else {
        debug!(
            pid,
            signum,
            error = %io::Error::last_os_error(),
            "failed to forward signal to child"
        );
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_utils::lock_signals;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{Command, Stdio};
    use std::time::Duration;

    fn raise(signum: libc::c_int) {
        // SAFETY: kill(2) has no memory-safety preconditions; the test process
        // holds a subscription, so the signal does not terminate it.
        unsafe { libc::kill(std::process::id() as libc::pid_t, signum) };
    }

    fn spawn_sleeper() -> std::process::Child {
        Command::new("sleep")
            .arg("5")
            .stdout(Stdio::null())
            .spawn()
            .unwrap()
    }

    #[tokio::test]
    async fn test_subscription_covers_relayed_set_only() {
        let _lock = lock_signals();
        let subscription = SignalSubscription::new().unwrap();
        let subscribed: Vec<_> = subscription.streams.iter().map(|(s, _)| *s).collect();

        assert_eq!(subscribed, RELAYED_SIGNALS);
        assert!(!subscribed.contains(&libc::SIGCHLD));
    }

    #[tokio::test]
    async fn test_stop_tears_down_relay() {
        let _lock = lock_signals();
        let relay = SignalSubscription::new().unwrap().relay_to(u32::MAX >> 1);
        let task = relay.task.as_ref().map(|t| t.abort_handle()).unwrap();

        assert!(!task.is_finished());
        assert_eq!(relay.stop().await, 0);
        assert!(task.is_finished());
    }

    #[tokio::test]
    async fn test_drop_aborts_relay_task() {
        let _lock = lock_signals();
        let relay = SignalSubscription::new().unwrap().relay_to(u32::MAX >> 1);
        let task = relay.task.as_ref().map(|t| t.abort_handle()).unwrap();

        drop(relay);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(task.is_finished());
    }

    #[test]
    fn test_forward_to_missing_process_is_ignored() {
        // pid_max never reaches i32::MAX, so nothing receives this.
        forward(i32::MAX as u32, libc::SIGUSR2);
    }

    #[tokio::test]
    async fn test_every_relayed_signal_reaches_child() {
        let _lock = lock_signals();

        for signum in RELAYED_SIGNALS {
            let subscription = SignalSubscription::new().unwrap();
            let mut child = spawn_sleeper();
            let relay = subscription.relay_to(child.id());

            raise(signum);
            let status = tokio::task::spawn_blocking(move || child.wait())
                .await
                .unwrap()
                .unwrap();
            let forwarded = relay.stop().await;

            assert_eq!(status.signal(), Some(signum), "signal {signum} not relayed");
            assert!(forwarded >= 1);
        }
    }

    #[tokio::test]
    async fn test_pending_signal_is_forwarded_to_child() {
        let _lock = lock_signals();
        let subscription = SignalSubscription::new().unwrap();
        let mut child = spawn_sleeper();

        // Queued before the relay exists; delivered once it starts.
        raise(libc::SIGUSR2);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let relay = subscription.relay_to(child.id());
        let status = tokio::task::spawn_blocking(move || child.wait())
            .await
            .unwrap()
            .unwrap();
        let forwarded = relay.stop().await;

        assert_eq!(status.signal(), Some(libc::SIGUSR2));
        assert!(forwarded >= 1);
    }
}
