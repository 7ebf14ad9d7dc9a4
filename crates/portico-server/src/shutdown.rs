//! Shutdown signalling and connection draining.
//!
//! A [`ShutdownSignal`] tells the accept loop to stop; a
//! [`ConnectionTracker`] counts in-flight connections so draining can wait
//! for them. The signal is clonable and can be triggered from anywhere,
//! including tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tracing::info;

/// A clonable shutdown trigger.
///
/// Triggering is idempotent and permanent: once a signal fires it stays
/// fired, and every clone observes it.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates a signal that fires only when [`trigger`](Self::trigger) is
    /// called.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Creates a signal wired to SIGTERM and SIGINT.
    ///
    /// The listening task is spawned onto the current runtime. The signal can
    /// still be triggered manually.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            let terminated = wait_for_os_signal().await;
            info!(signal = terminated, "shutdown requested");
            trigger.trigger();
        });
        signal
    }

    /// Fires the signal.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true if the signal has fired.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves when the signal fires; immediately if it already has.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // wait_for inspects the current value first, so a signal triggered
        // before wait() is not missed.
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => {
            // Signal handler installation failing leaves only ctrl-c.
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };
    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = tokio::signal::ctrl_c() => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "ctrl-c"
}

/// Counts in-flight connections for draining.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    active: AtomicUsize,
    drained: Notify,
}

impl ConnectionTracker {
    /// Creates a tracker with no active connections.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a connection; the returned token releases it on drop.
    #[must_use]
    pub fn acquire(self: &Arc<Self>) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            tracker: Arc::clone(self),
        }
    }

    /// Number of connections currently in flight.
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Waits until every connection has finished, up to `timeout`.
    ///
    /// Returns true if the tracker drained fully, false on timeout.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.active() == 0 {
                return true;
            }
            let notified = self.drained.notified();
            if self.active() == 0 {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.active() == 0;
            }
        }
    }

    fn release(&self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }
}

/// Keeps one connection counted until dropped.
#[derive(Debug)]
pub struct ConnectionToken {
    tracker: Arc<ConnectionTracker>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        self.tracker.release();
    }
}
