//! Shutdown signalling: a shared trigger woken by `stop` or OS signals.

use std::fmt;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::info;

use super::LIFECYCLE_TARGET;

/// Why the server is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A client sent the `stop` command.
    StopCommand,
    /// The process received a termination signal.
    Signal(i32),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StopCommand => f.write_str("stop command"),
            Self::Signal(signal) => write!(f, "signal {signal}"),
        }
    }
}

/// Shared cancellation flag observed by the server runtime.
///
/// Clones refer to the same flag. Only the first trigger records its reason.
#[derive(Debug, Clone, Default)]
pub struct ShutdownTrigger {
    inner: Arc<(Mutex<Option<ShutdownReason>>, Condvar)>,
}

impl ShutdownTrigger {
    /// Creates an untriggered flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown and wakes every waiter.
    pub fn trigger(&self, reason: ShutdownReason) {
        let (state, condvar) = &*self.inner;
        let mut guard = lock(state);
        if guard.is_none() {
            *guard = Some(reason);
        }
        condvar.notify_all();
    }

    /// Returns the recorded reason once shutdown has been requested.
    #[must_use]
    pub fn reason(&self) -> Option<ShutdownReason> {
        *lock(&self.inner.0)
    }

    /// Blocks until shutdown is requested.
    #[must_use]
    pub fn wait(&self) -> ShutdownReason {
        let (state, condvar) = &*self.inner;
        let mut guard = lock(state);
        loop {
            if let Some(reason) = *guard {
                return reason;
            }
            guard = condvar.wait(guard).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

fn lock(state: &Mutex<Option<ShutdownReason>>) -> MutexGuard<'_, Option<ShutdownReason>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Abstraction over OS-level shutdown notification.
pub trait ShutdownSignal: Send + Sync {
    /// Starts forwarding shutdown notifications into `trigger`.
    ///
    /// # Errors
    ///
    /// Returns an error when the notification source cannot be installed.
    fn watch(&self, trigger: ShutdownTrigger) -> Result<SignalWatch, ShutdownError>;
}

/// Running signal watcher; [`stop`](Self::stop) detaches it.
#[derive(Debug, Default)]
pub struct SignalWatch {
    handle: Option<Handle>,
    thread: Option<JoinHandle<()>>,
}

impl SignalWatch {
    /// A watcher that never fires.
    #[must_use]
    pub fn inert() -> Self {
        Self::default()
    }

    /// Stops watching and joins the watcher thread.
    pub fn stop(mut self) {
        self.close();
        if let Some(thread) = self.thread.take() {
            drop(thread.join());
        }
    }

    fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
    }
}

impl Drop for SignalWatch {
    fn drop(&mut self) {
        self.close();
    }
}

/// Watches for `SIGTERM`, `SIGINT`, `SIGQUIT`, and `SIGHUP`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn watch(&self, trigger: ShutdownTrigger) -> Result<SignalWatch, ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        let thread = thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                info!(target: LIFECYCLE_TARGET, signal, "shutdown signal received");
                trigger.trigger(ShutdownReason::Signal(signal));
            }
        });
        Ok(SignalWatch {
            handle: Some(handle),
            thread: Some(thread),
        })
    }
}

/// Signal source that never fires, for embedding the server in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShutdownSignal;

impl ShutdownSignal for NoShutdownSignal {
    fn watch(&self, _trigger: ShutdownTrigger) -> Result<SignalWatch, ShutdownError> {
        Ok(SignalWatch::inert())
    }
}
