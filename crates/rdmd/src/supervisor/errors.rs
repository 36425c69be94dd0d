//! Error types for supervised process operations.

use std::io;
use std::process::ExitStatus;

use nix::errno::Errno;
use thiserror::Error;

/// Errors surfaced while running or controlling supervised processes.
///
/// The display form is sent to clients verbatim after an `error: ` prefix, so
/// messages name the program or PID involved.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The executable could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Waiting on a running child failed.
    #[error("failed to wait for process {pid}: {source}")]
    Wait {
        /// PID being waited on.
        pid: u32,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Reading the child's output failed.
    #[error("failed to read output of process {pid}: {source}")]
    Output {
        /// PID whose output could not be read.
        pid: u32,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The child ran but reported failure.
    #[error("{program} exited with {status}")]
    ExitStatus {
        /// Program that failed.
        program: String,
        /// Exit status reported by the OS.
        status: ExitStatus,
    },
    /// The foreground deadline elapsed and the child was killed.
    #[error("{program} timed out after {seconds}s")]
    TimedOut {
        /// Program that overran.
        program: String,
        /// Deadline that elapsed, in whole seconds.
        seconds: u64,
    },
    /// The PID is not tracked by this supervisor.
    #[error("no such process: {pid}")]
    NoSuchProcess {
        /// PID that was requested.
        pid: u32,
    },
    /// Delivering the kill signal failed.
    #[error("failed to kill process {pid}: {source}")]
    Signal {
        /// PID that could not be signalled.
        pid: u32,
        /// Underlying OS error.
        #[source]
        source: Errno,
    },
}
