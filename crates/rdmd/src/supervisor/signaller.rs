//! Signal delivery for supervised processes.

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Delivers termination signals to OS processes.
pub trait ProcessSignaller: Send + Sync {
    /// Forcibly terminates the process identified by `pid`.
    ///
    /// # Errors
    ///
    /// Returns the OS error reported by signal delivery.
    fn kill(&self, pid: u32) -> Result<(), Errno>;
}

/// Signaller backed by `kill(2)` with `SIGKILL`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NixSignaller;

impl ProcessSignaller for NixSignaller {
    fn kill(&self, pid: u32) -> Result<(), Errno> {
        // PIDs above i32::MAX cannot name a real process.
        let raw = i32::try_from(pid).map_err(|_| Errno::ESRCH)?;
        signal::kill(Pid::from_raw(raw), Signal::SIGKILL)
    }
}
