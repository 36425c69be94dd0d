//! Opening URLs and files with the desktop's default handler.

use std::process::{Command, Stdio};

use tracing::debug;

use super::{CAPABILITY_TARGET, CapabilityError};

/// Opens a target (usually a URL) on the host.
pub trait Opener: Send + Sync {
    /// Hands `target` to the platform's default handler.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform helper fails.
    fn open(&self, target: &str) -> Result<(), CapabilityError>;
}

#[cfg(target_os = "macos")]
const OPEN_PROGRAM: Option<&str> = Some("open");
#[cfg(all(unix, not(target_os = "macos")))]
const OPEN_PROGRAM: Option<&str> = Some("xdg-open");
#[cfg(not(unix))]
const OPEN_PROGRAM: Option<&str> = None;

/// Opener backed by `open` on macOS and `xdg-open` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, target: &str) -> Result<(), CapabilityError> {
        let program = OPEN_PROGRAM.ok_or(CapabilityError::Unsupported {
            capability: "open",
        })?;
        debug!(target: CAPABILITY_TARGET, program, target, "opening target");
        let status = Command::new(program)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| CapabilityError::Spawn { program, source })?;
        if status.success() {
            Ok(())
        } else {
            Err(CapabilityError::Failed { program, status })
        }
    }
}

/// Opener that records each target instead of launching anything.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingOpener {
    opened: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingOpener {
    pub(crate) fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("opener mutex poisoned").clone()
    }
}

#[cfg(test)]
impl Opener for RecordingOpener {
    fn open(&self, target: &str) -> Result<(), CapabilityError> {
        self.opened
            .lock()
            .expect("opener mutex poisoned")
            .push(target.to_owned());
        Ok(())
    }
}
