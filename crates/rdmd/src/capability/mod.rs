//! Host capabilities reachable from client commands.
//!
//! The clipboard and URL opener are thin wrappers over platform utilities
//! (`xclip`/`xdg-open` on Linux, `pbcopy`/`pbpaste`/`open` on macOS). They sit
//! behind traits so the dispatcher can be exercised without a desktop session.

mod clipboard;
mod open;

use std::io;
use std::process::ExitStatus;
use std::sync::Arc;

use thiserror::Error;

pub use self::clipboard::{Clipboard, CommandClipboard};
pub use self::open::{Opener, SystemOpener};

#[cfg(test)]
pub(crate) use self::clipboard::MemoryClipboard;
#[cfg(test)]
pub(crate) use self::open::RecordingOpener;

const CAPABILITY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::capability");

/// Errors reported by host capabilities.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The helper program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Helper program name.
        program: &'static str,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Exchanging data with the helper failed.
    #[error("failed to communicate with {program}: {source}")]
    Io {
        /// Helper program name.
        program: &'static str,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The helper exited unsuccessfully.
    #[error("{program} exited with {status}")]
    Failed {
        /// Helper program name.
        program: &'static str,
        /// Exit status reported by the OS.
        status: ExitStatus,
    },
    /// No helper is known for this platform.
    #[error("{capability} is not supported on this platform")]
    Unsupported {
        /// Capability that was requested.
        capability: &'static str,
    },
}

/// The capability set handed to the dispatcher.
#[derive(Clone)]
pub struct HostServices {
    clipboard: Arc<dyn Clipboard>,
    opener: Arc<dyn Opener>,
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}

impl HostServices {
    /// Bundles the given capabilities.
    #[must_use]
    pub fn new(clipboard: Arc<dyn Clipboard>, opener: Arc<dyn Opener>) -> Self {
        Self { clipboard, opener }
    }

    /// Capabilities backed by the platform's helper programs.
    #[must_use]
    pub fn system() -> Self {
        Self::new(Arc::new(CommandClipboard), Arc::new(SystemOpener))
    }

    /// Clipboard capability.
    #[must_use]
    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    /// URL opener capability.
    #[must_use]
    pub fn opener(&self) -> &dyn Opener {
        self.opener.as_ref()
    }
}
