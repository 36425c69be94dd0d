//! Derives runtime artefact paths shared by the CLI and the server.
//!
//! The `socket` and `logpath` subcommands print these locations, and the
//! server opens the log file at startup, so both sides must agree on them.

use std::fs::{File, OpenOptions};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::defaults::default_log_path;
use crate::{Config, SocketEndpoint};

/// Canonical paths for runtime artefacts written by the server.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    socket: SocketEndpoint,
    log_path: Utf8PathBuf,
}

impl RuntimePaths {
    /// Derives runtime paths from the shared configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            socket: config.daemon_socket().clone(),
            log_path: default_log_path(),
        }
    }

    /// Overrides the log location; used by tests that must not touch the
    /// shared temp directory.
    #[must_use]
    pub fn with_log_path(mut self, log_path: impl Into<Utf8PathBuf>) -> Self {
        self.log_path = log_path.into();
        self
    }

    /// Endpoint the server binds.
    #[must_use]
    pub fn socket(&self) -> &SocketEndpoint {
        &self.socket
    }

    /// Path to the append-only server log.
    #[must_use]
    pub fn log_path(&self) -> &Utf8Path {
        self.log_path.as_path()
    }

    /// Opens the server log for appending, creating it when absent.
    pub fn open_log_file(&self) -> Result<File, RuntimePathsError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path.as_std_path())
            .map_err(|source| RuntimePathsError::LogFile {
                path: self.log_path.clone(),
                source,
            })
    }
}

/// Errors raised while preparing runtime artefacts.
#[derive(Debug, Error)]
pub enum RuntimePathsError {
    /// Opening the log file failed.
    #[error("unable to open log file '{path}': {source}")]
    LogFile {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}
