//! Shared configuration for the `rdm` client and server.
//!
//! [`Config`] is loaded through `ortho_config`, which layers built-in
//! defaults, an optional configuration file, `RDM_*` environment variables,
//! and command-line flags (in increasing order of precedence). The registered
//! command catalog lives in a separate JSON file referenced by
//! [`Config::catalog_path`] and is loaded with [`Catalog::load`].

use std::env;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod catalog;
mod defaults;
mod logging;
mod runtime;
mod socket;

pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_RUN_TIMEOUT_SECS, DEFAULT_TCP_HOST, DEFAULT_TCP_PORT,
    LOG_FILE_NAME, REMOTE_SESSION_ENV_VAR, SOCKET_FILE_NAME, default_catalog_path,
    default_log_filter, default_log_filter_string, default_log_format, default_log_path,
    default_run_timeout_secs, default_socket_endpoint, remote_socket_endpoint,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use runtime::{RuntimePaths, RuntimePathsError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Layered configuration shared by the CLI and the server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "RDM")]
pub struct Config {
    /// Endpoint the server binds and local clients connect to.
    #[ortho_config(default = default_socket_endpoint())]
    pub daemon_socket: SocketEndpoint,
    /// `tracing` filter expression for the server logs.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for the server logs.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Location of the registered command catalog.
    #[ortho_config(default = default_catalog_path())]
    pub catalog_path: Utf8PathBuf,
    /// Deadline applied to foreground `run` requests, in seconds.
    #[ortho_config(default = default_run_timeout_secs())]
    pub run_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_socket_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            catalog_path: default_catalog_path(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

impl Config {
    /// Endpoint the server binds.
    #[must_use]
    pub fn daemon_socket(&self) -> &SocketEndpoint {
        &self.daemon_socket
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Location of the command catalog file.
    #[must_use]
    pub fn catalog_path(&self) -> &Utf8Path {
        self.catalog_path.as_path()
    }

    /// Deadline applied to foreground runs.
    #[must_use]
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    /// Loads the command catalog referenced by this configuration.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        Catalog::load(self.catalog_path())
    }

    /// Endpoint a client should contact.
    ///
    /// Clients inside a remote (SSH) session cannot reach the host's Unix
    /// socket directly, so they target the forwarded TCP port instead.
    #[must_use]
    pub fn client_endpoint(&self) -> SocketEndpoint {
        self.client_endpoint_for(env::var_os(REMOTE_SESSION_ENV_VAR).is_some())
    }

    /// Endpoint selection with the remote-session check made explicit.
    #[must_use]
    pub fn client_endpoint_for(&self, remote_session: bool) -> SocketEndpoint {
        if remote_session {
            remote_socket_endpoint()
        } else {
            self.daemon_socket.clone()
        }
    }
}
