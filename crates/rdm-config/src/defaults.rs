use std::env;

use camino::Utf8PathBuf;

use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// TCP port a remote session forwards to the host's server.
pub const DEFAULT_TCP_PORT: u16 = 7391;

/// Host used for the forwarded TCP endpoint.
pub const DEFAULT_TCP_HOST: &str = "127.0.0.1";

/// File name of the server socket inside the temp directory.
pub const SOCKET_FILE_NAME: &str = "rdm.sock";

/// File name of the server log inside the temp directory.
pub const LOG_FILE_NAME: &str = "rdm.log";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default deadline for a foreground `run`, in seconds.
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 10;

/// Environment variable whose presence marks a remote (SSH) session.
pub const REMOTE_SESSION_ENV_VAR: &str = "SSH_TTY";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default deadline for a foreground `run`, in seconds.
#[must_use]
pub fn default_run_timeout_secs() -> u64 {
    DEFAULT_RUN_TIMEOUT_SECS
}

/// Computes the default socket endpoint for the server.
///
/// The socket lives directly inside the platform temp directory under a
/// fixed name so every client on the host derives the same path.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::unix(temp_base_directory().join(SOCKET_FILE_NAME))
}

/// The forwarded TCP endpoint used from remote sessions.
#[must_use]
pub fn remote_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_TCP_HOST, DEFAULT_TCP_PORT)
}

/// Default location of the server log file.
#[must_use]
pub fn default_log_path() -> Utf8PathBuf {
    temp_base_directory().join(LOG_FILE_NAME)
}

/// Default location of the command catalog: `~/.config/rdm/rdm.json`.
#[must_use]
pub fn default_catalog_path() -> Utf8PathBuf {
    let home = dirs::home_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .unwrap_or_else(temp_base_directory);
    home.join(".config").join("rdm").join("rdm.json")
}

fn temp_base_directory() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}
