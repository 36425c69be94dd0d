//! Blocking request/response client.

use std::io::{self, Read, Write};
use std::time::Duration;

use thiserror::Error;

use rdm_config::SocketEndpoint;

use crate::Command;
use crate::transport::connect;

/// Errors surfaced while exchanging a command with the server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint could not be reached.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Endpoint that refused the connection.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Serialising the request failed.
    #[error("failed to serialise command: {0}")]
    Serialise(#[from] serde_json::Error),
    /// Writing the request failed.
    #[error("failed to send command to {endpoint}: {source}")]
    Send {
        /// Endpoint being written to.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Reading the response failed or timed out.
    #[error("failed to read response from {endpoint}: {source}")]
    Receive {
        /// Endpoint being read from.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Sends one command and returns the raw response body.
///
/// Both the connection attempt and each subsequent read or write are bounded
/// by `timeout`.
///
/// # Errors
///
/// Returns a [`ClientError`] describing which stage of the exchange failed.
pub fn send_command(
    endpoint: &SocketEndpoint,
    command: &Command,
    timeout: Duration,
) -> Result<Vec<u8>, ClientError> {
    let line = command.to_line()?;
    let mut connection = connect(endpoint, timeout).map_err(|source| ClientError::Connect {
        endpoint: endpoint.to_string(),
        source,
    })?;

    let send_error = |source| ClientError::Send {
        endpoint: endpoint.to_string(),
        source,
    };
    connection.set_timeouts(timeout).map_err(send_error)?;
    connection.write_all(&line).map_err(send_error)?;
    connection.flush().map_err(send_error)?;
    connection.finish_request().map_err(send_error)?;

    let mut response = Vec::new();
    connection
        .read_to_end(&mut response)
        .map_err(|source| ClientError::Receive {
            endpoint: endpoint.to_string(),
            source,
        })?;
    Ok(response)
}
