//! Wire contract shared by the `rdm` client and server.
//!
//! A client connects, writes one [`Command`] serialised as a single JSON
//! line, and half-closes its write side. The server answers with the raw
//! response bytes for that command and closes the connection, so
//! end-of-stream delimits the response.
//!
//! ```json
//! {"Name":"copy","Arguments":["test 1 2 3"]}
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

mod client;
mod transport;

pub use client::{ClientError, send_command};
pub use transport::{Connection, connect};

/// Body returned by the `status` command while a server is live.
pub const STATUS_RUNNING: &[u8] = br#"{ "status": "running" }"#;

/// Maximum size of a single request line in bytes.
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Bound applied to each request/response exchange.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound applied when probing a possibly stale endpoint.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// A client request: a command name plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Command name, for example `copy` or `runbg`.
    #[serde(rename = "Name")]
    pub name: String,
    /// Arguments forwarded verbatim to the handler.
    #[serde(rename = "Arguments", default, deserialize_with = "null_as_empty")]
    pub arguments: Vec<String>,
}

/// Clients that build requests from nil slices send `"Arguments":null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Command {
    /// Builds a command from a name and arguments.
    pub fn new<I, S>(name: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a command that takes no arguments.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Vec::<String>::new())
    }

    /// Serialises the command as a newline-terminated JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}
