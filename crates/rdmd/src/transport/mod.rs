//! Socket listener for server transport endpoints.
//!
//! The transport module binds the configured endpoint, reclaiming a stale
//! Unix socket left behind by a crashed server, and accepts connections in a
//! background thread. Each connection is served on its own thread.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
pub(crate) use self::listener::{ListenerHandle, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, StatusHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
