//! Request dispatch for server command handling.
//!
//! Clients send a single JSON request line carrying a command envelope:
//!
//! ```json
//! {"Name":"copy","Arguments":["test 1 2 3"]}
//! ```
//!
//! The server answers with the raw response body and closes the connection.
//! Rejected requests receive a `bad request: <reason>` line instead.

mod errors;
mod handler;
mod request;
mod response;
mod router;

pub use self::errors::DispatchError;
pub(crate) use self::handler::DispatchConnectionHandler;
pub use self::router::CommandKind;
pub(crate) use self::router::{CommandRouter, Services};
