//! Host-side server for `rdm`.
//!
//! The server binds a Unix or TCP endpoint and answers one command per
//! connection: clipboard access, opening URLs, and running registered
//! catalog commands under supervision. Requests are single JSON lines and
//! responses are raw bytes terminated by the server closing the stream.
//!
//! Startup follows a fixed sequence: load configuration, install structured
//! telemetry, prepare the socket directory, and load the command catalog.
//! Health reporting hooks emit an event at each stage so operators can see
//! where a failed start stopped.
//!
//! At most one server owns an endpoint. Binding probes an occupied endpoint
//! with a `status` request; a server that answers is left alone, while a
//! stale Unix socket file is removed and reclaimed.

mod bootstrap;
mod capability;
mod dispatch;
mod health;
mod lifecycle;
mod supervisor;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Server, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use capability::{
    CapabilityError, Clipboard, CommandClipboard, HostServices, Opener, SystemOpener,
};
pub use dispatch::{CommandKind, DispatchError};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use lifecycle::{
    LaunchError, NoShutdownSignal, ShutdownError, ShutdownReason, ShutdownSignal, ShutdownTrigger,
    SignalWatch, SystemShutdownSignal, run_server, run_server_with_config,
};
pub use supervisor::{
    ManagedProcess, NixSignaller, ProcessSignaller, ProcessSupervisor, SupervisorError,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
