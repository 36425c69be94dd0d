//! Server lifecycle: launch sequencing and shutdown signalling.

mod errors;
mod launch;
mod shutdown;

pub use errors::LaunchError;
pub use launch::{run_server, run_server_with_config};
pub use shutdown::{
    NoShutdownSignal, ShutdownError, ShutdownReason, ShutdownSignal, ShutdownTrigger, SignalWatch,
    SystemShutdownSignal,
};

#[cfg(test)]
pub(crate) use launch::{LaunchPlan, launch};

pub(crate) const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");
