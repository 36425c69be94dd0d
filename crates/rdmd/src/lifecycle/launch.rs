//! Sequences server startup, the serving phase, and shutdown.

use std::sync::Arc;

use tracing::info;

use rdm_config::Config;

use crate::bootstrap::{ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::capability::HostServices;
use crate::dispatch::{CommandRouter, DispatchConnectionHandler, Services};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::LIFECYCLE_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, ShutdownTrigger, SystemShutdownSignal};

/// Collaborators required to run the server.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) host: HostServices,
    pub(crate) signals: S,
    pub(crate) shutdown: ShutdownTrigger,
}

impl<L: ConfigLoader> LaunchPlan<L, SystemShutdownSignal> {
    fn production(loader: L) -> Self {
        Self {
            loader,
            reporter: Arc::new(StructuredHealthReporter::new()),
            host: HostServices::system(),
            signals: SystemShutdownSignal,
            shutdown: ShutdownTrigger::new(),
        }
    }
}

/// Runs the server in the foreground, loading configuration from the
/// process arguments, environment, and configuration files.
///
/// Returns once a `stop` command or termination signal has been handled and
/// in-flight requests have finished.
///
/// # Errors
///
/// Fails when bootstrap fails, the endpoint cannot be bound (including when
/// another server already answers on it), or signal handlers cannot be
/// installed.
pub fn run_server() -> Result<(), LaunchError> {
    launch(LaunchPlan::production(SystemConfigLoader))
}

/// Runs the server with a configuration the caller has already resolved.
///
/// # Errors
///
/// See [`run_server`].
pub fn run_server_with_config(config: Config) -> Result<(), LaunchError> {
    launch(LaunchPlan::production(StaticConfigLoader::new(config)))
}

/// Runs the server with injected collaborators.
pub(crate) fn launch<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        host,
        signals,
        shutdown,
    } = plan;

    let server = bootstrap_with(&loader, reporter.as_ref())?;
    let (config, catalog) = server.into_parts();
    info!(
        target: LIFECYCLE_TARGET,
        socket = %config.daemon_socket(),
        commands = catalog.len(),
        "starting server runtime"
    );

    let listener = SocketListener::bind(config.daemon_socket())?;
    let services = Services::new(host, Arc::new(catalog), shutdown.clone())
        .with_run_timeout(config.run_timeout());
    let handler = Arc::new(DispatchConnectionHandler::new(CommandRouter::new(services)));
    let listener_handle = listener.start(handler)?;
    reporter.listener_ready(config.daemon_socket());

    let watch = match signals.watch(shutdown.clone()) {
        Ok(watch) => watch,
        Err(error) => {
            listener_handle.shutdown();
            drop(listener_handle.join());
            return Err(error.into());
        }
    };

    let reason = shutdown.wait();
    reporter.shutdown_requested(reason);
    listener_handle.shutdown();
    let joined = listener_handle.join();
    watch.stop();
    joined?;
    reporter.shutdown_completed();
    info!(target: LIFECYCLE_TARGET, "shutdown sequence completed");
    Ok(())
}
