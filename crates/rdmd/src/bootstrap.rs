//! Server bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig as _, OrthoError};
use thiserror::Error;

use rdm_config::{Catalog, CatalogError, Config, RuntimePaths, SocketPreparationError};

use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the server configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when any configuration layer is invalid.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a configuration resolved elsewhere, such as by the
/// `rdm` binary after it has parsed its own arguments.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare server socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
    /// The command catalog could not be loaded.
    #[error("failed to load command catalog: {source}")]
    Catalog {
        /// Underlying catalog error.
        #[source]
        source: CatalogError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Server {
    config: Config,
    catalog: Catalog,
    telemetry: TelemetryHandle,
}

impl Server {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the loaded command catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Splits the server into its configuration and catalog.
    #[must_use]
    pub fn into_parts(self) -> (Config, Catalog) {
        (self.config, self.catalog)
    }
}

/// Bootstraps the server using the supplied collaborators.
///
/// Loads configuration, installs telemetry, prepares the socket directory,
/// and loads the command catalog, reporting each failure before returning it.
///
/// # Errors
///
/// Returns the first [`BootstrapError`] encountered.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Server, BootstrapError> {
    reporter.bootstrap_starting();
    let result = bootstrap_steps(loader);
    match &result {
        Ok(server) => reporter.bootstrap_succeeded(server.config()),
        Err(error) => reporter.bootstrap_failed(error),
    }
    result
}

fn bootstrap_steps(loader: &dyn ConfigLoader) -> Result<Server, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;

    let paths = RuntimePaths::from_config(&config);
    let telemetry = telemetry::initialise(&config, &paths)
        .map_err(|source| BootstrapError::Telemetry { source })?;

    config
        .daemon_socket()
        .prepare_filesystem()
        .map_err(|source| BootstrapError::Socket { source })?;

    let catalog = config
        .load_catalog()
        .map_err(|source| BootstrapError::Catalog { source })?;

    Ok(Server {
        config,
        catalog,
        telemetry,
    })
}
