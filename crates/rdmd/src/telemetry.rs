//! Structured telemetry initialisation for the server.
//!
//! Events go to stderr and are mirrored into the append-only server log so
//! `rdm logpath` always points at a complete record.

use std::io;
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, writer::MakeWriterExt};

use rdm_config::{Config, LogFormat, RuntimePaths, RuntimePathsError};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to open the server log file.
    #[error(transparent)]
    LogFile(#[from] RuntimePathsError),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Later calls return a fresh [`TelemetryHandle`] without reopening the log
/// file or touching the global subscriber.
///
/// # Errors
///
/// Fails when the filter does not parse, the log file cannot be opened, or a
/// different global subscriber is already installed.
pub fn initialise(config: &Config, paths: &RuntimePaths) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config, paths))
        .map(|_| TelemetryHandle)
}

fn install_subscriber(config: &Config, paths: &RuntimePaths) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let log_file = paths.open_log_file()?;
    let writer = io::stderr.and(Mutex::new(log_file));

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(writer)
            // The log file is a shared sink, so never emit colour codes.
            .with_ansi(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
