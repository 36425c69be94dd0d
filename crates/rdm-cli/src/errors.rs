//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use rdm_daemon_types::ClientError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to read text to copy from stdin: {0}")]
    ReadStdin(io::Error),
    #[error(transparent)]
    Exchange(#[from] ClientError),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
    #[error(transparent)]
    Server(#[from] rdmd::LaunchError),
}
