//! Error types for request dispatch failures.
//!
//! These cover the request itself being unusable. Failures of the work a
//! request asks for (a child exiting non-zero, a clipboard helper missing)
//! are rendered into the response body by the router instead.

use std::io;

use thiserror::Error;

/// Errors surfaced while reading, decoding, or validating a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request line could not be decoded as a command.
    #[error("malformed request: {message}")]
    MalformedRequest {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Request exceeds the maximum allowed size.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge { size: usize, max_size: usize },

    /// Invalid or missing command arguments.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DispatchError {
    /// Creates a malformed request error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed request error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a request too large error.
    pub fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    /// Whether the client should be told about this error.
    ///
    /// IO failures mean the connection itself is unusable, so there is nobody
    /// left to answer.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
