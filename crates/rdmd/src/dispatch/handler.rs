//! Connection handler that dispatches command requests.
//!
//! Each connection carries exactly one request line. The handler decodes it,
//! routes it through the [`CommandRouter`], writes the response body, and
//! lets the transport close the stream, which marks the end of the response.

use std::io::{self, Read};

use tracing::{debug, warn};

use rdm_daemon_types::MAX_REQUEST_BYTES;

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::errors::DispatchError;
use super::request::parse_command;
use super::response::ResponseWriter;
use super::router::{CommandRouter, DISPATCH_TARGET};

/// Connection handler that parses and dispatches command requests.
#[derive(Debug)]
pub struct DispatchConnectionHandler {
    router: CommandRouter,
}

impl DispatchConnectionHandler {
    /// Creates a dispatch handler over the given router.
    pub fn new(router: CommandRouter) -> Self {
        Self { router }
    }

    fn dispatch(&self, mut stream: ConnectionStream) {
        let request_bytes = match read_request_line(&mut stream) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(target: DISPATCH_TARGET, "client disconnected without request");
                return;
            }
            Err(error) => {
                reject(&mut stream, &error, "failed to read request");
                return;
            }
        };

        let command = match parse_command(&request_bytes) {
            Ok(command) => command,
            Err(error) => {
                reject(&mut stream, &error, "malformed request");
                return;
            }
        };

        let body = match self.router.route(&command) {
            Ok(body) => body,
            Err(error) => {
                reject(&mut stream, &error, "invalid request");
                return;
            }
        };

        let mut writer = ResponseWriter::new(&mut stream);
        if let Err(error) = writer.write_body(&body) {
            warn!(target: DISPATCH_TARGET, %error, command = %command.name, "failed to write response");
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        self.dispatch(stream);
    }
}

/// Logs a rejected request and tells the client why, if it can still hear.
fn reject(stream: &mut ConnectionStream, error: &DispatchError, context: &'static str) {
    warn!(target: DISPATCH_TARGET, %error, "{context}");
    if !error.is_reportable() {
        return;
    }
    let mut writer = ResponseWriter::new(stream);
    if let Err(write_error) = writer.write_error(error) {
        debug!(target: DISPATCH_TARGET, error = %write_error, "failed to report rejection");
    }
}

/// Reads a bounded request line from the stream.
///
/// Returns `Ok(None)` if the client disconnects without sending data and
/// `Ok(Some(bytes))` once a newline or end of stream is seen.
fn read_request_line<R: Read>(stream: &mut R) -> Result<Option<Vec<u8>>, DispatchError> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        let bytes_read = read_with_retry(stream, &mut chunk)?;

        if bytes_read == 0 {
            return Ok((!buffer.is_empty()).then_some(buffer));
        }

        if let Some(newline_pos) = chunk[..bytes_read].iter().position(|b| *b == b'\n') {
            buffer.extend_from_slice(&chunk[..=newline_pos]);
            enforce_limit(buffer.len())?;
            return Ok(Some(buffer));
        }

        buffer.extend_from_slice(&chunk[..bytes_read]);
        enforce_limit(buffer.len())?;
    }
}

fn read_with_retry<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn enforce_limit(size: usize) -> Result<(), DispatchError> {
    if size > MAX_REQUEST_BYTES {
        return Err(DispatchError::request_too_large(size, MAX_REQUEST_BYTES));
    }
    Ok(())
}
