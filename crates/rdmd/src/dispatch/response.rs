//! Response writing for the dispatch loop.
//!
//! Responses are raw bytes with no framing: the server closes the
//! connection after writing, and end-of-stream marks the end of the body.

use std::io::Write;

use super::errors::DispatchError;

/// Writer that delivers a single response body to a client.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the response body and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn write_body(&mut self, body: &[u8]) -> Result<(), DispatchError> {
        self.writer.write_all(body)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes a `bad request` body describing why the request was rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        self.write_body(bad_request(error).as_bytes())
    }
}

/// Renders the body sent for a rejected request.
pub fn bad_request(error: &DispatchError) -> String {
    format!("bad request: {error}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_body_verbatim() {
        let mut output = Vec::new();
        let mut writer = ResponseWriter::new(&mut output);
        writer.write_body(b"hi\n").expect("write body");
        assert_eq!(output, b"hi\n".to_vec());
    }

    #[test]
    fn write_error_prefixes_bad_request() {
        let mut output = Vec::new();
        let mut writer = ResponseWriter::new(&mut output);
        let error = DispatchError::invalid_arguments("copy requires text");
        writer.write_error(&error).expect("write error");

        let response = String::from_utf8(output).expect("valid utf8");
        assert_eq!(response, "bad request: invalid arguments: copy requires text\n");
    }
}
