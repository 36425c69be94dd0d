//! Request decoding for the dispatch loop.
//!
//! Requests use the [`Command`] envelope shared with the `rdm` client, so the
//! two sides cannot drift apart.

use rdm_daemon_types::Command;

use super::errors::DispatchError;

/// Parses one request line into a command.
///
/// Trailing whitespace (including the newline delimiter) is trimmed before
/// parsing.
///
/// # Errors
///
/// Returns `DispatchError::MalformedRequest` if the line is empty, is not
/// valid JSON, or does not match the command envelope.
pub fn parse_command(line: &[u8]) -> Result<Command, DispatchError> {
    let trimmed = trim_trailing_whitespace(line);
    if trimmed.is_empty() {
        return Err(DispatchError::malformed("empty request"));
    }

    let command: Command = serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)?;
    if command.name.trim().is_empty() {
        return Err(DispatchError::malformed("command name is empty"));
    }
    Ok(command)
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_command_with_arguments() {
        let command =
            parse_command(br#"{"Name":"copy","Arguments":["test 1 2 3"]}"#).expect("parse");
        assert_eq!(command, Command::new("copy", ["test 1 2 3"]));
    }

    #[test]
    fn trims_trailing_newline() {
        let command = parse_command(b"{\"Name\":\"ps\"}  \n").expect("parse");
        assert_eq!(command, Command::bare("ps"));
    }

    #[rstest]
    #[case::missing(br#"{"Name":"ps"}"#.as_slice())]
    #[case::null(br#"{"Name":"ps","Arguments":null}"#.as_slice())]
    #[case::empty(br#"{"Name":"ps","Arguments":[]}"#.as_slice())]
    fn absent_arguments_read_as_empty(#[case] input: &[u8]) {
        let command = parse_command(input).expect("parse");
        assert_eq!(command, Command::bare("ps"));
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::whitespace(b"   \n".as_slice())]
    #[case::not_json(b"not json".as_slice())]
    #[case::wrong_shape(br#"{"name":"ps"}"#.as_slice())]
    #[case::blank_name(br#"{"Name":"  "}"#.as_slice())]
    fn rejects_unusable_requests(#[case] input: &[u8]) {
        let result = parse_command(input);
        assert!(matches!(result, Err(DispatchError::MalformedRequest { .. })));
    }
}
