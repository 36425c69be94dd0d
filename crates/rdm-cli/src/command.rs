//! Maps parsed subcommands onto local actions or server requests.

use std::io::Read;
use std::time::Duration;

use rdm_config::Config;
use rdm_daemon_types::{Command, REQUEST_TIMEOUT};

use crate::cli::CliCommand;
use crate::errors::AppError;

/// What a single invocation of `rdm` does.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// Run the server in this process.
    Serve,
    /// Print the server socket location.
    PrintSocket,
    /// Print the server log location.
    PrintLogPath,
    /// Send a command and forward the response body to stdout.
    Send(Command),
}

impl Action {
    /// Resolves a subcommand, reading stdin for `copy` without text.
    pub(crate) fn resolve<R: Read>(command: CliCommand, stdin: &mut R) -> Result<Self, AppError> {
        let request = match command {
            CliCommand::Server => return Ok(Self::Serve),
            CliCommand::Socket => return Ok(Self::PrintSocket),
            CliCommand::Logpath => return Ok(Self::PrintLogPath),
            CliCommand::Copy { text: Some(text) } => Command::new("copy", [text]),
            CliCommand::Copy { text: None } => {
                let mut text = String::new();
                stdin
                    .read_to_string(&mut text)
                    .map_err(AppError::ReadStdin)?;
                Command::new("copy", [text])
            }
            CliCommand::Paste => Command::bare("paste"),
            CliCommand::Open { target } => Command::new("open", [target]),
            CliCommand::Run {
                background,
                name,
                arguments,
            } => {
                let (trailing_flag, arguments) = extract_background_flag(arguments);
                let kind = if background || trailing_flag {
                    "runbg"
                } else {
                    "run"
                };
                Command::new(kind, std::iter::once(name).chain(arguments))
            }
            CliCommand::Ps => Command::bare("ps"),
            CliCommand::Kill { pid } => Command::new("kill", [pid.to_string()]),
            CliCommand::Commands => Command::bare("commands"),
            CliCommand::Stop => Command::bare("stop"),
        };
        Ok(Self::Send(request))
    }
}

/// Pulls `-b`/`--background` out of the forwarded arguments.
///
/// Scanning stops at the first `--`, which is dropped; everything after it is
/// forwarded untouched.
fn extract_background_flag(arguments: Vec<String>) -> (bool, Vec<String>) {
    let mut background = false;
    let mut forwarded = Vec::with_capacity(arguments.len());
    let mut remaining = arguments.into_iter();
    for argument in remaining.by_ref() {
        match argument.as_str() {
            "--" => break,
            "-b" | "--background" => background = true,
            _ => forwarded.push(argument),
        }
    }
    forwarded.extend(remaining);
    (background, forwarded)
}

/// How long the client waits on each read or write of an exchange.
///
/// A foreground run may legitimately take as long as the server's run
/// deadline before any bytes come back.
pub(crate) fn exchange_timeout(command: &Command, config: &Config) -> Duration {
    if command.name == "run" {
        REQUEST_TIMEOUT.saturating_add(config.run_timeout())
    } else {
        REQUEST_TIMEOUT
    }
}
