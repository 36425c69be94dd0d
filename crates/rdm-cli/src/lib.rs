//! Command-line runtime for `rdm`.
//!
//! The runtime splits configuration flags from the subcommand, loads the
//! layered configuration, and either runs the server in-process, prints a
//! runtime path, or sends one command to the server and forwards the raw
//! response body to stdout. IO streams and configuration loading are
//! injected so tests can drive the whole flow without a terminal.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;

use rdm_config::{REMOTE_SESSION_ENV_VAR, RuntimePaths, SocketEndpoint};
use rdm_daemon_types::send_command;

mod cli;
mod command;
mod config;
mod errors;

use cli::Cli;
use command::{Action, exchange_timeout};
use config::{ConfigLoader, OrthoConfigLoader, split_arguments};
use errors::AppError;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, R: Read, W: Write, E: Write> {
    pub(crate) stdin: &'a mut R,
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

struct CliRunner<'a, 'io, R: Read, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, R, W, E>,
    loader: &'a L,
    remote_session: bool,
}

impl<R, W, E, L> CliRunner<'_, '_, R, W, E, L>
where
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        match self.execute(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(AppError::CliUsage(error)) if !error.use_stderr() => {
                // Help and version output belong on stdout.
                match write!(self.io.stdout, "{error}") {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(_) => ExitCode::FAILURE,
                }
            }
            Err(error) => {
                drop(writeln!(self.io.stderr, "rdm: {error}"));
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&mut self, args: &[OsString]) -> Result<(), AppError> {
        let split = split_arguments(args);
        let cli = Cli::try_parse_from(split.cli_arguments.iter().cloned()).map_err(AppError::CliUsage)?;
        let config = self.loader.load(&split.config_arguments)?;

        match Action::resolve(cli.command, &mut *self.io.stdin)? {
            Action::Serve => rdmd::run_server_with_config(config).map_err(AppError::from),
            Action::PrintSocket => {
                let endpoint = config.client_endpoint_for(self.remote_session);
                self.print_line(&describe_endpoint(&endpoint))
            }
            Action::PrintLogPath => {
                let paths = RuntimePaths::from_config(&config);
                self.print_line(paths.log_path().as_str())
            }
            Action::Send(command) => {
                let endpoint = config.client_endpoint_for(self.remote_session);
                let body = send_command(&endpoint, &command, exchange_timeout(&command, &config))?;
                self.io
                    .stdout
                    .write_all(&body)
                    .and_then(|()| self.io.stdout.flush())
                    .map_err(AppError::WriteOutput)
            }
        }
    }

    fn print_line(&mut self, text: &str) -> Result<(), AppError> {
        writeln!(self.io.stdout, "{text}").map_err(AppError::WriteOutput)
    }
}

/// Unix endpoints print as a bare path so shell scripts can use them
/// directly.
fn describe_endpoint(endpoint: &SocketEndpoint) -> String {
    endpoint
        .unix_path()
        .map_or_else(|| endpoint.to_string(), |path| path.to_string())
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    let mut io = IoStreams {
        stdin,
        stdout,
        stderr,
    };
    let remote_session = std::env::var_os(REMOTE_SESSION_ENV_VAR).is_some();
    run_with_loader(args, &mut io, &OrthoConfigLoader, remote_session)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, R, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, R, W, E>,
    loader: &L,
    remote_session: bool,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner {
        io,
        loader,
        remote_session,
    }
    .run(args)
}

/// Convenience wrapper used by the binary entry point.
#[must_use]
pub fn run_with_process_streams() -> ExitCode {
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}
