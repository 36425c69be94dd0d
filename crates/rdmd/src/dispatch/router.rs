//! Command routing for the dispatch loop.
//!
//! Each command kind maps to one handler. Handlers receive the request
//! arguments and the shared [`Services`] and return the response body; they
//! hold no state of their own.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use rdm_config::{Catalog, DEFAULT_RUN_TIMEOUT_SECS};
use rdm_daemon_types::{Command, STATUS_RUNNING};

use crate::capability::HostServices;
use crate::lifecycle::{ShutdownReason, ShutdownTrigger};
use crate::supervisor::ProcessSupervisor;

use super::errors::DispatchError;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Commands understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Liveness probe.
    Status,
    /// Replace the clipboard contents.
    Copy,
    /// Read the clipboard contents.
    Paste,
    /// Open a URL on the host.
    Open,
    /// Run a catalog command in the foreground.
    Run,
    /// Run a catalog command in the background.
    RunBackground,
    /// Kill a supervised process.
    Kill,
    /// List supervised processes.
    Ps,
    /// List catalog command names.
    Commands,
    /// Stop the server.
    Stop,
}

impl CommandKind {
    /// Parses a wire command name. Names are case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "status" => Some(Self::Status),
            "copy" => Some(Self::Copy),
            "paste" => Some(Self::Paste),
            "open" => Some(Self::Open),
            "run" => Some(Self::Run),
            "runbg" => Some(Self::RunBackground),
            "kill" => Some(Self::Kill),
            "ps" => Some(Self::Ps),
            "commands" => Some(Self::Commands),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }

    /// Returns the canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Copy => "copy",
            Self::Paste => "paste",
            Self::Open => "open",
            Self::Run => "run",
            Self::RunBackground => "runbg",
            Self::Kill => "kill",
            Self::Ps => "ps",
            Self::Commands => "commands",
            Self::Stop => "stop",
        }
    }
}

/// Everything a handler may touch.
#[derive(Debug, Clone)]
pub struct Services {
    host: HostServices,
    supervisor: Arc<ProcessSupervisor>,
    catalog: Arc<Catalog>,
    shutdown: ShutdownTrigger,
    run_timeout: Duration,
}

impl Services {
    /// Bundles the capability set, catalog, and shutdown flag with a fresh
    /// supervisor.
    pub fn new(host: HostServices, catalog: Arc<Catalog>, shutdown: ShutdownTrigger) -> Self {
        Self {
            host,
            supervisor: Arc::new(ProcessSupervisor::new()),
            catalog,
            shutdown,
            run_timeout: Duration::from_secs(DEFAULT_RUN_TIMEOUT_SECS),
        }
    }

    /// Replaces the process supervisor.
    #[cfg(test)]
    pub fn with_supervisor(mut self, supervisor: Arc<ProcessSupervisor>) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Sets the deadline applied to foreground runs.
    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = run_timeout;
        self
    }
}

/// Routes decoded commands to their handlers.
#[derive(Debug)]
pub struct CommandRouter {
    services: Services,
}

impl CommandRouter {
    /// Creates a router over the given services.
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Runs the handler for `command` and returns the response body.
    ///
    /// Unknown command names are logged and answered with an empty body.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidArguments` when a required argument is
    /// missing or unparseable.
    pub fn route(&self, command: &Command) -> Result<Vec<u8>, DispatchError> {
        let Some(kind) = CommandKind::parse(&command.name) else {
            warn!(target: DISPATCH_TARGET, name = %command.name, "unknown command");
            return Ok(Vec::new());
        };

        debug!(
            target: DISPATCH_TARGET,
            command = kind.as_str(),
            arguments = command.arguments.len(),
            "routing command"
        );

        let args = command.arguments.as_slice();
        let services = &self.services;
        match kind {
            CommandKind::Status => Ok(STATUS_RUNNING.to_vec()),
            CommandKind::Copy => handle_copy(args, services),
            CommandKind::Paste => Ok(handle_paste(services)),
            CommandKind::Open => handle_open(args, services),
            CommandKind::Run => handle_run(args, services),
            CommandKind::RunBackground => handle_run_background(args, services),
            CommandKind::Kill => handle_kill(args, services),
            CommandKind::Ps => Ok(handle_ps(services)),
            CommandKind::Commands => Ok(handle_commands(services)),
            CommandKind::Stop => Ok(handle_stop(services)),
        }
    }
}

fn required<'a>(args: &'a [String], kind: CommandKind, what: &str) -> Result<&'a str, DispatchError> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| DispatchError::invalid_arguments(format!("{} requires {what}", kind.as_str())))
}

fn error_body(error: &impl std::fmt::Display) -> Vec<u8> {
    format!("error: {error}\n").into_bytes()
}

fn handle_copy(args: &[String], services: &Services) -> Result<Vec<u8>, DispatchError> {
    let text = required(args, CommandKind::Copy, "the text to copy")?;
    if let Err(error) = services.host.clipboard().copy(text) {
        warn!(target: DISPATCH_TARGET, %error, "copy failed");
    }
    Ok(Vec::new())
}

fn handle_paste(services: &Services) -> Vec<u8> {
    services.host.clipboard().paste().unwrap_or_else(|error| {
        warn!(target: DISPATCH_TARGET, %error, "paste failed");
        Vec::new()
    })
}

fn handle_open(args: &[String], services: &Services) -> Result<Vec<u8>, DispatchError> {
    let target = required(args, CommandKind::Open, "a target")?;
    if let Err(error) = services.host.opener().open(target) {
        warn!(target: DISPATCH_TARGET, %error, "open failed");
    }
    Ok(Vec::new())
}

fn handle_run(args: &[String], services: &Services) -> Result<Vec<u8>, DispatchError> {
    let name = required(args, CommandKind::Run, "a command name")?;
    let Some(entry) = services.catalog.get(name) else {
        return Ok(not_found(name));
    };
    let rest = args.get(1..).unwrap_or_default();
    let outcome = services.supervisor.run_foreground(
        name,
        &entry.executable_path,
        rest,
        services.run_timeout,
    );
    Ok(outcome.unwrap_or_else(|error| {
        warn!(target: DISPATCH_TARGET, name, %error, "foreground run failed");
        error_body(&error)
    }))
}

fn handle_run_background(args: &[String], services: &Services) -> Result<Vec<u8>, DispatchError> {
    let name = required(args, CommandKind::RunBackground, "a command name")?;
    let Some(entry) = services.catalog.get(name) else {
        return Ok(not_found(name));
    };
    let rest = args.get(1..).unwrap_or_default();
    match services
        .supervisor
        .run_background(name, &entry.executable_path, rest)
    {
        Ok(pid) => Ok(format!("started {name} (pid {pid})\n").into_bytes()),
        Err(error) => {
            warn!(target: DISPATCH_TARGET, name, %error, "background run failed");
            Ok(error_body(&error))
        }
    }
}

fn handle_kill(args: &[String], services: &Services) -> Result<Vec<u8>, DispatchError> {
    let raw = required(args, CommandKind::Kill, "a pid")?;
    let pid: u32 = raw
        .trim()
        .parse()
        .map_err(|_| DispatchError::invalid_arguments(format!("invalid pid '{raw}'")))?;
    match services.supervisor.kill(pid) {
        Ok(()) => Ok(format!("killed process {pid}\n").into_bytes()),
        Err(error) => Ok(error_body(&error)),
    }
}

fn handle_ps(services: &Services) -> Vec<u8> {
    let processes = services.supervisor.list();
    if processes.is_empty() {
        return b"no running processes\n".to_vec();
    }
    let mut table = String::from("PID\tCOMMAND\n");
    for process in processes {
        table.push_str(&format!("{}\t{}\n", process.pid(), process.command_line()));
    }
    table.into_bytes()
}

fn handle_commands(services: &Services) -> Vec<u8> {
    let mut body = String::new();
    for name in services.catalog.names() {
        body.push_str(name);
        body.push('\n');
    }
    body.into_bytes()
}

fn handle_stop(services: &Services) -> Vec<u8> {
    debug!(target: DISPATCH_TARGET, "stop requested");
    services.shutdown.trigger(ShutdownReason::StopCommand);
    Vec::new()
}

fn not_found(name: &str) -> Vec<u8> {
    format!("command not found: {name}\n").into_bytes()
}
