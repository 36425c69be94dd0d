//! CLI argument definitions for `rdm`.

use clap::{Parser, Subcommand};

/// Command-line interface for the remote development manager.
#[derive(Parser, Debug)]
#[command(name = "rdm", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The action to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Subcommands understood by `rdm`.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Runs the server in the foreground until it is stopped.
    Server,
    /// Copies TEXT, or standard input when omitted, to the host clipboard.
    Copy {
        /// Text to copy.
        #[arg(value_name = "TEXT")]
        text: Option<String>,
    },
    /// Prints the host clipboard contents.
    Paste,
    /// Opens a URL on the host.
    Open {
        /// URL or path to open.
        #[arg(value_name = "URL")]
        target: String,
    },
    /// Runs a registered command on the host.
    Run {
        /// Runs the command in the background and returns immediately.
        #[arg(short, long)]
        background: bool,
        /// Registered command name.
        #[arg(value_name = "NAME")]
        name: String,
        /// Arguments forwarded to the command. `-b`/`--background` may also
        /// follow them; arguments after `--` are forwarded verbatim.
        #[arg(
            value_name = "ARG",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        arguments: Vec<String>,
    },
    /// Lists processes started with `run`.
    Ps,
    /// Kills a process started with `run`.
    Kill {
        /// Process identifier reported by `ps` or `run --background`.
        #[arg(value_name = "PID")]
        pid: u32,
    },
    /// Lists registered command names.
    Commands,
    /// Stops the server.
    Stop,
    /// Prints the location of the server socket.
    Socket,
    /// Prints the location of the server log.
    Logpath,
}
