//! Configuration loading helpers for the `rdm` CLI.
//!
//! Configuration flags must precede the subcommand. The leading run of
//! recognised flags is handed to `ortho_config`; everything from the first
//! other token onwards is parsed by clap.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig as _;
use rdm_config::Config;

use crate::errors::AppError;

/// CLI flags recognised by the configuration loader.
///
/// Keep in sync with the fields of [`Config`].
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--daemon-socket",
    "--log-filter",
    "--log-format",
    "--catalog-path",
    "--run-timeout-secs",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the configuration flags, environment, and
    /// configuration files.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }

    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*text, false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments split between the configuration loader and clap.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) cli_arguments: Vec<OsString>,
}

pub(crate) fn split_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit {
            config_arguments: Vec::new(),
            cli_arguments: Vec::new(),
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter().peekable();
    while let Some(argument) = remaining.peek() {
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push((*argument).clone());
                remaining.next();
                if needs_value && let Some(value) = remaining.next() {
                    config_arguments.push(value.clone());
                }
            }
            FlagAction::Stop => break,
        }
    }

    let mut cli_arguments = vec![program.clone()];
    cli_arguments.extend(remaining.cloned());
    ArgumentSplit {
        config_arguments,
        cli_arguments,
    }
}
