//! Entry point for the `rdm` binary.

use std::process::ExitCode;

fn main() -> ExitCode {
    rdm_cli::run_with_process_streams()
}
