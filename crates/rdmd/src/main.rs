use std::process::ExitCode;

fn main() -> ExitCode {
    match rdmd::run_server() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("rdmd: {error}");
            ExitCode::FAILURE
        }
    }
}
