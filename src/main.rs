//! Prism CLI - a local-first task list for the terminal

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = prism_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
