//! compiler-plugin - Macro expansion plugin for the Swift compiler

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = compiler_plugin::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
