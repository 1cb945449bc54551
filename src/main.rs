//! baktidy - Backup-Tree Maintenance Toolkit
//!
//! Entry point for the baktidy CLI application.

use baktidy::{cli::Cli, error::ExitCode};
use clap::Parser;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Run the application logic
    match baktidy::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            // Configuration problems get their own exit code; everything
            // else is a general failure.
            let exit_code = if err.downcast_ref::<baktidy::error::ConfigError>().is_some() {
                ExitCode::ConfigError
            } else {
                ExitCode::GeneralError
            };

            eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            std::process::exit(exit_code.as_i32());
        }
    }
}
