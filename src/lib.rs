//! baktidy - Backup-Tree Maintenance Toolkit
//!
//! A CLI toolkit for keeping backup trees tidy: priority-based removal of
//! duplicates listed in an external detector's report, junk cleanup,
//! folder archiving, tree merging with destination priority, and
//! empty-directory pruning. Every mutating operation defaults to dry-run.

pub mod cli;
pub mod dedupe;
pub mod error;
pub mod logging;
pub mod maintain;
pub mod progress;

use anyhow::Result;

use cli::{Cli, Commands};
use error::ExitCode;

/// Run the application with parsed CLI arguments.
///
/// Initializes logging, dispatches to the selected subcommand, and
/// returns the exit code for normal completion.
///
/// # Errors
///
/// Returns an error for fatal conditions only (configuration problems,
/// unexpected I/O failures); per-file and per-group conditions are
/// absorbed into each subcommand's statistics.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    match &cli.command {
        Commands::Dedupe(args) => dedupe::run(args, cli.quiet),
        Commands::Clean(args) => maintain::clean::run(args),
        Commands::Archive(args) => maintain::archive::run(args),
        Commands::Merge(args) => maintain::merge::run(args),
        Commands::Prune(args) => maintain::prune::run(args),
    }
}
