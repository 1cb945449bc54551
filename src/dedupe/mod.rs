//! Priority-based duplicate removal - the dedupe pipeline.
//!
//! # Architecture
//!
//! Data flows one way through three stages, group by group:
//!
//! - [`report`]: streams the external detector's report into
//!   [`DuplicateGroup`]s (lazy, single pass)
//! - [`priority`]: resolves each group against the [`PriorityList`] into
//!   a keep/delete [`Decision`] (pure, no I/O)
//! - [`executor`]: applies or simulates the deletions, accumulating
//!   [`RunStatistics`]
//!
//! Dry-run and apply mode compute identical decisions; only the executor's
//! mutating call differs.

pub mod executor;
pub mod priority;
pub mod report;

use anyhow::Result;

pub use executor::{Executor, RunStatistics, PROGRESS_INTERVAL};
pub use priority::{resolve, Decision, FileCandidate, PriorityList};
pub use report::{DuplicateGroup, ReportReader};

use crate::cli::DedupeArgs;
use crate::error::ExitCode;
use crate::progress::Progress;

/// Run the dedupe subcommand.
///
/// # Errors
///
/// Returns a [`crate::error::ConfigError`] (wrapped in anyhow) for an
/// unreadable report or a failed auto-detection, before any mutation;
/// a report read error mid-stream surfaces as a general error.
pub fn run(args: &DedupeArgs, quiet: bool) -> Result<ExitCode> {
    let priorities = match &args.priority {
        Some(spec) => PriorityList::from_spec(spec),
        None => PriorityList::auto_detect(&args.report)?,
    };
    log::info!("priority order: [{}]", priorities.idents().join(", "));

    if !args.apply {
        log::info!("dry-run mode: no files will be deleted (pass --apply to delete)");
    }

    let mut reader = ReportReader::open(&args.report)?;
    let progress = Progress::new(quiet);

    let executor = Executor::new(&priorities, args.apply).with_progress(&progress);
    let stats = executor.execute(&mut reader)?;

    if reader.singletons_dropped() > 0 {
        log::debug!(
            "{} single-entry group(s) in report carried no decision",
            reader.singletons_dropped()
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats.render(args.apply));
    }

    Ok(ExitCode::Success)
}
