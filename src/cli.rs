//! Command-line interface definitions for baktidy.
//!
//! This module defines all CLI arguments, subcommands, and options using the
//! clap derive API. Global options (verbosity, color) apply to every
//! subcommand; each maintenance tool gets its own argument struct.
//!
//! # Example
//!
//! ```bash
//! # Preview which duplicates would be removed (default dry-run)
//! baktidy dedupe fdupes-report.txt --priority backup2024,backup2023
//!
//! # Actually delete them
//! baktidy dedupe fdupes-report.txt --priority backup2024,backup2023 --apply
//!
//! # Clean junk directories out of a backup tree
//! baktidy clean /mnt/backups --apply
//!
//! # Archive a folder with exclusions
//! baktidy archive /mnt/backups/photos --exclude '*.tmp'
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Backup-tree maintenance toolkit.
///
/// baktidy cleans junk out of backup trees, removes priority-based
/// duplicates from an external duplicate report, archives folders, merges
/// folder trees with destination priority, and prunes empty directories.
/// Every mutating subcommand is a dry-run by default; pass --apply to
/// perform the changes.
#[derive(Debug, Parser)]
#[command(name = "baktidy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for baktidy.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove priority-based duplicates listed in a duplicate report
    Dedupe(DedupeArgs),
    /// Remove junk files and directories from backup trees
    Clean(CleanArgs),
    /// Write a compressed tar.gz archive of a directory tree
    Archive(ArchiveArgs),
    /// Merge a folder tree into a destination tree (destination wins)
    Merge(MergeArgs),
    /// Remove empty directories bottom-up
    Prune(PruneArgs),
}

/// Arguments for the dedupe subcommand.
#[derive(Debug, Args)]
pub struct DedupeArgs {
    /// Path to the duplicate report produced by an external detector
    /// (blank-line-delimited groups of absolute file paths)
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,

    /// Perform the deletions (default is dry-run)
    #[arg(long)]
    pub apply: bool,

    /// Ordered, comma-separated folder priority list (first = keep first)
    ///
    /// If omitted, the list is auto-detected from folder-name frequency in
    /// the report.
    #[arg(short = 'p', long, value_name = "LIST")]
    pub priority: Option<String>,

    /// Print the final run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the clean subcommand.
#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Backup tree roots to clean
    #[arg(value_name = "ROOT", required = true)]
    pub roots: Vec<PathBuf>,

    /// Perform the deletions (default is dry-run)
    #[arg(long)]
    pub apply: bool,

    /// Additional junk name patterns (glob, can be repeated)
    #[arg(long = "junk", value_name = "PATTERN")]
    pub junk_patterns: Vec<String>,
}

/// Arguments for the archive subcommand.
#[derive(Debug, Args)]
pub struct ArchiveArgs {
    /// Directory tree to archive
    #[arg(value_name = "SRC")]
    pub source: PathBuf,

    /// Destination archive path (default: <basename>-<YYYYMMDD>.tar.gz
    /// next to the source)
    #[arg(value_name = "DEST")]
    pub dest: Option<PathBuf>,

    /// Write the archive (default is a dry-run that only lists entries)
    #[arg(long)]
    pub apply: bool,

    /// Glob patterns to exclude, matched against source-relative paths
    /// (can be repeated)
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,
}

/// Arguments for the merge subcommand.
#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Source folder tree
    #[arg(value_name = "SRC")]
    pub source: PathBuf,

    /// Destination folder tree (existing files here always win)
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    /// Perform the copies (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

/// Arguments for the prune subcommand.
#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Tree roots to prune empty directories from
    #[arg(value_name = "ROOT", required = true)]
    pub roots: Vec<PathBuf>,

    /// Perform the removals (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}
