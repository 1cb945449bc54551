//! Compressed folder archiving.
//!
//! Writes a gzip-compressed tar of a directory tree, storing entries
//! relative to the source root and skipping anything matching the
//! exclusion globs. Dry-run walks and counts the same entries without
//! creating the archive. Unreadable entries are logged and skipped; only
//! a failure to write the archive itself is fatal.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytesize::ByteSize;
use chrono::Local;
use flate2::write::GzEncoder;
use flate2::Compression;
use globset::GlobSet;
use walkdir::WalkDir;

use crate::cli::ArchiveArgs;
use crate::error::{ConfigError, ExitCode};
use crate::maintain::build_globset;

/// Counters for one archive pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// File entries written into the archive.
    pub entries_written: usize,
    /// Uncompressed input bytes.
    pub bytes_in: u64,
    /// Entries skipped by exclusion patterns.
    pub excluded: usize,
    /// Entries skipped because they could not be read.
    pub failures: usize,
}

/// Write a tar.gz of `source` to `dest`, or preview it.
///
/// Exclusion globs match against source-relative paths. Symlinks are
/// stored as links, not followed. With `apply` false the same walk runs
/// and the same entries are counted, but no archive is created.
///
/// # Errors
///
/// Fails only when the archive itself cannot be created or finalized.
pub fn archive_tree(
    source: &Path,
    dest: &Path,
    excludes: &GlobSet,
    apply: bool,
) -> io::Result<ArchiveStats> {
    let mut stats = ArchiveStats::default();

    let mut builder = if apply {
        let file = File::create(dest)?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);
        Some(builder)
    } else {
        None
    };

    let mut it = WalkDir::new(source).into_iter();
    while let Some(entry) = it.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                stats.failures += 1;
                log::warn!("walk error under {}: {}", source.display(), e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        // Guard against a dest placed inside the source after the
        // containment check (e.g. via a symlinked parent).
        if path == dest {
            continue;
        }

        let rel = match path.strip_prefix(source) {
            Ok(r) => r,
            Err(_) => continue,
        };
        if excludes.is_match(rel) {
            stats.excluded += 1;
            log::debug!("excluded: {}", rel.display());
            if entry.file_type().is_dir() {
                it.skip_current_dir();
            }
            continue;
        }

        let result = match builder.as_mut() {
            Some(builder) => {
                if entry.file_type().is_dir() {
                    builder.append_dir(rel, path)
                } else {
                    builder.append_path_with_name(path, rel)
                }
            }
            None => {
                log::info!("would archive: {}", rel.display());
                Ok(())
            }
        };
        match result {
            Ok(()) => {
                if entry.file_type().is_file() {
                    stats.entries_written += 1;
                    stats.bytes_in += entry.metadata().map(|m| m.len()).unwrap_or(0);
                }
            }
            Err(e) => {
                stats.failures += 1;
                log::error!("failed to archive {}: {}", rel.display(), e);
            }
        }
    }

    if let Some(builder) = builder {
        let encoder = builder.into_inner()?;
        encoder.finish()?;
    }
    Ok(stats)
}

/// Default destination: `<basename>-<YYYYMMDD>.tar.gz` beside the source.
fn default_dest(source: &Path) -> PathBuf {
    let basename = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    let name = format!("{}-{}.tar.gz", basename, Local::now().format("%Y%m%d"));
    source.parent().unwrap_or(Path::new(".")).join(name)
}

/// Run the archive subcommand.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the source is not a directory, an
/// exclusion pattern is invalid, or the destination lies inside the
/// source tree; archive write failures surface as general errors.
pub fn run(args: &ArchiveArgs) -> Result<ExitCode> {
    if !args.source.is_dir() {
        return Err(ConfigError::NotADirectory(args.source.clone()).into());
    }
    let excludes = build_globset(&args.exclude)?;

    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| default_dest(&args.source));
    if dest.starts_with(&args.source) {
        return Err(ConfigError::ArchiveInsideSource(dest).into());
    }

    let verb = if args.apply { "archiving" } else { "would archive" };
    log::info!("{} {} -> {}", verb, args.source.display(), dest.display());
    let stats = archive_tree(&args.source, &dest, &excludes, args.apply)
        .with_context(|| format!("writing archive {}", dest.display()))?;

    let wrote = if args.apply { "wrote" } else { "would write" };
    println!(
        "Summary: {} {} with {} entrie(s) ({} in), {} excluded, {} failure(s)",
        wrote,
        dest.display(),
        stats.entries_written,
        ByteSize(stats.bytes_in),
        stats.excluded,
        stats.failures
    );

    Ok(ExitCode::Success)
}
