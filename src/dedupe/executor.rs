//! Decision execution and run accounting.
//!
//! # Overview
//!
//! The executor walks the group stream strictly sequentially, in report
//! order, resolving each group against the priority list and then
//! applying (or merely reporting) the delete side of each decision.
//! Dry-run and apply mode compute identical decisions and identical
//! counts; the only difference is whether the mutating `remove_file`
//! call happens.
//!
//! # Fault isolation
//!
//! Per-file conditions never abort the batch:
//! - a delete candidate missing at execution time increments the
//!   not-found counter (a prior run or an external process beat us to it);
//! - a deletion that fails (permission, in-use) is logged with the path
//!   and reason and the run moves on.
//!
//! There is no rollback: on interruption, deletions already applied stay
//! applied.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use bytesize::ByteSize;
use serde::Serialize;

use crate::dedupe::priority::{resolve, PriorityList};
use crate::dedupe::report::DuplicateGroup;
use crate::progress::ProgressCallback;

/// Progress is reported after every this many groups.
pub const PROGRESS_INTERVAL: usize = 100;

/// Counters accumulated over one executor pass.
///
/// Threaded explicitly through the run and returned once at the end;
/// never ambient shared state, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    /// Duplicate groups received from the parser (2+ members each).
    pub groups_scanned: usize,
    /// Groups that produced a keep/delete decision.
    pub groups_resolved: usize,
    /// Groups with no ranked member; no decision was made.
    pub groups_skipped: usize,
    /// Files kept (one per resolved group).
    pub files_kept: usize,
    /// Files marked for deletion across all decisions.
    pub files_marked: usize,
    /// Files deleted (or, in dry-run, that would have been deleted).
    pub files_deleted: usize,
    /// Delete candidates missing at execution time.
    pub files_not_found: usize,
    /// Deletions that failed (permission, in-use, ...).
    pub delete_failures: usize,
    /// Bytes freed (or that would be freed); best-effort sizes.
    pub bytes_freed: u64,
    /// Wall-clock seconds for the pass.
    pub elapsed_secs: f64,
}

impl RunStatistics {
    /// Render the final human-readable summary.
    ///
    /// `apply` selects the wording; the numbers are computed identically
    /// in both modes.
    #[must_use]
    pub fn render(&self, apply: bool) -> String {
        let deleted_label = if apply { "deleted" } else { "would delete" };
        format!(
            "Summary: {} group(s) scanned ({} resolved, {} skipped)\n  \
             kept:        {}\n  \
             {}: {} ({} freed)\n  \
             not found:   {}\n  \
             failures:    {}\n  \
             elapsed:     {:.1}s",
            self.groups_scanned,
            self.groups_resolved,
            self.groups_skipped,
            self.files_kept,
            deleted_label,
            self.files_deleted,
            ByteSize(self.bytes_freed),
            self.files_not_found,
            self.delete_failures,
            self.elapsed_secs,
        )
    }
}

/// Sequential decision executor.
///
/// Borrows its priority list and optional progress sink for the duration
/// of a single run; nothing outlives the invocation.
pub struct Executor<'a> {
    priorities: &'a PriorityList,
    apply: bool,
    progress: Option<&'a dyn ProgressCallback>,
}

impl<'a> Executor<'a> {
    /// Create an executor.
    ///
    /// # Arguments
    ///
    /// * `priorities` - Ordered folder identifiers for rank resolution
    /// * `apply` - If false (dry-run), no filesystem mutation occurs
    #[must_use]
    pub fn new(priorities: &'a PriorityList, apply: bool) -> Self {
        Self {
            priorities,
            apply,
            progress: None,
        }
    }

    /// Attach a progress sink, called every [`PROGRESS_INTERVAL`] groups.
    #[must_use]
    pub fn with_progress(mut self, progress: &'a dyn ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Process a group stream to completion.
    ///
    /// Groups are consumed lazily and in order; statistics accumulate
    /// across the whole pass and are returned once.
    ///
    /// # Errors
    ///
    /// Only a read error on the underlying report stream aborts the pass;
    /// every per-group and per-file condition is absorbed into the
    /// statistics.
    pub fn execute<I>(&self, groups: I) -> io::Result<RunStatistics>
    where
        I: IntoIterator<Item = io::Result<DuplicateGroup>>,
    {
        let start = Instant::now();
        let mut stats = RunStatistics::default();

        for group in groups {
            let group = group?;
            stats.groups_scanned += 1;

            match resolve(&group, self.priorities) {
                None => {
                    stats.groups_skipped += 1;
                    log::debug!(
                        "group of {} skipped: no member matches any priority identifier",
                        group.len()
                    );
                }
                Some(decision) => {
                    stats.groups_resolved += 1;
                    stats.files_kept += 1;
                    log::debug!(
                        "keeping {} (rank {})",
                        decision.keep.display(),
                        decision.keep_rank
                    );
                    for path in &decision.delete {
                        stats.files_marked += 1;
                        self.delete_candidate(path, &mut stats);
                    }
                }
            }

            if stats.groups_scanned % PROGRESS_INTERVAL == 0 {
                if let Some(progress) = self.progress {
                    progress.on_batch(stats.groups_scanned, &stats);
                }
                log::info!(
                    "processed {} group(s): {} marked, {} freed",
                    stats.groups_scanned,
                    stats.files_marked,
                    ByteSize(stats.bytes_freed)
                );
            }
        }

        stats.elapsed_secs = start.elapsed().as_secs_f64();
        if let Some(progress) = self.progress {
            progress.on_finish(&stats);
        }
        Ok(stats)
    }

    /// Delete (or simulate deleting) one candidate.
    fn delete_candidate(&self, path: &Path, stats: &mut RunStatistics) {
        // Size is read immediately before deletion, best-effort: a failed
        // read contributes 0 bytes, never an abort.
        let size = match fs::symlink_metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                stats.files_not_found += 1;
                log::debug!("not found (removed by a prior run?): {}", path.display());
                return;
            }
            Err(e) => {
                log::warn!("cannot stat {}: {}", path.display(), e);
                0
            }
        };

        if !self.apply {
            stats.files_deleted += 1;
            stats.bytes_freed += size;
            log::info!("would delete {} ({})", path.display(), ByteSize(size));
            return;
        }

        match fs::remove_file(path) {
            Ok(()) => {
                stats.files_deleted += 1;
                stats.bytes_freed += size;
                log::info!("deleted {} ({})", path.display(), ByteSize(size));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Raced away between the stat and the delete.
                stats.files_not_found += 1;
                log::debug!("not found at delete time: {}", path.display());
            }
            Err(e) => {
                stats.delete_failures += 1;
                log::error!("failed to delete {}: {}", path.display(), e);
            }
        }
    }
}
