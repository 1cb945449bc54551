//! Progress reporting utilities using indicatif.
//!
//! The executor calls back after every fixed batch of groups; this module
//! renders those events as a terminal spinner. Quiet mode suppresses all
//! rendering while leaving the decision pipeline untouched.

use std::sync::Mutex;
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::dedupe::executor::RunStatistics;

/// Progress callback for the dedupe pipeline.
///
/// Implement this trait to receive batch updates during the executor
/// pass. The executor fires `on_batch` after every fixed number of groups
/// and `on_finish` once at the end.
pub trait ProgressCallback: Send + Sync {
    /// Called after each batch of groups.
    ///
    /// # Arguments
    ///
    /// * `groups` - Number of groups processed so far
    /// * `stats` - Running statistics snapshot
    fn on_batch(&self, groups: usize, stats: &RunStatistics);

    /// Called when the pass completes.
    fn on_finish(&self, stats: &RunStatistics);
}

/// Spinner-based progress reporter.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} groups")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn ensure_bar(&self) -> ProgressBar {
        let mut guard = self.bar.lock().unwrap();
        guard
            .get_or_insert_with(|| {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.set_message("Resolving duplicate groups");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            })
            .clone()
    }
}

impl ProgressCallback for Progress {
    fn on_batch(&self, groups: usize, stats: &RunStatistics) {
        if self.quiet {
            return;
        }
        let pb = self.ensure_bar();
        pb.set_position(groups as u64);
        pb.set_message(format!(
            "{} marked, {} freed",
            stats.files_marked,
            ByteSize(stats.bytes_freed)
        ));
    }

    fn on_finish(&self, stats: &RunStatistics) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.bar.lock().unwrap().take() {
            pb.finish_with_message(format!(
                "{} group(s) processed",
                stats.groups_scanned
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_progress_is_inert() {
        let progress = Progress::new(true);
        let stats = RunStatistics::default();
        progress.on_batch(100, &stats);
        progress.on_finish(&stats);
        assert!(progress.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_batch_then_finish_clears_bar() {
        let progress = Progress::new(false);
        let stats = RunStatistics::default();
        progress.on_batch(100, &stats);
        assert!(progress.bar.lock().unwrap().is_some());
        progress.on_finish(&stats);
        assert!(progress.bar.lock().unwrap().is_none());
    }
}
