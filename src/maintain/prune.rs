//! Empty-directory pruning.
//!
//! A contents-first walk removes directories with no entries; removing a
//! child can empty its parent, which the bottom-up order handles in a
//! single pass. Dry-run tracks would-be removals so nested empties are
//! counted identically in both modes.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::cli::PruneArgs;
use crate::error::{ConfigError, ExitCode};

/// Counters for one prune pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Directories removed (or that would be removed).
    pub dirs_removed: usize,
    /// Removals that failed.
    pub failures: usize,
}

/// Prune empty directories under a root. The root itself is never removed.
pub fn prune_tree(root: &Path, apply: bool) -> PruneStats {
    let mut stats = PruneStats::default();
    // Dirs already removed (or marked in dry-run); a dir whose remaining
    // entries are all in here counts as empty.
    let mut removed: HashSet<PathBuf> = HashSet::new();

    for entry in WalkDir::new(root).contents_first(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("walk error under {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if !is_effectively_empty(path, &removed) {
            continue;
        }

        if apply {
            if let Err(e) = fs::remove_dir(path) {
                stats.failures += 1;
                log::error!("failed to remove {}: {}", path.display(), e);
                continue;
            }
            log::info!("pruned empty dir: {}", path.display());
        } else {
            log::info!("would prune empty dir: {}", path.display());
        }

        removed.insert(path.to_path_buf());
        stats.dirs_removed += 1;
    }

    stats
}

/// A directory is effectively empty when every entry it still has was
/// already removed (or marked) by this pass.
fn is_effectively_empty(dir: &Path, removed: &HashSet<PathBuf>) -> bool {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .all(|e| removed.contains(&e.path())),
        Err(e) => {
            log::warn!("cannot read {}: {}", dir.display(), e);
            false
        }
    }
}

/// Run the prune subcommand across all roots.
///
/// # Errors
///
/// Returns a [`ConfigError`] for a root that is not a directory.
pub fn run(args: &PruneArgs) -> Result<ExitCode> {
    // Configuration errors are fatal: reject every bad root before
    // touching any tree.
    for root in &args.roots {
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory(root.clone()).into());
        }
    }

    let mut total = PruneStats::default();
    for root in &args.roots {
        let stats = prune_tree(root, args.apply);
        log::info!("{}: {} empty dir(s)", root.display(), stats.dirs_removed);
        total.dirs_removed += stats.dirs_removed;
        total.failures += stats.failures;
    }

    let verb = if args.apply { "removed" } else { "would remove" };
    println!(
        "Summary: {} {} empty dir(s), {} failure(s)",
        verb, total.dirs_removed, total.failures
    );

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_prune_removes_empty_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::create_dir(dir.path().join("full")).unwrap();
        File::create(dir.path().join("full/f.txt")).unwrap();

        let stats = prune_tree(dir.path(), true);
        assert_eq!(stats.dirs_removed, 1);
        assert!(!dir.path().join("empty").exists());
        assert!(dir.path().join("full").exists());
    }

    #[test]
    fn test_prune_cascades_to_parents() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();

        let stats = prune_tree(dir.path(), true);
        assert_eq!(stats.dirs_removed, 3);
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn test_prune_dry_run_counts_cascade() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();

        let stats = prune_tree(dir.path(), false);
        // Dry-run must count the same cascade apply would remove.
        assert_eq!(stats.dirs_removed, 3);
        assert!(dir.path().join("a/b/c").exists());
    }

    #[test]
    fn test_prune_keeps_root() {
        let dir = tempdir().unwrap();
        let stats = prune_tree(dir.path(), true);
        assert_eq!(stats.dirs_removed, 0);
        assert!(dir.path().exists());
    }

    #[test]
    fn test_run_rejects_bad_root_before_any_removal() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let args = crate::cli::PruneArgs {
            roots: vec![dir.path().to_path_buf(), dir.path().join("missing")],
            apply: true,
        };
        let err = run(&args).err().unwrap();
        assert!(err.downcast_ref::<ConfigError>().is_some());

        // Roots listed before the bad one must be untouched.
        assert!(dir.path().join("empty").exists());
    }

    #[test]
    fn test_prune_partial_cascade_stops_at_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        File::create(dir.path().join("a/keep.txt")).unwrap();

        let stats = prune_tree(dir.path(), true);
        assert_eq!(stats.dirs_removed, 2); // b and c, not a
        assert!(dir.path().join("a/keep.txt").exists());
    }
}
