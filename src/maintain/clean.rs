//! Junk file and directory cleanup.
//!
//! Walks backup tree roots and removes entries whose names match a
//! built-in junk set plus any user-supplied glob patterns. Matched
//! directories are removed whole; the walker does not descend into them.
//! Per-entry failures are logged and isolated, never aborting the run.

use std::fs;
use std::path::Path;

use anyhow::Result;
use bytesize::ByteSize;
use globset::GlobSet;
use walkdir::WalkDir;

use crate::cli::CleanArgs;
use crate::error::{ConfigError, ExitCode};
use crate::maintain::build_globset;

/// Names removed by default: tool caches, OS metadata droppings, and
/// temp-file leftovers commonly found in copied-around backup trees.
pub const DEFAULT_JUNK: &[&str] = &[
    "node_modules",
    "__pycache__",
    ".cache",
    ".Trash",
    ".Trashes",
    "$RECYCLE.BIN",
    "System Volume Information",
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    "*.tmp",
    "*~",
];

/// Counters for one clean pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Junk directories removed (each with its whole subtree).
    pub dirs_removed: usize,
    /// Junk files removed individually.
    pub files_removed: usize,
    /// Bytes freed, best-effort sizes.
    pub bytes_freed: u64,
    /// Removals that failed.
    pub failures: usize,
}

/// Compile the junk matcher from the built-in set plus extra patterns.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPattern`] for an uncompilable pattern.
pub fn junk_matcher(extra_patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut patterns: Vec<String> = DEFAULT_JUNK.iter().map(|s| s.to_string()).collect();
    patterns.extend_from_slice(extra_patterns);
    build_globset(&patterns)
}

/// Clean one tree root.
///
/// Matching is against entry basenames. In dry-run mode the same matches
/// are counted and logged, and nothing is removed.
pub fn clean_tree(root: &Path, matcher: &GlobSet, apply: bool) -> CleanStats {
    let mut stats = CleanStats::default();
    let mut it = WalkDir::new(root).into_iter();

    while let Some(entry) = it.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("walk error under {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !matcher.is_match(name.as_ref()) {
            continue;
        }

        let path = entry.path();
        if entry.file_type().is_dir() {
            let size = subtree_size(path);
            remove(path, true, apply, size, &mut stats);
            // The subtree goes with the directory; don't walk into it.
            it.skip_current_dir();
        } else {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            remove(path, false, apply, size, &mut stats);
        }
    }

    stats
}

fn remove(path: &Path, is_dir: bool, apply: bool, size: u64, stats: &mut CleanStats) {
    let verb = if apply { "removing" } else { "would remove" };
    let kind = if is_dir { "junk dir" } else { "junk file" };
    log::info!("{} {}: {} ({})", verb, kind, path.display(), ByteSize(size));

    if apply {
        let result = if is_dir {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        if let Err(e) = result {
            stats.failures += 1;
            log::error!("failed to remove {}: {}", path.display(), e);
            return;
        }
    }

    if is_dir {
        stats.dirs_removed += 1;
    } else {
        stats.files_removed += 1;
    }
    stats.bytes_freed += size;
}

/// Best-effort total size of all files under a directory.
fn subtree_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Run the clean subcommand across all roots.
///
/// # Errors
///
/// Returns a [`ConfigError`] for a root that is not a directory or a bad
/// junk pattern; per-entry removal failures are counted instead.
pub fn run(args: &CleanArgs) -> Result<ExitCode> {
    let matcher = junk_matcher(&args.junk_patterns)?;

    // Configuration errors are fatal: reject every bad root before
    // touching any tree.
    for root in &args.roots {
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory(root.clone()).into());
        }
    }

    let mut total = CleanStats::default();
    for root in &args.roots {
        let stats = clean_tree(root, &matcher, args.apply);
        log::info!(
            "{}: {} dir(s), {} file(s), {} freed",
            root.display(),
            stats.dirs_removed,
            stats.files_removed,
            ByteSize(stats.bytes_freed)
        );
        total.dirs_removed += stats.dirs_removed;
        total.files_removed += stats.files_removed;
        total.bytes_freed += stats.bytes_freed;
        total.failures += stats.failures;
    }

    let verb = if args.apply { "removed" } else { "would remove" };
    println!(
        "Summary: {} {} junk dir(s) and {} junk file(s), {} freed, {} failure(s)",
        verb,
        total.dirs_removed,
        total.files_removed,
        ByteSize(total.bytes_freed),
        total.failures
    );

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn touch(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap().write_all(content).unwrap();
    }

    #[test]
    fn test_clean_removes_junk_dir_whole() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("node_modules/pkg/index.js"), b"x");
        touch(&dir.path().join("docs/readme.md"), b"keep");

        let matcher = junk_matcher(&[]).unwrap();
        let stats = clean_tree(dir.path(), &matcher, true);

        assert_eq!(stats.dirs_removed, 1);
        assert!(!dir.path().join("node_modules").exists());
        assert!(dir.path().join("docs/readme.md").exists());
    }

    #[test]
    fn test_clean_removes_junk_files() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("photos/.DS_Store"), b"xx");
        touch(&dir.path().join("photos/scratch.tmp"), b"yyy");
        touch(&dir.path().join("photos/real.jpg"), b"keep");

        let matcher = junk_matcher(&[]).unwrap();
        let stats = clean_tree(dir.path(), &matcher, true);

        assert_eq!(stats.files_removed, 2);
        assert_eq!(stats.bytes_freed, 5);
        assert!(dir.path().join("photos/real.jpg").exists());
    }

    #[test]
    fn test_clean_dry_run_counts_without_removing() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a/Thumbs.db"), b"123");

        let matcher = junk_matcher(&[]).unwrap();
        let stats = clean_tree(dir.path(), &matcher, false);

        assert_eq!(stats.files_removed, 1);
        assert_eq!(stats.bytes_freed, 3);
        assert!(dir.path().join("a/Thumbs.db").exists());
    }

    #[test]
    fn test_clean_extra_patterns() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("old.bak"), b"x");
        touch(&dir.path().join("new.txt"), b"x");

        let matcher = junk_matcher(&["*.bak".to_string()]).unwrap();
        let stats = clean_tree(dir.path(), &matcher, true);

        assert_eq!(stats.files_removed, 1);
        assert!(!dir.path().join("old.bak").exists());
        assert!(dir.path().join("new.txt").exists());
    }

    #[test]
    fn test_clean_root_itself_never_matched() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("node_modules");
        touch(&root.join("inner.txt"), b"x");

        let matcher = junk_matcher(&[]).unwrap();
        let stats = clean_tree(&root, &matcher, true);

        // Depth-0 entry is the root; it is never a candidate.
        assert_eq!(stats.dirs_removed, 0);
        assert!(root.exists());
    }

    #[test]
    fn test_run_rejects_bad_root_before_any_removal() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("node_modules/pkg/index.js"), b"x");

        let args = crate::cli::CleanArgs {
            roots: vec![dir.path().to_path_buf(), dir.path().join("missing")],
            apply: true,
            junk_patterns: vec![],
        };
        let err = run(&args).err().unwrap();
        assert!(err.downcast_ref::<ConfigError>().is_some());

        // Roots listed before the bad one must be untouched.
        assert!(dir.path().join("node_modules/pkg/index.js").exists());
    }

    #[test]
    fn test_subtree_size() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a/f1"), b"12345");
        touch(&dir.path().join("a/b/f2"), b"123");
        assert_eq!(subtree_size(&dir.path().join("a")), 8);
    }
}
