//! Folder-tree merging with destination priority.
//!
//! Every file in the source tree is copied to the same relative location
//! under the destination, except where the destination already has a file
//! there - existing destination files always win, and the source copy is
//! counted as a conflict and left alone. Dry-run computes the identical
//! plan without copying.

use std::fs;
use std::path::Path;

use anyhow::Result;
use bytesize::ByteSize;
use walkdir::WalkDir;

use crate::cli::MergeArgs;
use crate::error::{ConfigError, ExitCode};

/// Counters for one merge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Files copied (or that would be copied).
    pub files_copied: usize,
    /// Source files skipped because the destination already has them.
    pub conflicts: usize,
    /// Bytes copied, best-effort sizes.
    pub bytes_copied: u64,
    /// Copies that failed.
    pub failures: usize,
}

/// Merge `source` into `dest`.
pub fn merge_tree(source: &Path, dest: &Path, apply: bool) -> MergeStats {
    let mut stats = MergeStats::default();

    for entry in WalkDir::new(source) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("walk error under {}: {}", source.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let rel = match path.strip_prefix(source) {
            Ok(r) => r,
            Err(_) => continue, // walker never leaves the source root
        };
        let target = dest.join(rel);

        if target.symlink_metadata().is_ok() {
            stats.conflicts += 1;
            log::debug!("destination wins, skipping {}", rel.display());
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if apply {
            if let Err(e) = copy_file(path, &target) {
                stats.failures += 1;
                log::error!("failed to copy {}: {}", rel.display(), e);
                continue;
            }
            log::info!("copied {} ({})", rel.display(), ByteSize(size));
        } else {
            log::info!("would copy {} ({})", rel.display(), ByteSize(size));
        }
        stats.files_copied += 1;
        stats.bytes_copied += size;
    }

    stats
}

fn copy_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

/// Run the merge subcommand.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the source is not a directory.
pub fn run(args: &MergeArgs) -> Result<ExitCode> {
    if !args.source.is_dir() {
        return Err(ConfigError::NotADirectory(args.source.clone()).into());
    }

    let stats = merge_tree(&args.source, &args.dest, args.apply);

    let verb = if args.apply { "copied" } else { "would copy" };
    println!(
        "Summary: {} {} file(s) ({}), {} conflict(s) kept in destination, {} failure(s)",
        verb,
        stats.files_copied,
        ByteSize(stats.bytes_copied),
        stats.conflicts,
        stats.failures
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
    fn test_merge_copies_new_files() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        touch(&src.path().join("a/f1.txt"), b"one");
        touch(&src.path().join("f2.txt"), b"two");

        let stats = merge_tree(src.path(), dest.path(), true);

        assert_eq!(stats.files_copied, 2);
        assert_eq!(stats.conflicts, 0);
        assert_eq!(stats.bytes_copied, 6);
        assert_eq!(fs::read(dest.path().join("a/f1.txt")).unwrap(), b"one");
    }

    #[test]
    fn test_merge_destination_wins_on_conflict() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        touch(&src.path().join("f.txt"), b"source version");
        touch(&dest.path().join("f.txt"), b"dest version");

        let stats = merge_tree(src.path(), dest.path(), true);

        assert_eq!(stats.files_copied, 0);
        assert_eq!(stats.conflicts, 1);
        assert_eq!(fs::read(dest.path().join("f.txt")).unwrap(), b"dest version");
        // Source left alone
        assert!(src.path().join("f.txt").exists());
    }

    #[test]
    fn test_merge_dry_run_copies_nothing() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        touch(&src.path().join("f.txt"), b"data");

        let stats = merge_tree(src.path(), dest.path(), false);

        assert_eq!(stats.files_copied, 1);
        assert_eq!(stats.bytes_copied, 4);
        assert!(!dest.path().join("f.txt").exists());
    }

    #[test]
    fn test_merge_dry_run_and_apply_same_plan() {
        let src = tempdir().unwrap();
        let dest = tempdir().unwrap();
        touch(&src.path().join("new.txt"), b"n");
        touch(&src.path().join("sub/deep.txt"), b"d");
        touch(&src.path().join("clash.txt"), b"s");
        touch(&dest.path().join("clash.txt"), b"d");

        let dry = merge_tree(src.path(), dest.path(), false);
        let applied = merge_tree(src.path(), dest.path(), true);

        assert_eq!(dry.files_copied, applied.files_copied);
        assert_eq!(dry.conflicts, applied.conflicts);
        assert_eq!(dry.bytes_copied, applied.bytes_copied);
    }
}
