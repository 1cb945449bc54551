//! Backup-tree maintenance utilities.
//!
//! The non-core siblings of the dedupe pipeline. They share its
//! conventions - dry-run by default, per-entry fault isolation, a final
//! statistics summary - but the dedupe core does not depend on them.
//!
//! - [`clean`]: remove junk files and directories
//! - [`archive`]: write a compressed tar.gz of a tree with exclusions
//! - [`merge`]: merge a tree into a destination tree (destination wins)
//! - [`prune`]: remove empty directories bottom-up

pub mod archive;
pub mod clean;
pub mod merge;
pub mod prune;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;

/// Compile glob patterns into a matcher.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPattern`] for the first pattern that
/// fails to compile; this is fatal and happens before any mutation.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::InvalidPattern {
        pattern: patterns.join(","),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_globset_matches_names() {
        let set = build_globset(&["*.tmp".to_string(), "node_modules".to_string()]).unwrap();
        assert!(set.is_match("junk.tmp"));
        assert!(set.is_match("node_modules"));
        assert!(!set.is_match("keep.txt"));
    }

    #[test]
    fn test_build_globset_invalid_pattern() {
        let err = build_globset(&["[".to_string()]).err().unwrap();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_build_globset_empty_matches_nothing() {
        let set = build_globset(&[]).unwrap();
        assert!(!set.is_match("anything"));
    }
}
