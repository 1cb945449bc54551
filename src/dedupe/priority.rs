//! Folder-priority ranking and keep/delete decisions.
//!
//! # Overview
//!
//! Given an ordered list of folder identifiers (rank 0 = most preferred),
//! each path in a duplicate group is assigned the rank of the first
//! identifier it matches. Exactly one member — the one with the smallest
//! rank, first-in-group on ties — survives; the rest become delete
//! candidates. Groups where nothing matches any identifier produce no
//! decision at all.
//!
//! # Matching semantics
//!
//! An identifier matches a path when it equals a folder-path component
//! (preferred) or merely appears as a substring of the path (fallback).
//! The substring fallback is deliberately naive: an identifier like
//! `backup` also matches `/data/backup12/f`, and downstream behavior
//! depends on this exact first-match-wins rule. Do not make it smarter;
//! changing the match semantics changes which file survives.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::dedupe::report::DuplicateGroup;
use crate::error::ConfigError;

/// Maximum number of report path lines scanned during auto-detection.
pub const AUTO_SCAN_LINES: usize = 100;

/// Maximum number of identifiers kept by auto-detection.
pub const AUTO_LIST_CAP: usize = 10;

/// Ordered list of folder identifiers; position = priority rank.
///
/// Identifiers not in the list are "unranked", which is lower priority
/// than any listed rank. An explicitly supplied empty list is legal:
/// every path is unranked and every group gets skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityList {
    idents: Vec<String>,
}

impl PriorityList {
    /// Build a list from an explicit comma-separated specification.
    ///
    /// Order is preserved and duplicates are kept as-is; first occurrence
    /// wins at lookup time regardless. Empty segments are dropped (an
    /// empty identifier would substring-match every path).
    #[must_use]
    pub fn from_spec(spec: &str) -> Self {
        let idents = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { idents }
    }

    /// Build a list from pre-ordered identifiers.
    #[must_use]
    pub fn from_idents(idents: Vec<String>) -> Self {
        Self { idents }
    }

    /// Auto-detect a priority list from the report itself.
    ///
    /// Scans up to [`AUTO_SCAN_LINES`] path lines, takes each path's
    /// parent-folder basename, ranks the basenames by descending
    /// frequency (ties keep first-seen order) and keeps the top
    /// [`AUTO_LIST_CAP`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReportUnreadable`] if the report cannot be opened.
    /// - [`ConfigError::NoPriorityCandidates`] if no folder basename was
    ///   found; without at least one ranked identifier no decision can
    ///   ever be made, so this is fatal.
    pub fn auto_detect(report: &Path) -> Result<Self, ConfigError> {
        let file = File::open(report).map_err(|source| ConfigError::ReportUnreadable {
            path: report.to_path_buf(),
            source,
        })?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();
        let mut scanned = 0usize;

        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(l) => l,
                // Read noise mid-scan is not worth aborting auto-detection over.
                Err(e) => {
                    log::warn!("stopping auto-detection early: {}", e);
                    break;
                }
            };
            let line = line.trim_end();
            if !line.starts_with(std::path::MAIN_SEPARATOR) {
                continue;
            }

            if let Some(basename) = parent_basename(Path::new(line)) {
                if !counts.contains_key(&basename) {
                    first_seen.push(basename.clone());
                }
                *counts.entry(basename).or_insert(0) += 1;
            }

            scanned += 1;
            if scanned >= AUTO_SCAN_LINES {
                break;
            }
        }

        if counts.is_empty() {
            return Err(ConfigError::NoPriorityCandidates);
        }

        // Stable sort on first-seen order, so equal frequencies keep it.
        let mut idents = first_seen;
        idents.sort_by_key(|name| std::cmp::Reverse(counts[name]));
        idents.truncate(AUTO_LIST_CAP);

        log::info!(
            "auto-detected priority list from {} path line(s): {}",
            scanned,
            idents.join(", ")
        );

        Ok(Self { idents })
    }

    /// The ordered identifiers.
    #[must_use]
    pub fn idents(&self) -> &[String] {
        &self.idents
    }

    /// Number of identifiers in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.idents.len()
    }

    /// Check if the list holds no identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }

    /// Resolve the priority rank of a path.
    ///
    /// Iterates the list in rank order and returns the index of the first
    /// identifier the path contains as a folder-path component or as a
    /// plain substring. `None` means unranked (conceptually +infinity).
    ///
    /// Deterministic for a given list and path.
    #[must_use]
    pub fn rank(&self, path: &Path) -> Option<usize> {
        let text = path.to_string_lossy();
        self.idents.iter().position(|ident| {
            path.components()
                .any(|c| c.as_os_str() == ident.as_str())
                || text.contains(ident.as_str())
        })
    }
}

/// Basename of a path's parent directory, if it has one.
fn parent_basename(path: &Path) -> Option<String> {
    path.parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
}

/// A group member with its resolved rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Path from the duplicate group.
    pub path: PathBuf,
    /// Resolved rank; `None` is unranked.
    pub rank: Option<usize>,
}

/// The keep/delete outcome for one duplicate group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The single surviving path.
    pub keep: PathBuf,
    /// Rank of the survivor.
    pub keep_rank: usize,
    /// Every other group member, in report order.
    pub delete: Vec<PathBuf>,
}

/// Compute the keep/delete decision for one group.
///
/// Pure function of its inputs; no I/O happens here. Returns `None` when
/// the group is skipped: fewer than 2 members, or no member resolves to
/// any ranked identifier. A skipped group is distinct from a kept group
/// with zero deletions — the latter cannot occur.
#[must_use]
pub fn resolve(group: &DuplicateGroup, priorities: &PriorityList) -> Option<Decision> {
    if group.len() < 2 {
        return None;
    }

    let candidates: Vec<FileCandidate> = group
        .paths
        .iter()
        .map(|path| FileCandidate {
            path: path.clone(),
            rank: priorities.rank(path),
        })
        .collect();

    let mut best: Option<(usize, usize)> = None; // (rank, index into group)
    for (idx, candidate) in candidates.iter().enumerate() {
        if let Some(rank) = candidate.rank {
            // Strictly-smaller comparison keeps the first occurrence on ties.
            if best.is_none_or(|(best_rank, _)| rank < best_rank) {
                best = Some((rank, idx));
            }
        }
    }

    let (keep_rank, keep_idx) = best?;
    let delete = candidates
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != keep_idx)
        .map(|(_, candidate)| candidate.path.clone())
        .collect();

    Some(Decision {
        keep: candidates[keep_idx].path.clone(),
        keep_rank,
        delete,
    })
}
