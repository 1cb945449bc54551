//! Duplicate-report parsing.
//!
//! # Overview
//!
//! An external duplicate detector (fdupes, rdfind, jdupes, ...) produces a
//! textual report where each group of identical files is a contiguous run
//! of absolute path lines. This module turns that report into a lazy,
//! single-pass sequence of [`DuplicateGroup`] values.
//!
//! # Report format
//!
//! - Lines beginning with the path separator are file-path entries.
//! - A blank line, or a boundary-marker line (bracketed timestamp or bare
//!   leading digit sequence, as emitted by detector log headers), closes
//!   the current group.
//! - Any other line is ignored; malformed input is never an error.
//! - A trailing group not closed by a final blank line is still emitted
//!   at end of stream.
//! - Groups with fewer than 2 paths carry no decision and are dropped
//!   (counted, not emitted).

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use regex::Regex;

use crate::error::ConfigError;

/// Boundary-marker pattern: a bracketed timestamp (`[2024-...`) or a bare
/// leading digit sequence, mirroring detector log-header conventions.
const BOUNDARY_PATTERN: &str = r"^\[?\d";

/// An ordered group of absolute file paths with identical content.
///
/// Order is preserved from the report; the resolver's tie-break depends
/// on it. A group always holds at least 2 paths once emitted by the
/// reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Member paths, in report order.
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a group from member paths.
    #[must_use]
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Number of member paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Streaming reader over a duplicate report.
///
/// Implements [`Iterator`] yielding `io::Result<DuplicateGroup>`; the
/// stream is consumed once and the reader is not restartable.
pub struct ReportReader<R: BufRead> {
    lines: io::Lines<R>,
    boundary: Regex,
    pending: Vec<PathBuf>,
    done: bool,
    singletons_dropped: usize,
}

impl ReportReader<BufReader<File>> {
    /// Open a report file for streaming.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReportUnreadable`] if the file cannot be
    /// opened; this is fatal and happens before any mutation.
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::ReportUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReportReader<R> {
    /// Create a reader over any buffered text stream.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            // Pattern is a compile-time constant; it cannot fail to parse.
            boundary: Regex::new(BOUNDARY_PATTERN).expect("boundary pattern is valid"),
            pending: Vec::new(),
            done: false,
            singletons_dropped: 0,
        }
    }

    /// Number of single-entry groups dropped so far.
    ///
    /// A group with one path is nothing duplicated; it is counted here
    /// rather than emitted.
    #[must_use]
    pub fn singletons_dropped(&self) -> usize {
        self.singletons_dropped
    }

    /// Close the pending group, dropping singletons.
    fn take_group(&mut self) -> Option<DuplicateGroup> {
        if self.pending.is_empty() {
            return None;
        }
        let paths = std::mem::take(&mut self.pending);
        if paths.len() < 2 {
            self.singletons_dropped += 1;
            log::trace!("dropped single-entry group: {}", paths[0].display());
            return None;
        }
        Some(DuplicateGroup::new(paths))
    }

    /// Classify a line as a path entry.
    fn is_path_line(line: &str) -> bool {
        line.starts_with(MAIN_SEPARATOR)
    }
}

impl<R: BufRead> Iterator for ReportReader<R> {
    type Item = io::Result<DuplicateGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.lines.next() {
                None => {
                    // Flush-on-end: a trailing unterminated group still counts.
                    self.done = true;
                    return self.take_group().map(Ok);
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(line)) => {
                    let line = line.trim_end();
                    if line.is_empty() || self.boundary.is_match(line) {
                        if let Some(group) = self.take_group() {
                            return Some(Ok(group));
                        }
                    } else if Self::is_path_line(line) {
                        self.pending.push(PathBuf::from(line));
                    }
                    // Anything else is detector noise; ignore it.
                }
            }
        }
    }
}
