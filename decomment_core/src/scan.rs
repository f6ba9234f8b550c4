//! Parallel comment harvesting across a file set.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::harvest::{Comment, Harvester};
use crate::language::LanguageRegistry;
use crate::source::SourceFile;
use crate::Error;

/// A file the scan gave up on, with the reason it was skipped.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Path of the skipped file.
    pub path: String,
    /// Human-readable reason for the skip.
    pub reason: String,
}

/// Aggregate result of scanning a file set.
///
/// Files that yielded zero comments are omitted from the mapping. The
/// mapping is ordered by path so repeated scans of an unchanged tree
/// produce identical output.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Comments found, grouped by file path.
    pub comments: BTreeMap<String, Vec<Comment>>,
    /// Files skipped due to per-file failures.
    pub skipped: Vec<SkippedFile>,
}

impl ScanOutcome {
    /// Total number of comments across all files.
    #[must_use]
    pub fn total_comments(&self) -> usize {
        self.comments.values().map(Vec::len).sum()
    }

    /// Flatten the aggregate into a single list, grouped by path.
    #[must_use]
    pub fn into_comments(self) -> Vec<Comment> {
        self.comments.into_values().flatten().collect()
    }
}

/// Harvest comments from every file, one parallel task per file.
///
/// Tasks are independent; each operates on its own immutable content
/// buffer and only the aggregate is shared, guarded by a mutex. The call
/// returns once every task has completed. Per-file failures are isolated:
/// a file with no registered grammar is silently excluded, and a file
/// that fails to parse is recorded as skipped. Neither aborts the batch.
#[must_use]
pub fn scan(files: &[SourceFile], registry: &LanguageRegistry) -> ScanOutcome {
    let outcome = Mutex::new(ScanOutcome::default());

    files.par_iter().for_each(|file| {
        let harvester = match Harvester::for_file(file, registry) {
            Ok(harvester) => harvester,
            Err(Error::UnsupportedLanguage { path }) => {
                debug!(path = %path, "no grammar registered; excluding file");
                return;
            }
            Err(err) => {
                record_skip(&outcome, &file.path, &err);
                return;
            }
        };

        match harvester.harvest(file) {
            Ok(comments) => {
                if comments.is_empty() {
                    return;
                }
                debug!(path = %file.path, count = comments.len(), "comments found");
                let mut guard = outcome.lock().unwrap_or_else(PoisonError::into_inner);
                guard.comments.insert(file.path.clone(), comments);
            }
            Err(err) => record_skip(&outcome, &file.path, &err),
        }
    });

    outcome.into_inner().unwrap_or_else(PoisonError::into_inner)
}

fn record_skip(outcome: &Mutex<ScanOutcome>, path: &str, err: &Error) {
    warn!(path, error = %err, "skipping file");
    let mut guard = outcome.lock().unwrap_or_else(PoisonError::into_inner);
    guard.skipped.push(SkippedFile {
        path: path.to_owned(),
        reason: err.to_string(),
    });
}
