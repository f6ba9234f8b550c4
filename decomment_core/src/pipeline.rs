//! End-to-end pipelines tying enumeration, scanning, and removal together.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::harvest::Comment;
use crate::language::LanguageRegistry;
use crate::removal::remove_comments;
use crate::scan::scan;
use crate::source::{ScanOptions, SourceProvider};
use crate::{Error, Result};

/// A file the removal pass failed to rewrite.
#[derive(Debug)]
pub struct RemovalFailure {
    /// Path of the file that could not be rewritten.
    pub path: String,
    /// Error that stopped the rewrite.
    pub error: Error,
}

/// Aggregate outcome of a removal pass.
#[derive(Debug, Default)]
pub struct TrashReport {
    /// Number of files rewritten successfully.
    pub files_changed: usize,
    /// Number of comments removed across all files.
    pub comments_removed: usize,
    /// Files that could not be rewritten, with their errors.
    pub failures: Vec<RemovalFailure>,
}

/// Enumerate files, harvest their comments, and return the result as a
/// single list grouped by file path.
///
/// Per-file harvesting failures are reported and skipped inside the
/// orchestrator; only enumeration failures abort the pipeline.
///
/// # Errors
///
/// Propagates any error from the source provider, since no file list
/// means nothing downstream can run.
pub fn scan_pipeline(
    provider: &dyn SourceProvider,
    registry: &LanguageRegistry,
    options: &ScanOptions,
) -> Result<Vec<Comment>> {
    let files = provider.files(options)?;
    let file_count = files.len();

    let outcome = scan(&files, registry);
    info!(
        files = file_count,
        files_with_comments = outcome.comments.len(),
        comments = outcome.total_comments(),
        skipped = outcome.skipped.len(),
        "scan complete"
    );

    Ok(outcome.into_comments())
}

/// Delete the given comments from disk, one file at a time.
///
/// Comments are grouped by file path and handed to the removal engine in
/// one batch per file; a failure on one file is recorded and does not
/// stop the others. Removal has no rollback, so callers must confirm
/// the selection before invoking this.
#[must_use]
pub fn trash_pipeline(comments: Vec<Comment>) -> TrashReport {
    let mut tasks: BTreeMap<String, Vec<Comment>> = BTreeMap::new();
    for comment in comments {
        tasks.entry(comment.path.clone()).or_default().push(comment);
    }

    let mut report = TrashReport::default();
    for (path, batch) in tasks {
        match remove_comments(Path::new(&path), &batch) {
            Ok(()) => {
                info!(path = %path, removed = batch.len(), "comments removed");
                report.files_changed += 1;
                report.comments_removed += batch.len();
            }
            Err(error) => {
                warn!(path = %path, error = %error, "failed to remove comments");
                report.failures.push(RemovalFailure { path, error });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FileStatus, SourceFile};

    struct FixedProvider {
        files: Vec<SourceFile>,
    }

    impl SourceProvider for FixedProvider {
        fn files(&self, _options: &ScanOptions) -> Result<Vec<SourceFile>> {
            Ok(self.files.clone())
        }
    }

    struct FailingProvider;

    impl SourceProvider for FailingProvider {
        fn files(&self, _options: &ScanOptions) -> Result<Vec<SourceFile>> {
            Err(Error::NotARepository {
                path: "nowhere".to_owned(),
            })
        }
    }

    fn python_file(path: &str, content: &str) -> SourceFile {
        SourceFile {
            path: path.to_owned(),
            status: FileStatus::Added,
            content: content.as_bytes().to_vec(),
            diff_ranges: Vec::new(),
        }
    }

    #[test]
    fn scan_pipeline_flattens_grouped_by_path() {
        let provider = FixedProvider {
            files: vec![
                python_file("b.py", "# b1\n# b2\n"),
                python_file("a.py", "# a1\n"),
            ],
        };
        let registry = LanguageRegistry::builtin();

        let comments =
            scan_pipeline(&provider, &registry, &ScanOptions::default()).expect("pipeline");

        let paths: Vec<_> = comments.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["a.py", "b.py", "b.py"]);
    }

    #[test]
    fn enumeration_failure_aborts_the_pipeline() {
        let registry = LanguageRegistry::builtin();
        let err = scan_pipeline(&FailingProvider, &registry, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotARepository { .. }));
    }

    #[test]
    fn trash_pipeline_reports_missing_files_without_aborting() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let real = temp.path().join("real.py");
        std::fs::write(&real, "# gone\nx = 1\n").expect("write");

        let comments = vec![
            Comment {
                path: real.display().to_string(),
                text: "# gone".to_owned(),
                line: 1,
                start_byte: 0,
                end_byte: 6,
            },
            Comment {
                path: temp.path().join("missing.py").display().to_string(),
                text: "# nope".to_owned(),
                line: 1,
                start_byte: 0,
                end_byte: 6,
            },
        ];

        let report = trash_pipeline(comments);

        assert_eq!(report.files_changed, 1);
        assert_eq!(report.comments_removed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].error, Error::Io { .. }));
        assert_eq!(
            std::fs::read_to_string(&real).expect("read"),
            "x = 1\n"
        );
    }

    #[test]
    fn trash_pipeline_on_empty_input_is_a_clean_noop() {
        let report = trash_pipeline(Vec::new());
        assert_eq!(report.files_changed, 0);
        assert_eq!(report.comments_removed, 0);
        assert!(report.failures.is_empty());
    }
}
