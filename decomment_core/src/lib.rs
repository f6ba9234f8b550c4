//! Core library for decomment's scan-and-remove workflow.
//!
//! The crate is layered around four primary responsibilities:
//! - line-level diffing to find the added portion of a changed file
//! - tree-sitter based harvesting of comment tokens
//! - concurrent orchestration of harvesting across a file set
//! - byte-precise, atomic removal of selected comments from disk
//!
//! File enumeration is provided by a git-backed [`source::SourceProvider`],
//! and per-language grammars come from an explicitly constructed
//! [`language::LanguageRegistry`].

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

/// Added-line computation between two revisions of a file's content.
pub mod diff;
/// Comment extraction from parsed syntax trees.
pub mod harvest;
/// Mapping of file extensions to tree-sitter grammars.
pub mod language;
/// End-to-end scan and removal pipelines.
pub mod pipeline;
/// Deletion of comment spans from files on disk.
pub mod removal;
/// Parallel harvesting across a file set.
pub mod scan;
/// File enumeration backed by a git repository.
pub mod source;

pub use diff::{added_ranges, LineRange};
pub use harvest::{Comment, Harvester};
pub use language::LanguageRegistry;
pub use pipeline::{scan_pipeline, trash_pipeline, TrashReport};
pub use scan::{scan, ScanOutcome, SkippedFile};
pub use source::{FileStatus, GitSource, ScanMode, ScanOptions, SourceFile, SourceProvider};

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No grammar is registered for the file's extension.
    #[error("unsupported file type: {path}")]
    UnsupportedLanguage {
        /// File whose extension has no registered grammar.
        path: String,
    },
    /// The file's content could not be parsed with its grammar.
    #[error("failed to parse {path}")]
    Parse {
        /// File that could not be parsed.
        path: String,
    },
    /// Underlying git operation failed.
    #[error("git error: {source}")]
    Git {
        /// Original libgit2 error bubbled up by the core library.
        #[from]
        source: git2::Error,
    },
    /// Provided path does not correspond to a git repository.
    #[error("path does not reference a git repository: {path}")]
    NotARepository {
        /// Path that failed to resolve to a repository.
        path: String,
    },
    /// Bare repositories are currently unsupported.
    #[error("repository at {path} is bare and unsupported")]
    BareRepository {
        /// Path of the repository lacking a working tree.
        path: String,
    },
    /// A revision named in the scan options could not be resolved.
    #[error("failed to resolve revision {revision}: {source}")]
    RevisionResolution {
        /// Revision string as supplied by the caller.
        revision: String,
        /// Underlying git error.
        #[source]
        source: git2::Error,
    },
    /// The target revision does not descend from the base revision.
    #[error("target {target} must be equal to or a descendant of base {base}")]
    CommitOrder {
        /// Base revision as supplied by the caller.
        base: String,
        /// Target revision as supplied by the caller.
        target: String,
    },
    /// A comment span no longer fits inside the file it refers to.
    #[error("comment span is stale for {path}; file changed since the scan")]
    StaleComment {
        /// File whose content no longer matches the scanned buffer.
        path: String,
    },
    /// Filesystem interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
}
