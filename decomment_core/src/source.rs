//! File enumeration backed by a git repository.
//!
//! The provider decides which files a scan looks at and, in incremental
//! mode, which of their lines count as new. Three enumeration paths
//! exist, mirroring the options surface: an explicit file list, a
//! base/target commit range, and the default working-tree status walk.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::{Delta, ErrorClass, ErrorCode, Repository, Status, StatusOptions, Tree};
use serde::{Deserialize, Serialize};

use crate::diff::{added_ranges, LineRange};
use crate::language::LanguageRegistry;
use crate::{Error, Result};

/// How a file relates to the baseline revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// File is newly added (staged or part of the target revision).
    Added,
    /// File exists on both sides with modifications.
    Modified,
    /// File is present on disk but unknown to the repository.
    Untracked,
    /// File was removed; never scanned.
    Deleted,
}

/// Whether a scan looks at whole files or only their added lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Harvest every comment in each file.
    WholeFile,
    /// Harvest only comments on lines added relative to the baseline.
    AddedLines,
}

/// Options controlling file enumeration.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Scan mode; defaults to added-lines.
    pub mode: ScanMode,
    /// Explicit files to scan, relative to the repository root. When
    /// non-empty, the commit range and working-tree paths are ignored.
    pub paths: Vec<PathBuf>,
    /// Base revision for a commit-range scan; defaults to HEAD.
    pub base: Option<String>,
    /// Target revision for a commit-range scan; defaults to HEAD.
    pub target: Option<String>,
    /// Include untracked files in working-tree scans.
    pub include_untracked: bool,
    /// Bypass ignore rules when enumerating files.
    pub include_ignored: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            mode: ScanMode::AddedLines,
            paths: Vec::new(),
            base: None,
            target: None,
            include_untracked: false,
            include_ignored: false,
        }
    }
}

/// A file selected for scanning.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path of the file. [`GitSource`] emits absolute paths so that
    /// removal works regardless of the process working directory.
    pub path: String,
    /// Relation of the file to the baseline revision.
    pub status: FileStatus,
    /// Exact content bytes that will be scanned.
    pub content: Vec<u8>,
    /// Added-line ranges; populated only for [`FileStatus::Modified`]
    /// files in [`ScanMode::AddedLines`] scans.
    pub diff_ranges: Vec<LineRange>,
}

/// Yields the files a scan should look at.
pub trait SourceProvider {
    /// Enumerate files according to the given options.
    ///
    /// # Errors
    ///
    /// Enumeration failures are fatal to the whole scan: if no file list
    /// can be produced, nothing downstream can run.
    fn files(&self, options: &ScanOptions) -> Result<Vec<SourceFile>>;
}

/// Git-backed source provider.
///
/// Files with no registered grammar are filtered out here, before any
/// content is read, so binary and unsupported files never reach the
/// harvester.
pub struct GitSource {
    inner: Repository,
    root: PathBuf,
    registry: LanguageRegistry,
}

impl GitSource {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be canonicalized, does not
    /// resolve to a git repository, or resolves to a bare repository.
    pub fn open(path: impl AsRef<Path>, registry: LanguageRegistry) -> Result<Self> {
        let original = path.as_ref();
        let canonical = std::fs::canonicalize(original).map_err(|source| Error::Io {
            path: display_path(original),
            source,
        })?;

        let repo = match Repository::discover(&canonical) {
            Ok(repo) => repo,
            Err(err)
                if err.class() == ErrorClass::Repository && err.code() == ErrorCode::NotFound =>
            {
                return Err(Error::NotARepository {
                    path: display_path(&canonical),
                })
            }
            Err(err) => return Err(Error::from(err)),
        };

        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::BareRepository {
                path: display_path(&canonical),
            })?;

        Ok(Self {
            inner: repo,
            root,
            registry,
        })
    }

    /// Returns the absolute path to the repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure `target` is equal to or a descendant of `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RevisionResolution`] when either revision cannot
    /// be resolved and [`Error::CommitOrder`] when the target does not
    /// descend from the base. Both are fatal to the invocation.
    pub fn validate_commit_order(&self, base: &str, target: &str) -> Result<()> {
        let base_commit = self.resolve_commit(base)?;
        let target_commit = self.resolve_commit(target)?;

        if base_commit.id() == target_commit.id() {
            return Ok(());
        }

        if self
            .inner
            .graph_descendant_of(target_commit.id(), base_commit.id())?
        {
            Ok(())
        } else {
            Err(Error::CommitOrder {
                base: base.to_owned(),
                target: target.to_owned(),
            })
        }
    }

    fn explicit_files(&self, options: &ScanOptions) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();

        for path in &options.paths {
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if !self.registry.supports(relative) {
                continue;
            }
            if !options.include_ignored && self.inner.is_path_ignored(relative)? {
                continue;
            }

            let absolute = self.root.join(relative);
            let content = std::fs::read(&absolute).map_err(|source| Error::Io {
                path: display_path(&absolute),
                source,
            })?;

            let path_string = display_path(&absolute);
            let file = if options.mode == ScanMode::WholeFile {
                SourceFile {
                    path: path_string,
                    status: FileStatus::Added,
                    content,
                    diff_ranges: Vec::new(),
                }
            } else {
                let diff_ranges = self.ranges_against_head(relative, &content)?;
                SourceFile {
                    path: path_string,
                    status: FileStatus::Modified,
                    content,
                    diff_ranges,
                }
            };
            files.push(file);
        }

        Ok(files)
    }

    fn commit_range_files(&self, options: &ScanOptions) -> Result<Vec<SourceFile>> {
        let base_tree = self.revision_tree(options.base.as_deref())?;
        let target_tree = self.revision_tree(options.target.as_deref())?;

        let diff = self
            .inner
            .diff_tree_to_tree(Some(&base_tree), Some(&target_tree), None)?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            let status = match delta.status() {
                Delta::Added => FileStatus::Added,
                Delta::Modified => FileStatus::Modified,
                _ => continue,
            };

            let Some(path) = delta.new_file().path() else {
                continue;
            };
            if !self.registry.supports(path) {
                continue;
            }
            if !options.include_ignored && self.inner.is_path_ignored(path)? {
                continue;
            }

            let Some(content) = tree_blob_content(&self.inner, &target_tree, path) else {
                continue;
            };

            let diff_ranges =
                if options.mode == ScanMode::AddedLines && status == FileStatus::Modified {
                    let old = tree_blob_content(&self.inner, &base_tree, path).unwrap_or_default();
                    added_ranges(
                        &String::from_utf8_lossy(&old),
                        &String::from_utf8_lossy(&content),
                    )
                } else {
                    Vec::new()
                };

            files.push(SourceFile {
                path: display_path(&self.root.join(path)),
                status,
                content,
                diff_ranges,
            });
        }

        Ok(files)
    }

    fn working_tree_files(&self, options: &ScanOptions) -> Result<Vec<SourceFile>> {
        let mut status_options = StatusOptions::new();
        status_options
            .include_untracked(options.include_untracked)
            .recurse_untracked_dirs(true)
            .include_ignored(options.include_ignored);

        let statuses = self.inner.statuses(Some(&mut status_options))?;

        let mut files = Vec::new();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            let relative = Path::new(path);
            if !self.registry.supports(relative) {
                continue;
            }

            let flags = entry.status();
            if flags.intersects(Status::WT_DELETED | Status::INDEX_DELETED) {
                continue;
            }

            let status = if flags.contains(Status::INDEX_NEW) {
                FileStatus::Added
            } else if flags.intersects(Status::INDEX_MODIFIED | Status::WT_MODIFIED) {
                FileStatus::Modified
            } else if flags.intersects(Status::WT_NEW | Status::IGNORED) {
                if !options.include_untracked {
                    continue;
                }
                FileStatus::Untracked
            } else {
                continue;
            };

            let absolute = self.root.join(relative);
            let content = std::fs::read(&absolute).map_err(|source| Error::Io {
                path: display_path(&absolute),
                source,
            })?;

            let diff_ranges =
                if options.mode == ScanMode::AddedLines && status == FileStatus::Modified {
                    self.ranges_against_head(relative, &content)?
                } else {
                    Vec::new()
                };

            files.push(SourceFile {
                path: display_path(&absolute),
                status,
                content,
                diff_ranges,
            });
        }

        Ok(files)
    }

    /// Added-line ranges of `content` relative to the HEAD blob for the
    /// same path. A path absent from HEAD yields no ranges.
    fn ranges_against_head(&self, path: &Path, content: &[u8]) -> Result<Vec<LineRange>> {
        let head = match self.inner.head() {
            Ok(head) => head,
            Err(err)
                if matches!(
                    (err.class(), err.code()),
                    (
                        ErrorClass::Reference,
                        ErrorCode::NotFound | ErrorCode::UnbornBranch
                    )
                ) =>
            {
                return Ok(Vec::new())
            }
            Err(err) => return Err(Error::from(err)),
        };

        let tree = head.peel_to_commit()?.tree()?;
        let Some(old) = tree_blob_content(&self.inner, &tree, path) else {
            return Ok(Vec::new());
        };

        Ok(added_ranges(
            &String::from_utf8_lossy(&old),
            &String::from_utf8_lossy(content),
        ))
    }

    /// Tree of the named revision, defaulting to HEAD.
    fn revision_tree(&self, revision: Option<&str>) -> Result<Tree<'_>> {
        let commit = match revision {
            Some(revision) => self.resolve_commit(revision)?,
            None => self.inner.head()?.peel_to_commit()?,
        };
        Ok(commit.tree()?)
    }

    fn resolve_commit(&self, revision: &str) -> Result<git2::Commit<'_>> {
        self.inner
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|source| Error::RevisionResolution {
                revision: revision.to_owned(),
                source,
            })
    }
}

impl SourceProvider for GitSource {
    fn files(&self, options: &ScanOptions) -> Result<Vec<SourceFile>> {
        if !options.paths.is_empty() {
            return self.explicit_files(options);
        }

        if options.base.is_some() || options.target.is_some() {
            return self.commit_range_files(options);
        }

        self.working_tree_files(options)
    }
}

fn tree_blob_content(repo: &Repository, tree: &Tree<'_>, path: &Path) -> Option<Vec<u8>> {
    let entry = tree.get_path(path).ok()?;
    let blob = repo.find_blob(entry.id()).ok()?;
    Some(blob.content().to_vec())
}

fn display_path(path: &Path) -> String {
    path.to_path_buf()
        .into_os_string()
        .to_string_lossy()
        .into_owned()
}

impl fmt::Debug for GitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitSource")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
