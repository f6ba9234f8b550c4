//! Byte-precise deletion of comment spans from files on disk.
//!
//! A comment that is the only non-whitespace content on its line is
//! removed together with its leading indentation and line terminator, so
//! no blank line is left behind. A comment trailing code on the same
//! line is removed token-only, leaving the code and its newline intact.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::harvest::Comment;
use crate::{Error, Result};

/// Delete the given comments from the file at `path`.
///
/// The file is re-read fresh; spans are validated against the current
/// buffer and then spliced out in descending `start_byte` order, so an
/// applied deletion never shifts the offsets of one still pending. The
/// rewritten content is persisted atomically: written to a temporary
/// file alongside the target and renamed over it, so the file is never
/// observed half-written.
///
/// Succeeds as a no-op when `comments` is empty.
///
/// # Errors
///
/// Returns [`Error::Io`] on read, write, or rename failure and
/// [`Error::StaleComment`] when a span no longer fits inside the file's
/// current content. In both cases the target file is left untouched.
pub fn remove_comments(path: &Path, comments: &[Comment]) -> Result<()> {
    if comments.is_empty() {
        return Ok(());
    }

    let display = path.display().to_string();
    let mut buffer = std::fs::read(path).map_err(|source| Error::Io {
        path: display.clone(),
        source,
    })?;

    let mut ordered: Vec<&Comment> = comments.iter().collect();
    ordered.sort_by(|a, b| b.start_byte.cmp(&a.start_byte));

    // Offsets were computed against the scan-time buffer; make sure they
    // still land inside the file before touching anything. Content
    // equality beyond this is a caller obligation.
    for comment in &ordered {
        if comment.start_byte > comment.end_byte || comment.end_byte > buffer.len() {
            return Err(Error::StaleComment { path: display });
        }
    }

    for comment in ordered {
        let mut start = comment.start_byte;
        let mut end = comment.end_byte;

        if is_whole_line(&buffer, start) {
            while start > 0 && buffer[start - 1] != b'\n' {
                start -= 1;
            }
            if end < buffer.len() && buffer[end] == b'\n' {
                end += 1;
            }
        }

        buffer.drain(start..end);
    }

    persist(path, &display, &buffer)
}

/// True when every byte between the start of the line and `start` is
/// whitespace, i.e. the comment is the only content on its line.
fn is_whole_line(buffer: &[u8], start: usize) -> bool {
    let mut index = start;
    while index > 0 {
        let byte = buffer[index - 1];
        if byte == b'\n' {
            return true;
        }
        if !byte.is_ascii_whitespace() {
            return false;
        }
        index -= 1;
    }
    true
}

fn persist(path: &Path, display: &str, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(|source| Error::Io {
        path: display.to_owned(),
        source,
    })?;
    temp.write_all(content).map_err(|source| Error::Io {
        path: display.to_owned(),
        source,
    })?;
    temp.persist(path).map_err(|err| Error::Io {
        path: display.to_owned(),
        source: err.error,
    })?;

    Ok(())
}
