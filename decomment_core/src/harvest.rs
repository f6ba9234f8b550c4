//! Extraction of comment tokens from parsed source files.

use serde::{Deserialize, Serialize};
use tree_sitter::{Language, Node, Parser};

use crate::language::LanguageRegistry;
use crate::source::{FileStatus, SourceFile};
use crate::{Error, Result};

/// Comment node kinds recognized across grammars, in harvest order.
///
/// Most grammars expose a single `comment` kind; others split line and
/// block forms. The kinds are mutually exclusive within one grammar, so
/// harvesting every kind never yields duplicate nodes.
const COMMENT_KINDS: [&str; 4] = ["comment", "line_comment", "block_comment", "multiline_comment"];

/// A comment token extracted from a scanned file.
///
/// Byte offsets index the exact content buffer that was scanned; the
/// record goes stale if that buffer changes on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Path of the file the comment was found in.
    pub path: String,
    /// Raw text of the comment token, delimiters included.
    pub text: String,
    /// 1-based line the comment starts on.
    pub line: usize,
    /// Byte offset of the first byte of the comment.
    pub start_byte: usize,
    /// Byte offset one past the last byte of the comment.
    pub end_byte: usize,
}

/// Harvests comment nodes from a single file using its grammar.
#[derive(Debug)]
pub struct Harvester {
    language: Language,
}

impl Harvester {
    /// Build a harvester for the grammar registered for `file.path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedLanguage`] when no grammar is
    /// registered for the file's extension. This is raised before any
    /// parse attempt.
    pub fn for_file(file: &SourceFile, registry: &LanguageRegistry) -> Result<Self> {
        let language = registry
            .resolve(std::path::Path::new(&file.path))
            .ok_or_else(|| Error::UnsupportedLanguage {
                path: file.path.clone(),
            })?;
        Ok(Self {
            language: language.clone(),
        })
    }

    /// Parse the file and collect its comment tokens.
    ///
    /// For [`FileStatus::Added`] and [`FileStatus::Untracked`] files the
    /// whole file is harvested and `diff_ranges` is ignored. Otherwise a
    /// comment is included only when its starting line falls inside one
    /// of the file's added-line ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the buffer cannot be parsed with
    /// the file's grammar.
    pub fn harvest(&self, file: &SourceFile) -> Result<Vec<Comment>> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|_| Error::Parse {
                path: file.path.clone(),
            })?;

        let tree = parser.parse(&file.content, None).ok_or_else(|| Error::Parse {
            path: file.path.clone(),
        })?;

        let mut buckets: [Vec<Node<'_>>; COMMENT_KINDS.len()] = Default::default();
        collect_comment_nodes(tree.root_node(), &mut buckets);

        let whole_file = matches!(file.status, FileStatus::Added | FileStatus::Untracked);

        let mut comments = Vec::new();
        for bucket in &buckets {
            for node in bucket {
                let line = node.start_position().row + 1;
                if !whole_file && !file.diff_ranges.iter().any(|range| range.contains(line)) {
                    continue;
                }
                comments.push(Comment {
                    path: file.path.clone(),
                    text: String::from_utf8_lossy(&file.content[node.byte_range()]).into_owned(),
                    line,
                    start_byte: node.start_byte(),
                    end_byte: node.end_byte(),
                });
            }
        }

        Ok(comments)
    }
}

/// Walk the tree once, bucketing comment nodes by kind. Buckets keep
/// traversal order; concatenating them yields the fixed category order.
fn collect_comment_nodes<'tree>(node: Node<'tree>, buckets: &mut [Vec<Node<'tree>>]) {
    if let Some(slot) = COMMENT_KINDS.iter().position(|kind| *kind == node.kind()) {
        buckets[slot].push(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comment_nodes(child, buckets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::LineRange;

    fn file(path: &str, status: FileStatus, content: &str, ranges: Vec<LineRange>) -> SourceFile {
        SourceFile {
            path: path.to_owned(),
            status,
            content: content.as_bytes().to_vec(),
            diff_ranges: ranges,
        }
    }

    fn harvest(file: &SourceFile) -> Vec<Comment> {
        let registry = LanguageRegistry::builtin();
        let harvester = Harvester::for_file(file, &registry).expect("grammar");
        harvester.harvest(file).expect("harvest")
    }

    #[test]
    fn whole_file_mode_returns_every_comment() {
        let source = "# one\nx = 1\n# two\ny = 2  # three\n";
        let comments = harvest(&file("a.py", FileStatus::Added, source, vec![]));

        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].text, "# one");
        assert_eq!(comments[0].line, 1);
        assert_eq!(comments[2].text, "# three");
        assert_eq!(comments[2].line, 4);
    }

    #[test]
    fn whole_file_mode_ignores_supplied_ranges() {
        let source = "# one\nx = 1\n# two\n";
        let ranges = vec![LineRange { start: 3, end: 3 }];
        let comments = harvest(&file("a.py", FileStatus::Untracked, source, ranges));
        assert_eq!(comments.len(), 2);
    }

    #[test]
    fn diff_mode_filters_by_starting_line() {
        let source = "# one\nx = 1\n# three\n";
        let ranges = vec![LineRange { start: 3, end: 3 }];
        let comments = harvest(&file("a.py", FileStatus::Modified, source, ranges));

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].line, 3);
        assert_eq!(comments[0].text, "# three");
    }

    #[test]
    fn modified_file_without_ranges_yields_nothing() {
        let source = "# one\nx = 1\n";
        let comments = harvest(&file("a.py", FileStatus::Modified, source, vec![]));
        assert!(comments.is_empty());
    }

    #[test]
    fn split_comment_kinds_are_harvested_in_category_order() {
        let source = "/* first */\nfn main() {\n    // second\n}\n";
        let comments = harvest(&file("a.rs", FileStatus::Added, source, vec![]));

        // Rust splits line and block comments; line_comment sorts before
        // block_comment in the category order even though the block
        // appears first in the file.
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "// second");
        assert_eq!(comments[1].text, "/* first */");
    }

    #[test]
    fn byte_spans_index_the_scanned_buffer() {
        let source = "x = 1  # tail\n";
        let comments = harvest(&file("a.py", FileStatus::Added, source, vec![]));

        assert_eq!(comments.len(), 1);
        let comment = &comments[0];
        assert_eq!(
            &source.as_bytes()[comment.start_byte..comment.end_byte],
            comment.text.as_bytes()
        );
    }

    #[test]
    fn unsupported_extension_fails_before_parsing() {
        let registry = LanguageRegistry::builtin();
        let unknown = file("notes.txt", FileStatus::Added, "# not code\n", vec![]);
        let err = Harvester::for_file(&unknown, &registry).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage { .. }));
    }

    #[test]
    fn comment_round_trips_through_serde() {
        let source = "# header\n";
        let comments = harvest(&file("a.py", FileStatus::Added, source, vec![]));

        let encoded = serde_json::to_string(&comments).expect("serialize comments");
        let decoded: Vec<Comment> = serde_json::from_str(&encoded).expect("deserialize comments");
        assert_eq!(comments, decoded);
    }

    #[test]
    fn comment_free_file_yields_empty_list() {
        let comments = harvest(&file("a.py", FileStatus::Added, "x = 1\ny = 2\n", vec![]));
        assert!(comments.is_empty());
    }
}
