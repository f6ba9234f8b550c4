//! Line-level diffing that reports which lines of a file are new.
//!
//! The differ compares two versions of a file's content and expresses the
//! result as ranges of 1-based line numbers in the *new* content. Deleted
//! lines never produce ranges; only additions are of interest downstream.

use serde::{Deserialize, Serialize};

/// Inclusive range of 1-based line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    /// First line covered by the range.
    pub start: usize,
    /// Last line covered by the range.
    pub end: usize,
}

impl LineRange {
    /// Returns true when `line` falls inside the range, bounds included.
    #[must_use]
    pub const fn contains(&self, line: usize) -> bool {
        line >= self.start && line <= self.end
    }
}

/// Compute the line ranges of `new` that are absent from `old`.
///
/// Lines are compared whole; the alignment is the longest common
/// subsequence of the two line sequences, computed with the classic
/// O(M·N) dynamic program. Adequate for single-file diffs; substitute a
/// linear-space variant if very large files become a concern.
///
/// The returned ranges are ascending, non-overlapping, and merged:
/// adjacent added lines share one range.
#[must_use]
pub fn added_ranges(old: &str, new: &str) -> Vec<LineRange> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    let lcs = longest_common_subsequence(&old_lines, &new_lines);

    let mut ranges = Vec::new();
    let mut open: Option<LineRange> = None;
    let mut lcs_index = 0;

    for (index, line) in new_lines.iter().enumerate() {
        let line_number = index + 1;

        if lcs_index < lcs.len() && *line == lcs[lcs_index] {
            if let Some(range) = open.take() {
                ranges.push(range);
            }
            lcs_index += 1;
        } else {
            match open.as_mut() {
                Some(range) => range.end = line_number,
                None => {
                    open = Some(LineRange {
                        start: line_number,
                        end: line_number,
                    });
                }
            }
        }
    }

    if let Some(range) = open {
        ranges.push(range);
    }

    ranges
}

/// Split content into lines. A trailing fragment without a terminating
/// newline counts as a line; empty content has no lines.
fn split_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut start = 0;
    for (index, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            lines.push(&content[start..index]);
            start = index + 1;
        }
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// Longest common subsequence of two line sequences.
///
/// When backtracking hits equal table values, the old index retreats
/// before the new one, keeping range boundaries stable across runs.
fn longest_common_subsequence<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<&'a str> {
    let (m, n) = (a.len(), b.len());
    if m == 0 || n == 0 {
        return Vec::new();
    }

    let mut table = vec![vec![0_usize; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }

    let mut sequence = vec![""; table[m][n]];
    let (mut i, mut j) = (m, n);
    let mut k = sequence.len();
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            k -= 1;
            sequence[k] = a[i - 1];
            i -= 1;
            j -= 1;
        } else if table[i - 1][j] >= table[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    sequence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: usize, end: usize) -> LineRange {
        LineRange { start, end }
    }

    #[test]
    fn identical_content_has_no_added_ranges() {
        let content = "a\nb\nc\n";
        assert_eq!(added_ranges(content, content), Vec::new());
        assert_eq!(added_ranges("", ""), Vec::new());
    }

    #[test]
    fn empty_old_marks_everything_added() {
        assert_eq!(added_ranges("", "a\nb\nc\n"), vec![range(1, 3)]);
        assert_eq!(added_ranges("", "lone"), vec![range(1, 1)]);
    }

    #[test]
    fn empty_new_yields_nothing() {
        assert_eq!(added_ranges("a\nb\nc\n", ""), Vec::new());
    }

    #[test]
    fn interleaved_additions_produce_separate_ranges() {
        let old = "a\nb\nc\n";
        let new = "a\nX\nb\nc\nY\n";
        assert_eq!(added_ranges(old, new), vec![range(2, 2), range(5, 5)]);
    }

    #[test]
    fn adjacent_added_lines_merge_into_one_range() {
        let old = "a\nb\n";
        let new = "a\nX\nY\nZ\nb\n";
        assert_eq!(added_ranges(old, new), vec![range(2, 4)]);
    }

    #[test]
    fn trailing_unterminated_line_counts() {
        let old = "a\n";
        let new = "a\nnew tail";
        assert_eq!(added_ranges(old, new), vec![range(2, 2)]);
    }

    #[test]
    fn pure_deletion_reports_nothing() {
        assert_eq!(added_ranges("a\nb\nc\n", "a\nc\n"), Vec::new());
    }

    #[test]
    fn rewrite_of_a_line_marks_the_new_line() {
        assert_eq!(added_ranges("a\nold\nc\n", "a\nnew\nc\n"), vec![range(2, 2)]);
    }

    #[test]
    fn ranges_are_stable_across_repeated_runs() {
        let old = "x\nx\ny\n";
        let new = "x\nq\nx\ny\nx\n";
        let first = added_ranges(old, new);
        for _ in 0..8 {
            assert_eq!(added_ranges(old, new), first);
        }
    }

    #[test]
    fn line_range_contains_is_inclusive() {
        let r = range(3, 5);
        assert!(!r.contains(2));
        assert!(r.contains(3));
        assert!(r.contains(5));
        assert!(!r.contains(6));
    }
}
