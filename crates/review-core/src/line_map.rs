//! Offset ↔ line/column mapping for one text snapshot.
//!
//! A [`LineMap`] is derived, read-only state: it describes exactly one snapshot and is discarded
//! and rebuilt after any edit rather than patched. Lines are **1-indexed**; columns are
//! **0-indexed** character offsets within the line, matching how suggestions record their anchor.

use ropey::Rope;

use crate::range::TextRange;

/// A 1-indexed line and 0-indexed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinePosition {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column in characters (0-indexed).
    pub column: usize,
}

impl LinePosition {
    /// Create a new line position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Line map over a text snapshot, backed by a [`Rope`] for O(log N) line lookups.
pub struct LineMap {
    rope: Rope,
}

impl LineMap {
    /// Build a line map from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Get total line count. An empty document has one line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Line and column of a character offset (clamped to the end of the text).
    pub fn position(&self, char_offset: usize) -> LinePosition {
        let char_offset = char_offset.min(self.rope.len_chars());
        let line_idx = self.rope.char_to_line(char_offset);
        let line_start = self.rope.line_to_char(line_idx);

        LinePosition::new(line_idx + 1, char_offset - line_start)
    }

    /// 1-indexed line containing a character offset.
    pub fn line_of(&self, char_offset: usize) -> usize {
        self.position(char_offset).line
    }

    /// Character offset of a line/column, or `None` if either is out of bounds.
    ///
    /// The column may point at the line's end (just before its newline).
    pub fn offset(&self, position: LinePosition) -> Option<usize> {
        let range = self.line_range(position.line)?;
        (position.column <= range.len()).then(|| range.start() + position.column)
    }

    /// Character range of a 1-indexed line, excluding its line terminator.
    pub fn line_range(&self, line: usize) -> Option<TextRange> {
        if line == 0 || line > self.rope.len_lines() {
            return None;
        }
        let idx = line - 1;

        let start = self.rope.line_to_char(idx);
        let mut end = if idx + 1 < self.rope.len_lines() {
            self.rope.line_to_char(idx + 1)
        } else {
            self.rope.len_chars()
        };

        if end > start && is_line_break(self.rope.char(end - 1)) {
            end -= 1;
            if end > start && self.rope.char(end) == '\n' && self.rope.char(end - 1) == '\r' {
                end -= 1;
            }
        }

        Some(TextRange::new(start, end))
    }

    /// Text of a 1-indexed line (excluding its line terminator).
    pub fn line_text(&self, line: usize) -> Option<String> {
        let range = self.line_range(line)?;
        Some(self.rope.slice(range.start()..range.end()).to_string())
    }
}

// The same set of terminators ropey splits lines on.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\u{000B}' | '\u{000C}' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}
