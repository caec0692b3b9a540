//! Single-region text edits between two snapshots.
//!
//! Hosts typically observe the document as a sequence of full-text snapshots rather than as a
//! stream of structured edits. [`compute_edit`] recovers the one contiguous region in which two
//! snapshots differ, using a common-prefix / common-suffix scan. It is not a general multi-hunk
//! diff: it assumes one logical edit (typing, pasting, deleting in one place) happened between
//! the two observations.
//!
//! All offsets are expressed in **character offsets** (Unicode scalar values).

use crate::range::TextRange;

/// A single text edit expressed in character offsets.
///
/// Semantics: delete `delete_count` characters at `offset` in the "before" document, then insert
/// `inserted_text` at the same offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Start character offset of the edit.
    pub offset: usize,
    /// Number of deleted characters (may be zero).
    pub delete_count: usize,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
}

impl TextEdit {
    /// Create a new edit.
    pub fn new(offset: usize, delete_count: usize, inserted_text: impl Into<String>) -> Self {
        Self {
            offset,
            delete_count,
            inserted_text: inserted_text.into(),
        }
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Net change in document length.
    pub fn delta(&self) -> isize {
        self.inserted_len() as isize - self.delete_count as isize
    }

    /// Deleted range in the pre-edit document.
    pub fn deleted_range(&self) -> TextRange {
        TextRange::at(self.offset, self.delete_count)
    }

    /// Returns `true` if the edit only inserts text.
    pub fn is_insertion(&self) -> bool {
        self.delete_count == 0
    }

    /// Apply the edit to `text`, producing the "after" document.
    ///
    /// Offsets past the end of `text` are clamped.
    pub fn apply(&self, text: &str) -> String {
        let start = byte_offset(text, self.offset);
        let end = byte_offset(text, self.offset.saturating_add(self.delete_count));

        let mut out = String::with_capacity(text.len() - (end - start) + self.inserted_text.len());
        out.push_str(&text[..start]);
        out.push_str(&self.inserted_text);
        out.push_str(&text[end..]);
        out
    }
}

fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Compute the single region in which `old` and `new` differ.
///
/// Returns `None` when the texts are identical. Otherwise the edit starts after the longest
/// common prefix; the common suffix is measured independently and clamped so that it never
/// reuses characters already claimed by the prefix.
///
/// Applying the returned edit to `old` with [`TextEdit::apply`] reproduces `new` exactly.
pub fn compute_edit(old: &str, new: &str) -> Option<TextEdit> {
    if old == new {
        return None;
    }

    let old_len = old.chars().count();
    let new_len = new.chars().count();

    let prefix = old
        .chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .count();

    let max_suffix = old_len.min(new_len) - prefix;
    let suffix = old
        .chars()
        .rev()
        .zip(new.chars().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    let inserted_text: String = new
        .chars()
        .skip(prefix)
        .take(new_len - prefix - suffix)
        .collect();

    Some(TextEdit {
        offset: prefix,
        delete_count: old_len - prefix - suffix,
        inserted_text,
    })
}
