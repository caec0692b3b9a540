//! Exact-text occurrence search.
//!
//! This module locates literal occurrences of a suggestion's original text inside a snapshot,
//! using **character offsets** (not byte offsets) for all public inputs/outputs. Occurrences that
//! would start or end in the middle of a grapheme cluster (for example between a base letter and
//! its combining accent) are not reported, since they cannot serve as a visible anchor.

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use unicode_segmentation::GraphemeCursor;

use crate::range::TextRange;

/// Search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The needle could not be compiled into a matcher (e.g. it exceeds the size limit).
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.text_len)
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) | Err(idx) => idx,
        }
    }

    /// Text of a character range, or `None` if it runs past the end.
    pub(crate) fn slice<'a>(&self, text: &'a str, range: TextRange) -> Option<&'a str> {
        if range.end() > self.char_count() {
            return None;
        }
        text.get(self.char_to_byte(range.start())..self.char_to_byte(range.end()))
    }
}

fn compile_literal(needle: &str) -> Result<Regex, SearchError> {
    Ok(RegexBuilder::new(&regex::escape(needle)).build()?)
}

fn is_grapheme_boundary(text: &str, byte_offset: usize) -> bool {
    GraphemeCursor::new(byte_offset, text.len(), true)
        .is_boundary(text, 0)
        .unwrap_or(true)
}

/// Find every occurrence of `needle` in `text`, including overlapping ones, in ascending order.
///
/// Returns an empty list for an empty needle.
pub fn find_all(text: &str, needle: &str) -> Result<Vec<TextRange>, SearchError> {
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    let re = compile_literal(needle)?;
    let index = CharIndex::new(text);

    let mut matches = Vec::new();
    let mut start_byte = 0;
    while let Some(m) = re.find_at(text, start_byte) {
        if is_grapheme_boundary(text, m.start()) && is_grapheme_boundary(text, m.end()) {
            matches.push(TextRange::new(
                index.byte_to_char(m.start()),
                index.byte_to_char(m.end()),
            ));
        }
        // Resume one character later so overlapping occurrences are found too.
        let next_char = index.byte_to_char(m.start()) + 1;
        if next_char > index.char_count() {
            break;
        }
        start_byte = index.char_to_byte(next_char);
    }

    Ok(matches)
}

/// Find the occurrence of `needle` whose start is nearest to `target`.
///
/// When `within` is given, only occurrences that start inside it (inclusive of its end) are
/// considered. Ties prefer the earlier occurrence.
pub fn find_nearest(
    text: &str,
    needle: &str,
    target: usize,
    within: Option<TextRange>,
) -> Result<Option<TextRange>, SearchError> {
    let nearest = find_all(text, needle)?
        .into_iter()
        .filter(|m| within.is_none_or(|w| w.start() <= m.start() && m.start() <= w.end()))
        .min_by_key(|m| (m.start().abs_diff(target), m.start()));
    Ok(nearest)
}
