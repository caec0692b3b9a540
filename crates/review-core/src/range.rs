//! Half-open character ranges.
//!
//! Every position in this crate is a **character offset** (Unicode scalar values, `char`) into
//! the current document snapshot. Ranges are half-open (`start..end`), so two ranges that merely
//! touch (`a.end == b.start`) never overlap.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a range violates its construction precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    /// `end` is smaller than `start`.
    #[error("inverted range: start {start} is after end {end}")]
    Inverted {
        /// Requested start offset.
        start: usize,
        /// Requested end offset.
        end: usize,
    },
}

/// A half-open character-offset range (`start..end`) in the document.
///
/// A zero-width range (`start == end`) contains no points. The bounds are only reachable
/// through constructors, so `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct TextRange {
    start: usize,
    end: usize,
}

#[derive(Deserialize)]
struct RawRange {
    start: usize,
    end: usize,
}

impl TryFrom<RawRange> for TextRange {
    type Error = RangeError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        TextRange::try_new(raw.start, raw.end)
    }
}

impl TextRange {
    /// Create a new range.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`. Use [`TextRange::try_new`] for untrusted input.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "inverted range: {start} > {end}");
        Self { start, end }
    }

    /// Create a new range, rejecting `start > end`.
    pub fn try_new(start: usize, end: usize) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a range of `len` characters starting at `start`.
    pub fn at(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start.saturating_add(len),
        }
    }

    /// Range start offset (inclusive).
    pub fn start(&self) -> usize {
        self.start
    }

    /// Range end offset (exclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length of the range in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for a zero-width range.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if the range contains a specific position.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if two ranges overlap.
    ///
    /// Touching ranges do not overlap. A zero-width range overlaps only ranges that strictly
    /// contain its position.
    pub fn overlaps(&self, other: &TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Shift both bounds by a signed delta, saturating at zero.
    pub(crate) fn shifted(self, delta: isize) -> Self {
        Self {
            start: self.start.saturating_add_signed(delta),
            end: self.end.saturating_add_signed(delta),
        }
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl From<std::ops::Range<usize>> for TextRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}
