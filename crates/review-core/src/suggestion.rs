//! Review suggestion data model.
//!
//! A suggestion is a categorized, positioned proposal to revise a span of the document. It is
//! produced by an external reviewer and anchored to the exact text it was made about; the
//! reconciler keeps that anchor correct while the document is being edited.
//!
//! Suggestions serialize to the JSON shape reviewers emit:
//!
//! ```json
//! {
//!   "id": "s1",
//!   "type": "grammar",
//!   "line": 1,
//!   "column": 6,
//!   "start": 6,
//!   "end": 11,
//!   "originalText": "world",
//!   "observation": "Lowercase proper noun",
//!   "suggestedText": "World"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::intervals::Indexed;
use crate::line_map::LineMap;
use crate::range::TextRange;
use crate::search::CharIndex;

/// The closed set of suggestion categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    /// Ambiguous or hard-to-follow phrasing.
    Clarity,
    /// Grammar, spelling and punctuation.
    Grammar,
    /// Tone and word choice.
    Style,
    /// Paragraph and sentence organization.
    Structure,
    /// Redundancy and wordiness.
    Economy,
}

/// A single positioned revision suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Unique identifier.
    pub id: String,
    /// Suggestion category.
    #[serde(rename = "type")]
    pub category: SuggestionCategory,
    /// Line of the anchor's start (1-indexed).
    pub line: usize,
    /// Column of the anchor's start, in characters (0-indexed).
    pub column: usize,
    /// Anchor range in character offsets.
    #[serde(flatten)]
    pub range: TextRange,
    /// The exact text the suggestion was made about.
    pub original_text: String,
    /// Human-readable explanation.
    pub observation: String,
    /// Proposed replacement for `original_text`.
    pub suggested_text: String,
}

impl Suggestion {
    /// Create a suggestion anchored at `start` in `text`.
    ///
    /// The range covers `original_text` and the line/column are derived from `text`.
    pub fn anchored(
        id: impl Into<String>,
        category: SuggestionCategory,
        text: &str,
        start: usize,
        original_text: impl Into<String>,
        observation: impl Into<String>,
        suggested_text: impl Into<String>,
    ) -> Self {
        let original_text = original_text.into();
        let range = TextRange::at(start, original_text.chars().count());
        let position = LineMap::from_text(text).position(start);
        Self {
            id: id.into(),
            category,
            line: position.line,
            column: position.column,
            range,
            original_text,
            observation: observation.into(),
            suggested_text: suggested_text.into(),
        }
    }

    /// Returns `true` if `text` holds exactly `original_text` at this suggestion's range.
    pub fn matches(&self, text: &str) -> bool {
        self.matches_in(text, &CharIndex::new(text))
    }

    pub(crate) fn matches_in(&self, text: &str, index: &CharIndex) -> bool {
        index.slice(text, self.range) == Some(self.original_text.as_str())
    }

    /// Move the anchor to `range`, refreshing line and column from `lines`.
    pub(crate) fn reanchor(&mut self, range: TextRange, lines: &LineMap) {
        let position = lines.position(range.start());
        self.range = range;
        self.line = position.line;
        self.column = position.column;
    }
}

impl Indexed for Suggestion {
    fn id(&self) -> &str {
        &self.id
    }

    fn range(&self) -> TextRange {
        self.range
    }

    fn set_range(&mut self, range: TextRange) {
        self.range = range;
    }
}
