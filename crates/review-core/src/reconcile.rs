//! Suggestion reconciliation.
//!
//! After every document change the reconciler:
//!
//! 1. extracts the single edit between the old and new snapshot ([`compute_edit`]);
//! 2. maps every suggestion's range through it, retiring the ones the edit destroyed;
//! 3. re-validates each survivor against the new text, re-anchoring it to the nearest exact
//!    occurrence of its original text (same line first, then the whole document) or retiring it
//!    when the text is gone;
//! 4. rebuilds the non-overlapping set with the sweepline.
//!
//! Retirement is an expected outcome of editing, never an error: nothing here fails.

use serde::{Deserialize, Serialize};

use crate::adjust::{EditSpan, adjust_range};
use crate::delta::{TextEdit, compute_edit};
use crate::intervals::{OverlapStrategy, RangeIndex};
use crate::line_map::LineMap;
use crate::range::TextRange;
use crate::search::{CharIndex, find_nearest};
use crate::suggestion::Suggestion;

/// Where to look for a suggestion's text once it no longer matches at its recorded range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelocateScope {
    /// Never relocate; mismatching suggestions are retired.
    Off,
    /// Only search the line the adjusted range starts on.
    SameLine,
    /// Search the same line first, then the whole document.
    #[default]
    Document,
}

/// Options that control reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReconcileOptions {
    /// Relocation scope for mismatching suggestions.
    pub relocate: RelocateScope,
    /// How overlaps introduced by relocation are resolved.
    pub overlap_strategy: OverlapStrategy,
}

/// Reconciles suggestion positions with document changes.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    /// Create a reconciler with the given options.
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    /// The options this reconciler was built with.
    pub fn options(&self) -> ReconcileOptions {
        self.options
    }

    /// Reconcile `suggestions` (anchored in `old`) with `new`.
    ///
    /// Identical snapshots return the input unchanged.
    pub fn reconcile(
        &self,
        suggestions: Vec<Suggestion>,
        old: &str,
        new: &str,
    ) -> Vec<Suggestion> {
        match compute_edit(old, new) {
            Some(edit) => self.reconcile_edit(suggestions, &edit, new),
            None => suggestions,
        }
    }

    /// Reconcile `suggestions` with a known edit that produced `new_text`.
    pub fn reconcile_edit(
        &self,
        suggestions: Vec<Suggestion>,
        edit: &TextEdit,
        new_text: &str,
    ) -> Vec<Suggestion> {
        let span = EditSpan::from(edit);

        let adjusted: Vec<Suggestion> = suggestions
            .into_iter()
            .filter_map(|mut suggestion| match adjust_range(suggestion.range, span) {
                Some(range) => {
                    suggestion.range = range;
                    Some(suggestion)
                }
                None => {
                    tracing::trace!(id = %suggestion.id, "suggestion consumed by edit");
                    None
                }
            })
            .collect();

        let validated = self.validate_positions(adjusted, new_text);
        self.resolve_overlaps(validated)
    }

    /// Keep suggestions whose original text is still at their range, re-anchor the ones whose
    /// text can be found nearby, and retire the rest.
    ///
    /// Line and column of every survivor are refreshed from `text`.
    pub fn validate_positions(&self, suggestions: Vec<Suggestion>, text: &str) -> Vec<Suggestion> {
        let chars = CharIndex::new(text);
        let lines = LineMap::from_text(text);

        suggestions
            .into_iter()
            .filter_map(|suggestion| self.validate_one(suggestion, text, &chars, &lines).ok())
            .collect()
    }

    /// Validate a single suggestion, returning it back as `Err` when its anchor is lost.
    pub(crate) fn validate_one(
        &self,
        mut suggestion: Suggestion,
        text: &str,
        chars: &CharIndex,
        lines: &LineMap,
    ) -> Result<Suggestion, Suggestion> {
        if suggestion.matches_in(text, chars) {
            suggestion.reanchor(suggestion.range, lines);
            return Ok(suggestion);
        }

        let expected = suggestion.range.start();
        match self.relocate(text, lines, &suggestion.original_text, expected) {
            Some(range) => {
                tracing::debug!(
                    id = %suggestion.id,
                    from = %suggestion.range,
                    to = %range,
                    "re-anchored suggestion"
                );
                suggestion.reanchor(range, lines);
                Ok(suggestion)
            }
            None => {
                tracing::debug!(id = %suggestion.id, "suggestion anchor lost");
                Err(suggestion)
            }
        }
    }

    fn relocate(
        &self,
        text: &str,
        lines: &LineMap,
        needle: &str,
        expected_offset: usize,
    ) -> Option<TextRange> {
        let expected_line = lines.line_of(expected_offset);
        locate(
            text,
            lines,
            needle,
            (expected_offset, expected_line),
            self.options.relocate,
        )
    }

    fn resolve_overlaps(&self, suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
        let outcome = RangeIndex::from_vec(suggestions, self.options.overlap_strategy);
        for rejected in &outcome.rejected {
            tracing::debug!(
                id = %rejected.id,
                range = %rejected.range,
                "dropping suggestion overlapping another after reconciliation"
            );
        }
        outcome.index.into_vec()
    }
}

fn search(
    text: &str,
    needle: &str,
    target: usize,
    within: Option<TextRange>,
) -> Option<TextRange> {
    find_nearest(text, needle, target, within).unwrap_or_else(|err| {
        tracing::debug!(%err, "relocation search failed");
        None
    })
}

fn locate(
    text: &str,
    lines: &LineMap,
    needle: &str,
    (expected_offset, expected_line): (usize, usize),
    scope: RelocateScope,
) -> Option<TextRange> {
    if scope == RelocateScope::Off {
        return None;
    }

    let on_line = lines
        .line_range(expected_line)
        .and_then(|line| search(text, needle, expected_offset, Some(line)));
    if on_line.is_some() || scope == RelocateScope::SameLine {
        return on_line;
    }
    search(text, needle, expected_offset, None)
}

/// Locate `original_text` in `text`, preferring occurrences on `expected_line` (1-indexed), then
/// anywhere in the document; the occurrence nearest `expected_offset` wins within each scope.
pub fn find_exact_position(
    text: &str,
    original_text: &str,
    expected_offset: usize,
    expected_line: usize,
) -> Option<TextRange> {
    locate(
        text,
        &LineMap::from_text(text),
        original_text,
        (expected_offset, expected_line),
        RelocateScope::Document,
    )
}

/// Reconcile `suggestions` (anchored in `old`) with `new` using default options.
pub fn reconcile(suggestions: Vec<Suggestion>, old: &str, new: &str) -> Vec<Suggestion> {
    Reconciler::default().reconcile(suggestions, old, new)
}

/// Validate `suggestions` against `text` using default options.
pub fn validate_positions(suggestions: Vec<Suggestion>, text: &str) -> Vec<Suggestion> {
    Reconciler::default().validate_positions(suggestions, text)
}
