//! Live suggestion set for one document.
//!
//! [`SuggestionTracker`] owns the non-overlapping suggestion index of a single document and keeps
//! it in step with the text. Reconciliation can run inline ([`SuggestionTracker::update_text`])
//! or be handed to a worker ([`SuggestionTracker::begin`] / [`SuggestionTracker::commit`]).
//!
//! Off-thread reconciliation follows a single-flight discipline based on generation counters:
//! every new snapshot bumps the generation, and a result is only committed if it was computed
//! for the latest generation. Results for superseded snapshots are discarded rather than applied
//! out of order.
//!
//! ```rust
//! use review_core::{
//!     CommitStatus, ReconcileOptions, Suggestion, SuggestionCategory, SuggestionTracker,
//! };
//!
//! let text = "hello world";
//! let s = Suggestion::anchored("s1", SuggestionCategory::Grammar, text, 6, "world", "", "World");
//! let (mut tracker, rejected) =
//!     SuggestionTracker::new(text, vec![s], ReconcileOptions::default());
//! assert!(rejected.is_empty());
//!
//! let stale = tracker.begin("hello, world");
//! let latest = tracker.begin("oh, hello, world");
//!
//! assert_eq!(tracker.commit(stale.run()), CommitStatus::Superseded);
//! assert_eq!(tracker.commit(latest.run()), CommitStatus::Applied);
//! assert_eq!(tracker.suggestion_at(12).map(|s| s.id.as_str()), Some("s1"));
//! ```

use thiserror::Error;

use crate::delta::TextEdit;
use crate::intervals::{IndexError, RangeIndex};
use crate::line_map::LineMap;
use crate::range::TextRange;
use crate::reconcile::{ReconcileOptions, Reconciler};
use crate::search::CharIndex;
use crate::suggestion::Suggestion;

/// Errors returned when adding a suggestion to a tracker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// The suggestion's original text is not at its range in the current text.
    #[error("suggestion `{id}` does not match the document at {range}")]
    AnchorMismatch {
        /// Suggestion id.
        id: String,
        /// The range that was checked.
        range: TextRange,
    },
    /// The index refused the suggestion.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Whether a [`ReconcileResult`] was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// The result was for the latest snapshot and replaced the live set.
    Applied,
    /// A newer snapshot arrived after the job started; the result was discarded.
    Superseded,
}

/// A reconciliation job detached from its tracker.
///
/// The job owns everything it needs, so it can be sent to another thread.
#[derive(Debug, Clone)]
pub struct PendingReconcile {
    generation: u64,
    old_text: String,
    new_text: String,
    suggestions: Vec<Suggestion>,
    reconciler: Reconciler,
}

impl PendingReconcile {
    /// Generation this job was created for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the reconciliation.
    pub fn run(self) -> ReconcileResult {
        let suggestions = self
            .reconciler
            .reconcile(self.suggestions, &self.old_text, &self.new_text);
        ReconcileResult {
            generation: self.generation,
            text: self.new_text,
            suggestions,
        }
    }
}

/// Output of [`PendingReconcile::run`], to be handed back to [`SuggestionTracker::commit`].
#[derive(Debug, Clone)]
pub struct ReconcileResult {
    generation: u64,
    text: String,
    suggestions: Vec<Suggestion>,
}

impl ReconcileResult {
    /// Generation the result was computed for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reconciled suggestions, in position order.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }
}

/// Owner of one document's live suggestions.
pub struct SuggestionTracker {
    reconciler: Reconciler,
    index: RangeIndex<Suggestion>,
    /// The text the indexed suggestions are anchored to.
    committed_text: String,
    /// The newest snapshot seen (differs from `committed_text` while a job is in flight).
    latest_text: String,
    generation: u64,
    committed_generation: u64,
}

impl SuggestionTracker {
    /// Create a tracker for `text` with an initial batch of suggestions.
    ///
    /// Suggestions are validated (and re-anchored when possible) against `text` before being
    /// indexed. Returns the tracker and the suggestions that could not be accepted.
    pub fn new(
        text: impl Into<String>,
        suggestions: Vec<Suggestion>,
        options: ReconcileOptions,
    ) -> (Self, Vec<Suggestion>) {
        let text = text.into();
        let reconciler = Reconciler::new(options);

        let chars = CharIndex::new(&text);
        let lines = LineMap::from_text(&text);
        let mut rejected = Vec::new();
        let mut valid = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            match reconciler.validate_one(suggestion, &text, &chars, &lines) {
                Ok(suggestion) => valid.push(suggestion),
                Err(suggestion) => rejected.push(suggestion),
            }
        }

        let outcome = RangeIndex::from_vec(valid, options.overlap_strategy);
        rejected.extend(outcome.rejected);

        let tracker = Self {
            reconciler,
            index: outcome.index,
            latest_text: text.clone(),
            committed_text: text,
            generation: 0,
            committed_generation: 0,
        };
        (tracker, rejected)
    }

    /// Latest text snapshot.
    pub fn text(&self) -> &str {
        &self.latest_text
    }

    /// Text the current suggestions are anchored to.
    pub fn committed_text(&self) -> &str {
        &self.committed_text
    }

    /// Current generation. Bumped by every new snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while a reconciliation started with [`SuggestionTracker::begin`] has not
    /// been committed.
    pub fn is_pending(&self) -> bool {
        self.generation != self.committed_generation
    }

    /// Live suggestions, in position order.
    pub fn suggestions(&self) -> &[Suggestion] {
        self.index.as_slice()
    }

    /// Number of live suggestions.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no suggestions are live.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Look up a suggestion by id.
    pub fn get(&self, id: &str) -> Option<&Suggestion> {
        self.index.get(id)
    }

    /// The suggestion covering a character offset in the committed text, if any.
    pub fn suggestion_at(&self, offset: usize) -> Option<&Suggestion> {
        self.index.query_point(offset).into_iter().next()
    }

    /// Suggestions overlapping a range of the committed text.
    pub fn suggestions_in(&self, range: TextRange) -> Vec<&Suggestion> {
        self.index.query_range(range)
    }

    /// Reconcile inline against a new snapshot.
    ///
    /// Supersedes any in-flight job.
    pub fn update_text(&mut self, new_text: impl Into<String>) {
        let new_text = new_text.into();
        let suggestions = std::mem::take(&mut self.index).into_vec();
        let reconciled = self
            .reconciler
            .reconcile(suggestions, &self.committed_text, &new_text);
        self.install(reconciled, new_text);
        self.generation += 1;
        self.committed_generation = self.generation;
    }

    /// Record a new snapshot and detach a job that reconciles the live set with it.
    ///
    /// The job is computed against the committed text, so starting a new job while an older one
    /// is still running is always safe: only the newest result will be accepted.
    pub fn begin(&mut self, new_text: impl Into<String>) -> PendingReconcile {
        let new_text = new_text.into();
        self.generation += 1;
        self.latest_text.clone_from(&new_text);

        PendingReconcile {
            generation: self.generation,
            old_text: self.committed_text.clone(),
            new_text,
            suggestions: self.index.as_slice().to_vec(),
            reconciler: self.reconciler.clone(),
        }
    }

    /// Apply a finished job if it belongs to the latest generation.
    pub fn commit(&mut self, result: ReconcileResult) -> CommitStatus {
        if result.generation != self.generation {
            tracing::trace!(
                result = result.generation,
                latest = self.generation,
                "discarding superseded reconciliation"
            );
            return CommitStatus::Superseded;
        }

        self.install(result.suggestions, result.text);
        self.committed_generation = result.generation;
        CommitStatus::Applied
    }

    fn install(&mut self, suggestions: Vec<Suggestion>, text: String) {
        let outcome =
            RangeIndex::from_vec(suggestions, self.reconciler.options().overlap_strategy);
        self.index = outcome.index;
        self.latest_text.clone_from(&text);
        self.committed_text = text;
    }

    /// Add a single suggestion anchored in the committed text.
    ///
    /// Line and column are refreshed from the committed text.
    pub fn add(&mut self, mut suggestion: Suggestion) -> Result<(), TrackError> {
        if !suggestion.matches(&self.committed_text) {
            return Err(TrackError::AnchorMismatch {
                id: suggestion.id,
                range: suggestion.range,
            });
        }
        suggestion.reanchor(suggestion.range, &LineMap::from_text(&self.committed_text));
        self.index.add(suggestion)?;
        Ok(())
    }

    /// Remove a suggestion without applying it.
    pub fn dismiss(&mut self, id: &str) -> Option<Suggestion> {
        self.index.delete(id)
    }

    /// Apply a suggestion: replace its span with the suggested text, reconcile the remaining
    /// suggestions with the result, and return the new text.
    ///
    /// Returns `None` if the id is unknown or a reconciliation is still pending.
    pub fn accept(&mut self, id: &str) -> Option<String> {
        if self.is_pending() {
            return None;
        }
        let accepted = self.index.delete(id)?;

        let edit = TextEdit::new(
            accepted.range.start(),
            accepted.range.len(),
            accepted.suggested_text.as_str(),
        );
        let new_text = edit.apply(&self.committed_text);

        let rest = std::mem::take(&mut self.index).into_vec();
        let reconciled = self.reconciler.reconcile_edit(rest, &edit, &new_text);
        self.install(reconciled, new_text.clone());
        self.generation += 1;
        self.committed_generation = self.generation;

        Some(new_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::SuggestionCategory;

    fn tracker(text: &str, picks: &[(&str, usize, &str)]) -> SuggestionTracker {
        let suggestions = picks
            .iter()
            .map(|&(id, start, original)| {
                Suggestion::anchored(
                    id,
                    SuggestionCategory::Economy,
                    text,
                    start,
                    original,
                    "",
                    original.to_uppercase(),
                )
            })
            .collect();
        let (tracker, rejected) =
            SuggestionTracker::new(text, suggestions, ReconcileOptions::default());
        assert!(rejected.is_empty());
        tracker
    }

    #[test]
    fn test_new_rejects_lost_and_overlapping() {
        let text = "alpha beta";
        let suggestions = vec![
            Suggestion::anchored("a", SuggestionCategory::Style, text, 0, "alpha", "", "A"),
            Suggestion::anchored("b", SuggestionCategory::Style, text, 2, "pha b", "", "B"),
            Suggestion::anchored("c", SuggestionCategory::Style, text, 6, "gamma", "", "C"),
        ];
        let (tracker, rejected) =
            SuggestionTracker::new(text, suggestions, ReconcileOptions::default());

        assert_eq!(tracker.len(), 1);
        let mut rejected: Vec<_> = rejected.into_iter().map(|s| s.id).collect();
        rejected.sort();
        assert_eq!(rejected, vec!["b", "c"]);
    }

    #[test]
    fn test_update_text_and_queries() {
        let mut tracker = tracker("the quick fox", &[("q", 4, "quick"), ("f", 10, "fox")]);
        tracker.update_text("the very quick fox");

        assert_eq!(tracker.generation(), 1);
        assert!(!tracker.is_pending());
        assert_eq!(tracker.get("q").unwrap().range, TextRange::new(9, 14));
        assert_eq!(tracker.suggestion_at(16).unwrap().id, "f");
        assert!(tracker.suggestion_at(14).is_none());
        assert_eq!(tracker.suggestions_in(TextRange::new(0, 18)).len(), 2);
    }

    #[test]
    fn test_stale_commit_is_ignored() {
        let mut tracker = tracker("one two", &[("t", 4, "two")]);

        let first = tracker.begin("zero one two");
        let second = tracker.begin("and zero one two");
        assert!(tracker.is_pending());
        assert_eq!(tracker.text(), "and zero one two");
        assert_eq!(tracker.committed_text(), "one two");

        let second = second.run();
        let first = first.run();
        assert_eq!(tracker.commit(second), CommitStatus::Applied);
        assert_eq!(tracker.commit(first), CommitStatus::Superseded);

        assert!(!tracker.is_pending());
        assert_eq!(tracker.get("t").unwrap().range, TextRange::new(13, 16));
    }

    #[test]
    fn test_update_text_supersedes_pending() {
        let mut tracker = tracker("one two", &[("t", 4, "two")]);
        let job = tracker.begin("one, two");
        tracker.update_text("one two three");

        assert_eq!(tracker.commit(job.run()), CommitStatus::Superseded);
        assert_eq!(tracker.get("t").unwrap().range, TextRange::new(4, 7));
        assert_eq!(tracker.text(), "one two three");
    }

    #[test]
    fn test_add_checks_anchor() {
        let mut tracker = tracker("one two", &[]);
        let bad = Suggestion::anchored(
            "x",
            SuggestionCategory::Clarity,
            "one two",
            0,
            "two",
            "",
            "",
        );
        assert_eq!(
            tracker.add(bad.clone()),
            Err(TrackError::AnchorMismatch {
                id: "x".to_string(),
                range: TextRange::new(0, 3),
            })
        );

        let good = Suggestion {
            range: TextRange::new(4, 7),
            ..bad.clone()
        };
        tracker.add(good.clone()).unwrap();
        assert!(matches!(
            tracker.add(Suggestion { id: "y".to_string(), ..good }),
            Err(TrackError::Index(IndexError::Overlap { .. }))
        ));
    }

    #[test]
    fn test_add_refreshes_line_and_column() {
        let text = "one\ntwo three";
        let mut tracker = tracker(text, &[]);
        let stale = Suggestion {
            line: 9,
            column: 42,
            ..Suggestion::anchored("t", SuggestionCategory::Style, text, 8, "three", "", "")
        };
        tracker.add(stale).unwrap();

        let added = tracker.get("t").unwrap();
        assert_eq!(added.range, TextRange::new(8, 13));
        assert_eq!((added.line, added.column), (2, 4));
    }

    #[test]
    fn test_accept_and_dismiss() {
        let mut tracker = tracker("a big cat sat", &[("b", 2, "big"), ("s", 10, "sat")]);

        assert_eq!(tracker.accept("b").as_deref(), Some("a BIG cat sat"));
        assert_eq!(tracker.get("s").unwrap().range, TextRange::new(10, 13));
        assert!(tracker.accept("b").is_none());

        assert_eq!(tracker.dismiss("s").map(|s| s.id), Some("s".to_string()));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_accept_blocked_while_pending() {
        let mut tracker = tracker("a big cat", &[("b", 2, "big")]);
        let _job = tracker.begin("a big cat!");
        assert!(tracker.accept("b").is_none());
        assert!(tracker.get("b").is_some());
    }
}
