#![warn(missing_docs)]
//! Review Core - Position Tracking for Review Suggestions
//!
//! # Overview
//!
//! `review-core` keeps machine-generated revision suggestions ("highlights") spatially correct
//! while the text underneath them is freely edited. It does not render anything and never talks
//! to a reviewer: it consumes full document snapshots plus candidate suggestions, and returns a
//! filtered, position-corrected, non-overlapping set after every keystroke.
//!
//! # Core Features
//!
//! - **Interval Index**: non-overlapping ranges, O(1) id lookup, O(log n + k) spatial queries
//! - **Edit Extraction**: single insert/delete/replace between two snapshots, prefix/suffix scan
//! - **Position Adjustment**: offsets and ranges mapped through one edit
//! - **Reconciliation**: re-validate, re-anchor or retire suggestions after each change
//! - **Single-flight Tracking**: generation counters discard stale off-thread results
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Suggestion Tracker (generations)           │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Reconciler (validate + re-anchor)          │
//! ├─────────────────────────────────────────────┤
//! │  Interval Index (sweepline)  │  Line Map    │
//! ├─────────────────────────────────────────────┤
//! │  Position Adjuster  ←  Edit Extractor       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use review_core::{Suggestion, SuggestionCategory, TextRange, compute_edit, reconcile};
//!
//! let old = "hello world";
//! let new = "oh, hello world";
//!
//! let edit = compute_edit(old, new).unwrap();
//! assert_eq!((edit.offset, edit.delete_count, edit.inserted_text.as_str()), (0, 0, "oh, "));
//!
//! let s = Suggestion::anchored("s1", SuggestionCategory::Grammar, old, 6, "world", "", "World");
//! let out = reconcile(vec![s], old, new);
//! assert_eq!(out[0].range, TextRange::new(10, 15));
//! ```
//!
//! # Module Description
//!
//! - [`range`] - half-open character ranges
//! - [`intervals`] - non-overlapping interval index with sweepline construction
//! - [`delta`] - single-region edit extraction
//! - [`adjust`] - offset/range adjustment through an edit
//! - [`line_map`] - offset ↔ line/column mapping (Rope based)
//! - [`search`] - exact-text occurrence search
//! - [`suggestion`] - suggestion data model
//! - [`reconcile`] - reconciliation pass
//! - [`tracker`] - live suggestion set with single-flight reconciliation
//!
//! # Units
//!
//! All offsets are character offsets (Unicode scalar values). Lines are 1-indexed, columns are
//! 0-indexed characters.

pub mod adjust;
pub mod delta;
pub mod intervals;
pub mod line_map;
pub mod range;
pub mod reconcile;
pub mod search;
pub mod suggestion;
pub mod tracker;

pub use adjust::{EditSpan, adjust_offset, adjust_range};
pub use delta::{TextEdit, compute_edit};
pub use intervals::{BuildOutcome, IndexError, Indexed, OverlapStrategy, RangeIndex};
pub use line_map::{LineMap, LinePosition};
pub use range::{RangeError, TextRange};
pub use reconcile::{
    ReconcileOptions, Reconciler, RelocateScope, find_exact_position, reconcile,
    validate_positions,
};
pub use search::SearchError;
pub use suggestion::{Suggestion, SuggestionCategory};
pub use tracker::{CommitStatus, PendingReconcile, ReconcileResult, SuggestionTracker, TrackError};
