//! Non-overlapping interval index.
//!
//! [`RangeIndex`] stores items that each own a half-open [`TextRange`] and guarantees, after
//! every operation, that:
//!
//! 1. no two stored ranges overlap;
//! 2. items are sorted ascending by `(start, end)`;
//! 3. the id map agrees with item positions;
//! 4. ids are unique.
//!
//! Because stored ranges never overlap, their end offsets are sorted too. Both spatial queries
//! rely on that to binary-search instead of scanning.
//!
//! | operation | complexity |
//! |-----------|------------|
//! | [`RangeIndex::from_vec`] | O(n log n) |
//! | [`RangeIndex::get`] / [`RangeIndex::contains_id`] | O(1) |
//! | [`RangeIndex::query_point`] / [`RangeIndex::query_range`] | O(log n + k) |
//! | [`RangeIndex::add`] / [`RangeIndex::delete`] / [`RangeIndex::apply_edit`] | O(n) |

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adjust::{EditSpan, adjust_range};
use crate::range::TextRange;

/// An item that can be stored in a [`RangeIndex`].
pub trait Indexed {
    /// Globally unique identifier.
    fn id(&self) -> &str;

    /// The range currently owned by the item.
    fn range(&self) -> TextRange;

    /// Replace the owned range (used when edits shift the item).
    fn set_range(&mut self, range: TextRange);

    /// Optional priority used by [`OverlapStrategy::KeepHigherPriority`].
    ///
    /// Items without a priority lose against any item that has one.
    fn priority(&self) -> Option<i64> {
        None
    }
}

/// How [`RangeIndex::from_vec`] resolves overlapping candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapStrategy {
    /// Keep the item that starts first; reject the later-starting one.
    #[default]
    KeepFirst,
    /// Keep the item with the strictly higher priority, evicting lower-priority items that were
    /// already accepted. Ties keep the earlier item.
    KeepHigherPriority,
    /// Always reject the incoming item on any conflict, whatever its priority. Items already
    /// accepted are never evicted.
    RejectAll,
}

/// Errors returned by single-item insertion into a built index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The new item's range overlaps stored ranges.
    #[error("range {range} overlaps {}", describe_conflicts(.conflicts))]
    Overlap {
        /// The rejected range.
        range: TextRange,
        /// Every stored item it conflicts with, as `(id, range)`.
        conflicts: Vec<(String, TextRange)>,
    },
    /// An item with the same id is already stored.
    #[error("duplicate id `{0}`")]
    DuplicateId(String),
}

fn describe_conflicts(conflicts: &[(String, TextRange)]) -> String {
    conflicts
        .iter()
        .map(|(id, range)| format!("`{id}` {range}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of batch construction.
#[derive(Debug)]
pub struct BuildOutcome<T> {
    /// The built index.
    pub index: RangeIndex<T>,
    /// Candidates that were not accepted, in the order they were rejected.
    pub rejected: Vec<T>,
    /// For every item involved in a conflict, the ids of the items it conflicted with.
    pub overlap_groups: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    // End events sort first so touching ranges are never active together.
    End,
    // Zero-width items are checked against the active set but never join it.
    EmptyStart,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Pending,
    Accepted,
    Rejected,
}

/// A container of items with unique ids and pairwise non-overlapping ranges.
#[derive(Debug, Clone)]
pub struct RangeIndex<T> {
    /// Items, sorted by `(start, end)`.
    items: Vec<T>,
    /// id -> position in `items`.
    positions: HashMap<String, usize>,
}

impl<T: Indexed> RangeIndex<T> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Batch-build an index from unordered candidates with a sweepline.
    ///
    /// Overlaps are resolved according to `strategy` rather than reported as errors. Candidates
    /// whose id was already seen are rejected before the sweep.
    pub fn from_vec(items: Vec<T>, strategy: OverlapStrategy) -> BuildOutcome<T> {
        let mut status = vec![Status::Pending; items.len()];
        let mut rejected_order = Vec::new();
        let mut overlap_groups: HashMap<String, Vec<String>> = HashMap::new();

        let mut seen = HashSet::with_capacity(items.len());
        let mut events = Vec::with_capacity(items.len() * 2);
        for (slot, item) in items.iter().enumerate() {
            if !seen.insert(item.id()) {
                tracing::trace!(id = item.id(), "rejecting duplicate id");
                status[slot] = Status::Rejected;
                rejected_order.push(slot);
                continue;
            }
            let range = item.range();
            if range.is_empty() {
                events.push((range.start(), EventKind::EmptyStart, slot));
            } else {
                events.push((range.start(), EventKind::Start, slot));
                events.push((range.end(), EventKind::End, slot));
            }
        }
        events.sort_unstable();

        // Accepted slots currently spanning the sweep position.
        let mut active: Vec<usize> = Vec::new();

        for (_, kind, slot) in events {
            if kind == EventKind::End {
                active.retain(|&s| s != slot);
                continue;
            }

            let range = items[slot].range();
            let conflicts: Vec<usize> = active
                .iter()
                .copied()
                .filter(|&s| items[s].range().overlaps(&range))
                .collect();

            for &other in &conflicts {
                overlap_groups
                    .entry(items[slot].id().to_string())
                    .or_default()
                    .push(items[other].id().to_string());
                overlap_groups
                    .entry(items[other].id().to_string())
                    .or_default()
                    .push(items[slot].id().to_string());
            }

            let joins_active = kind == EventKind::Start;
            if conflicts.is_empty() {
                status[slot] = Status::Accepted;
                if joins_active {
                    active.push(slot);
                }
                continue;
            }

            match strategy {
                OverlapStrategy::KeepFirst => {
                    status[slot] = Status::Rejected;
                    rejected_order.push(slot);
                }
                OverlapStrategy::KeepHigherPriority => {
                    let incoming = items[slot].priority();
                    let best = conflicts
                        .iter()
                        .map(|&s| items[s].priority())
                        .max()
                        .unwrap_or(None);
                    if incoming > best {
                        for &other in &conflicts {
                            tracing::trace!(
                                evicted = items[other].id(),
                                by = items[slot].id(),
                                "evicting lower-priority item"
                            );
                            status[other] = Status::Rejected;
                            rejected_order.push(other);
                        }
                        active.retain(|s| !conflicts.contains(s));
                        status[slot] = Status::Accepted;
                        if joins_active {
                            active.push(slot);
                        }
                    } else {
                        status[slot] = Status::Rejected;
                        rejected_order.push(slot);
                    }
                }
                OverlapStrategy::RejectAll => {
                    status[slot] = Status::Rejected;
                    rejected_order.push(slot);
                }
            }
        }

        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let rejected: Vec<T> = rejected_order
            .into_iter()
            .filter_map(|slot| slots[slot].take())
            .collect();
        let mut accepted: Vec<T> = slots
            .into_iter()
            .zip(status)
            .filter_map(|(item, status)| item.filter(|_| status == Status::Accepted))
            .collect();
        accepted.sort_by_key(|item| sort_key(item));

        let mut index = Self {
            items: accepted,
            positions: HashMap::new(),
        };
        index.rebuild_positions_from(0);

        BuildOutcome {
            index,
            rejected,
            overlap_groups,
        }
    }

    fn rebuild_positions_from(&mut self, start_idx: usize) {
        if start_idx == 0 {
            self.positions.clear();
        }
        for (idx, item) in self.items.iter().enumerate().skip(start_idx) {
            self.positions.insert(item.id().to_string(), idx);
        }
    }

    /// Get number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.positions.get(id).map(|&idx| &self.items[idx])
    }

    /// Check whether an item with `id` is stored.
    pub fn contains_id(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Insert a single item, preserving sort order.
    ///
    /// Fails without modifying the index if the id is taken or the range overlaps any stored
    /// range.
    pub fn add(&mut self, item: T) -> Result<(), IndexError> {
        if self.contains_id(item.id()) {
            return Err(IndexError::DuplicateId(item.id().to_string()));
        }

        let range = item.range();
        let conflicts: Vec<(String, TextRange)> = self
            .query_range(range)
            .into_iter()
            .map(|other| (other.id().to_string(), other.range()))
            .collect();
        if !conflicts.is_empty() {
            return Err(IndexError::Overlap { range, conflicts });
        }

        let key = sort_key(&item);
        let pos = self.items.partition_point(|i| sort_key(i) <= key);
        self.items.insert(pos, item);
        self.rebuild_positions_from(pos);
        Ok(())
    }

    /// Remove the item with `id`, returning it.
    pub fn delete(&mut self, id: &str) -> Option<T> {
        let pos = self.positions.remove(id)?;
        let item = self.items.remove(pos);
        self.rebuild_positions_from(pos);
        Some(item)
    }

    /// Query all items containing `pos`.
    ///
    /// At most one item can match while the non-overlap invariant holds.
    pub fn query_point(&self, pos: usize) -> Vec<&T> {
        self.query_point_impl(pos).0
    }

    fn query_point_impl(&self, pos: usize) -> (Vec<&T>, usize) {
        let mut result = Vec::new();
        let mut scanned = 0usize;

        // Everything before `idx` starts at or before `pos`.
        let idx = self.items.partition_point(|i| i.range().start() <= pos);

        for item in self.items[..idx].iter().rev() {
            scanned += 1;
            let range = item.range();
            // Ends are sorted, so nothing earlier can reach `pos` either.
            if range.end() <= pos {
                break;
            }
            if range.contains(pos) {
                result.push(item);
            }
        }
        result.reverse();

        (result, scanned)
    }

    #[cfg(test)]
    fn query_point_scan_count(&self, pos: usize) -> usize {
        self.query_point_impl(pos).1
    }

    /// Query all items overlapping `range`, in position order.
    ///
    /// Items that merely touch `range` are not reported. A zero-width query returns the items
    /// that strictly contain its position.
    pub fn query_range(&self, range: TextRange) -> Vec<&T> {
        let first = self.items.partition_point(|i| i.range().end() <= range.start());

        self.items[first..]
            .iter()
            .take_while(|i| i.range().start() < range.end())
            .filter(|i| i.range().overlaps(&range))
            .collect()
    }

    /// Map every range through `edit`, dropping items the edit destroys.
    ///
    /// Returns the dropped items.
    pub fn apply_edit(&mut self, edit: EditSpan) -> Vec<T> {
        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());

        for mut item in self.items.drain(..) {
            match adjust_range(item.range(), edit) {
                Some(range) => {
                    item.set_range(range);
                    kept.push(item);
                }
                None => dropped.push(item),
            }
        }

        if !kept.is_sorted_by_key(|i| sort_key(i)) {
            kept.sort_by_key(|i| sort_key(i));
        }

        // Adjustment is monotone, so this only fires on inputs that already violated the
        // invariants; keep the earlier item.
        let mut previous: Option<TextRange> = None;
        for item in kept {
            let range = item.range();
            if previous.is_some_and(|prev| prev.overlaps(&range)) {
                dropped.push(item);
                continue;
            }
            if !range.is_empty() {
                previous = Some(range);
            }
            self.items.push(item);
        }

        self.rebuild_positions_from(0);
        dropped
    }

    /// Keep only the items matching `predicate`.
    pub fn retain(&mut self, mut predicate: impl FnMut(&T) -> bool) {
        self.items.retain(|item| predicate(item));
        self.rebuild_positions_from(0);
    }

    /// Derive a new index containing the items matching `predicate`.
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self
    where
        T: Clone,
    {
        let mut index = Self {
            items: self
                .items
                .iter()
                .filter(|item| predicate(item))
                .cloned()
                .collect(),
            positions: HashMap::new(),
        };
        index.rebuild_positions_from(0);
        index
    }

    /// Map each item, in position order.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Vec<U> {
        self.items.iter().map(f).collect()
    }

    /// Find the first item (in position order) matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| predicate(item))
    }

    /// Returns `true` if any item matches `predicate`.
    pub fn any(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        self.items.iter().any(predicate)
    }

    /// Returns `true` if every item matches `predicate`.
    pub fn all(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        self.items.iter().all(predicate)
    }

    /// Ids of all items, in position order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id())
    }

    /// Iterate items in position order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Items in position order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consume the index, returning items in position order.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

fn sort_key<T: Indexed>(item: &T) -> (usize, usize) {
    let range = item.range();
    (range.start(), range.end())
}

impl<T: Indexed> Default for RangeIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Indexed> IntoIterator for &'a RangeIndex<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Indexed> IntoIterator for RangeIndex<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
