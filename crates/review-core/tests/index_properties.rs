use proptest::prelude::*;
use review_core::{EditSpan, Indexed, OverlapStrategy, RangeIndex, TextRange};

#[derive(Debug, Clone, PartialEq)]
struct Span {
    id: String,
    range: TextRange,
    priority: Option<i64>,
}

impl Indexed for Span {
    fn id(&self) -> &str {
        &self.id
    }

    fn range(&self) -> TextRange {
        self.range
    }

    fn set_range(&mut self, range: TextRange) {
        self.range = range;
    }

    fn priority(&self) -> Option<i64> {
        self.priority
    }
}

fn spans() -> impl Strategy<Value = Vec<Span>> {
    prop::collection::vec((0usize..200, 0usize..20, prop::option::of(-5i64..5)), 0..40).prop_map(
        |raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, (start, len, priority))| Span {
                    id: format!("s{i}"),
                    range: TextRange::at(start, len),
                    priority,
                })
                .collect()
        },
    )
}

fn strategies() -> impl Strategy<Value = OverlapStrategy> {
    prop_oneof![
        Just(OverlapStrategy::KeepFirst),
        Just(OverlapStrategy::KeepHigherPriority),
        Just(OverlapStrategy::RejectAll),
    ]
}

fn edits() -> impl Strategy<Value = EditSpan> {
    (0usize..220, 0usize..30, 0usize..30).prop_map(|(offset, delete_count, insert_len)| {
        EditSpan::new(offset, delete_count, insert_len)
    })
}

fn assert_invariants(index: &RangeIndex<Span>) {
    let items = index.as_slice();
    for pair in items.windows(2) {
        let (a, b) = (pair[0].range, pair[1].range);
        assert!((a.start(), a.end()) <= (b.start(), b.end()), "{a} sorted before {b}");
        assert!(!a.overlaps(&b), "{a} overlaps {b}");
    }
    for item in items {
        assert_eq!(index.get(&item.id), Some(item));
    }
}

proptest! {
    #[test]
    fn from_vec_partitions_candidates(input in spans(), strategy in strategies()) {
        let outcome = RangeIndex::from_vec(input.clone(), strategy);
        assert_invariants(&outcome.index);
        prop_assert_eq!(outcome.index.len() + outcome.rejected.len(), input.len());

        // Every stored pair is conflict-free, so no accepted id is recorded against another
        // accepted id.
        for (id, others) in &outcome.overlap_groups {
            if outcome.index.contains_id(id) {
                for other in others {
                    prop_assert!(!outcome.index.contains_id(other));
                }
            }
        }
    }

    #[test]
    fn non_evicting_strategies_reject_only_conflicting(
        input in spans(),
        strategy in prop_oneof![Just(OverlapStrategy::KeepFirst), Just(OverlapStrategy::RejectAll)],
    ) {
        let outcome = RangeIndex::from_vec(input, strategy);
        // Nothing is evicted, so every rejected candidate collides with a kept item.
        for rejected in &outcome.rejected {
            prop_assert!(!outcome.index.query_range(rejected.range).is_empty());
        }
    }

    #[test]
    fn reject_all_ignores_priorities(input in spans()) {
        let first = RangeIndex::from_vec(input.clone(), OverlapStrategy::KeepFirst);
        let reject = RangeIndex::from_vec(input, OverlapStrategy::RejectAll);
        prop_assert_eq!(first.index.as_slice(), reject.index.as_slice());
    }

    #[test]
    fn add_never_breaks_invariants(input in spans()) {
        let mut index = RangeIndex::new();
        for span in input {
            let range = span.range;
            let conflicts = index.query_range(range).len();
            let result = index.add(span);
            prop_assert_eq!(result.is_ok(), conflicts == 0);
            assert_invariants(&index);
        }
    }

    #[test]
    fn apply_edit_keeps_invariants(input in spans(), edit in edits()) {
        let mut index = RangeIndex::from_vec(input, OverlapStrategy::KeepFirst).index;
        let before = index.len();
        let dropped = index.apply_edit(edit);
        assert_invariants(&index);
        prop_assert_eq!(index.len() + dropped.len(), before);
    }

    #[test]
    fn filter_keeps_invariants(input in spans(), modulus in 1usize..5) {
        let index = RangeIndex::from_vec(input, OverlapStrategy::RejectAll).index;
        let filtered = index.filter(|s| s.range.start() % modulus == 0);
        assert_invariants(&filtered);
        prop_assert!(filtered.all(|s| s.range.start() % modulus == 0));
    }

    #[test]
    fn point_query_matches_linear_scan(input in spans(), pos in 0usize..230) {
        let index = RangeIndex::from_vec(input, OverlapStrategy::KeepFirst).index;
        let expected: Vec<&str> = index
            .iter()
            .filter(|s| s.range.contains(pos))
            .map(|s| s.id.as_str())
            .collect();
        let found: Vec<&str> = index
            .query_point(pos)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn range_query_matches_linear_scan(input in spans(), start in 0usize..230, len in 0usize..40) {
        let index = RangeIndex::from_vec(input, OverlapStrategy::KeepFirst).index;
        let query = TextRange::at(start, len);
        let expected: Vec<&str> = index
            .iter()
            .filter(|s| s.range.overlaps(&query))
            .map(|s| s.id.as_str())
            .collect();
        let found: Vec<&str> = index
            .query_range(query)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        prop_assert_eq!(found, expected);
    }
}

#[test]
fn test_higher_priority_evicts_and_groups_both_ways() {
    let span = |id: &str, start, end, priority| Span {
        id: id.to_string(),
        range: TextRange::new(start, end),
        priority,
    };
    let outcome = RangeIndex::from_vec(
        vec![
            span("low", 0, 10, Some(1)),
            span("high", 5, 15, Some(9)),
            span("none", 12, 20, None),
        ],
        OverlapStrategy::KeepHigherPriority,
    );

    let kept: Vec<_> = outcome.index.ids().collect();
    assert_eq!(kept, vec!["high"]);
    let mut rejected: Vec<_> = outcome.rejected.iter().map(|s| s.id.as_str()).collect();
    rejected.sort_unstable();
    assert_eq!(rejected, vec!["low", "none"]);
    assert_eq!(outcome.overlap_groups["high"], vec!["low", "none"]);
    assert_eq!(outcome.overlap_groups["low"], vec!["high"]);
}
