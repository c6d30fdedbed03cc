//! Property-based invariant tests for `QueryList`.
//!
//! These tests verify invariants that must hold for **any** sequence of
//! resets:
//!
//! 1. `to_vec` after `reset(s)` equals `s`.
//! 2. `len` always equals `to_vec().len()`.
//! 3. `first`/`last` match the ends of `to_vec`, or are `None` when empty.
//! 4. `map`, `filter`, `reduce` agree with the same operations on `to_vec`.
//! 5. `version` counts resets.
//! 6. Each broadcast reaches each subscribed observer exactly once.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use querylist::QueryList;

// ── Strategies ──────────────────────────────────────────────────────────

/// Item sequences, with duplicates likely.
fn items() -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(-50i32..50, 0..64)
}

/// A series of repopulations.
fn reset_series() -> impl Strategy<Value = Vec<Vec<i32>>> {
    proptest::collection::vec(items(), 1..8)
}

proptest! {
    #[test]
    fn reset_then_to_vec_roundtrips(s in items()) {
        let mut list = QueryList::new();
        list.reset(s.clone());
        prop_assert_eq!(list.to_vec(), s);
    }

    #[test]
    fn len_tracks_every_reset(series in reset_series()) {
        let mut list = QueryList::new();
        for s in &series {
            list.reset(s.iter().copied());
            prop_assert_eq!(list.len(), list.to_vec().len());
            prop_assert_eq!(list.is_empty(), s.is_empty());
        }
        prop_assert_eq!(list.version(), series.len() as u64);
    }

    #[test]
    fn first_and_last_match_snapshot(s in items()) {
        let list = QueryList::from(s.clone());
        let snapshot = list.to_vec();
        prop_assert_eq!(list.first(), snapshot.first());
        prop_assert_eq!(list.last(), snapshot.last());
        if !snapshot.is_empty() {
            prop_assert_eq!(list.last(), Some(&snapshot[list.len() - 1]));
        }
    }

    #[test]
    fn derived_views_match_snapshot(s in items(), k in 1i32..7) {
        let list = QueryList::from(s);
        let snapshot = list.to_vec();

        prop_assert_eq!(
            list.map(|v| v * k),
            snapshot.iter().map(|v| v * k).collect::<Vec<_>>()
        );
        prop_assert_eq!(
            list.filter(|v| v % k == 0),
            snapshot.iter().copied().filter(|v| v % k == 0).collect::<Vec<_>>()
        );
        prop_assert_eq!(
            list.reduce(|acc: i64, v| acc * 3 + i64::from(*v), 1),
            snapshot.iter().fold(1i64, |acc, v| acc * 3 + i64::from(*v))
        );

        let mut visited = Vec::new();
        list.for_each(|v| visited.push(*v));
        prop_assert_eq!(visited, snapshot.clone());
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), snapshot);
    }

    #[test]
    fn each_broadcast_reaches_each_observer_once(series in reset_series(), observers in 1usize..5) {
        let mut list = QueryList::new();
        let counters: Vec<Rc<Cell<usize>>> =
            (0..observers).map(|_| Rc::new(Cell::new(0))).collect();
        let _subs: Vec<_> = counters
            .iter()
            .map(|counter| {
                let counter = Rc::clone(counter);
                list.subscribe(move |_: &QueryList<i32>| {
                    counter.set(counter.get() + 1);
                    Ok(())
                })
            })
            .collect();

        for s in &series {
            list.reset(s.clone());
            list.notify_change().unwrap();
        }

        for counter in &counters {
            prop_assert_eq!(counter.get(), series.len());
        }
    }
}
