use std::collections::BTreeSet;

use bplus_set::BPlusSet;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 10_000;

/// Generates random values in a range narrow enough to ensure collisions.
fn value_strategy() -> impl Strategy<Value = i64> {
    -20_000i64..20_000i64
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum SetOp {
    Insert(i64),
    Remove(i64),
    Contains(i64),
    Get(i64),
    First,
    Last,
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        5 => value_strategy().prop_map(SetOp::Insert),
        3 => value_strategy().prop_map(SetOp::Remove),
        2 => value_strategy().prop_map(SetOp::Contains),
        1 => value_strategy().prop_map(SetOp::Get),
        1 => Just(SetOp::First),
        1 => Just(SetOp::Last),
    ]
}

// ─── Core CRUD operations ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of insert/remove/lookup operations on both
    /// BPlusSet and BTreeSet and asserts identical results at every step.
    #[test]
    fn set_ops_match_btreeset(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        let mut bp_set: BPlusSet<i64> = BPlusSet::new();
        let mut bt_set: BTreeSet<i64> = BTreeSet::new();

        for op in &ops {
            match op {
                SetOp::Insert(v) => {
                    let bp_result = bp_set.insert(*v);
                    let bt_result = bt_set.insert(*v);
                    prop_assert_eq!(bp_result, bt_result, "insert({})", v);
                }
                SetOp::Remove(v) => {
                    let bp_result = bp_set.remove(v);
                    let bt_result = bt_set.remove(v);
                    prop_assert_eq!(bp_result, bt_result, "remove({})", v);
                }
                SetOp::Contains(v) => {
                    let bp_result = bp_set.contains(v);
                    let bt_result = bt_set.contains(v);
                    prop_assert_eq!(bp_result, bt_result, "contains({})", v);
                }
                SetOp::Get(v) => {
                    let bp_result = bp_set.get(v);
                    let bt_result = bt_set.get(v);
                    prop_assert_eq!(bp_result, bt_result, "get({})", v);
                }
                SetOp::First => {
                    let bp_result = bp_set.first();
                    let bt_result = bt_set.first();
                    prop_assert_eq!(bp_result, bt_result, "first()");
                }
                SetOp::Last => {
                    let bp_result = bp_set.last();
                    let bt_result = bt_set.last();
                    prop_assert_eq!(bp_result, bt_result, "last()");
                }
            }
            prop_assert_eq!(bp_set.len(), bt_set.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(bp_set.is_empty(), bt_set.is_empty(), "is_empty mismatch after {:?}", op);
        }
    }

    /// Tests that iteration order matches BTreeSet after random insertions.
    #[test]
    fn iter_matches_btreeset(values in proptest::collection::vec(value_strategy(), TEST_SIZE)) {
        let bp_set: BPlusSet<i64> = values.iter().cloned().collect();
        let bt_set: BTreeSet<i64> = values.iter().cloned().collect();

        let bp_items: Vec<_> = bp_set.iter().copied().collect();
        let bt_items: Vec<_> = bt_set.iter().copied().collect();
        prop_assert_eq!(&bp_items, &bt_items, "iter() mismatch");

        // into_iter
        let bp_into: Vec<_> = bp_set.clone().into_iter().collect();
        let bt_into: Vec<_> = bt_set.clone().into_iter().collect();
        prop_assert_eq!(&bp_into, &bt_into, "into_iter() mismatch");
    }

    /// Tests ExactSizeIterator accounting as the iterator advances.
    #[test]
    fn iter_len_tracks_remaining(values in proptest::collection::vec(value_strategy(), 1..TEST_SIZE)) {
        let bp_set: BPlusSet<i64> = values.iter().cloned().collect();

        let mut iter = bp_set.iter();
        prop_assert_eq!(iter.len(), bp_set.len(), "ExactSizeIterator len mismatch");

        let mut remaining = bp_set.len();
        while iter.next().is_some() {
            remaining -= 1;
            prop_assert_eq!(iter.len(), remaining);
            prop_assert_eq!(iter.size_hint(), (remaining, Some(remaining)));
        }

        // FusedIterator: once None, always None.
        for _ in 0..10 {
            prop_assert_eq!(iter.next(), None);
        }
    }

    /// Tests clear empties the set and leaves it reusable.
    #[test]
    fn clear_empties_set(values in proptest::collection::vec(value_strategy(), TEST_SIZE)) {
        let mut bp_set: BPlusSet<i64> = values.iter().cloned().collect();
        bp_set.clear();
        prop_assert!(bp_set.is_empty());
        prop_assert_eq!(bp_set.len(), 0);
        prop_assert_eq!(bp_set.iter().count(), 0);

        bp_set.insert(1);
        prop_assert_eq!(bp_set.len(), 1);
        prop_assert!(bp_set.contains(&1));
    }

    /// Tests that removing every inserted value in a random order drains the
    /// set back to empty.
    #[test]
    fn full_drain_reaches_empty(values in proptest::collection::vec(value_strategy(), TEST_SIZE)) {
        let mut bp_set: BPlusSet<i64> = values.iter().cloned().collect();
        let unique: BTreeSet<i64> = values.iter().cloned().collect();

        for v in &values {
            let expected = bp_set.contains(v);
            prop_assert_eq!(bp_set.remove(v), expected, "remove({})", v);
        }

        prop_assert!(bp_set.is_empty(), "set not empty after removing all {} values", unique.len());
        prop_assert_eq!(bp_set.first(), None);
        prop_assert_eq!(bp_set.last(), None);
    }

    /// Tests swap exchanges contents without disturbing either set.
    #[test]
    fn swap_matches_btreeset(
        values_a in proptest::collection::vec(value_strategy(), TEST_SIZE / 2),
        values_b in proptest::collection::vec(value_strategy(), TEST_SIZE / 2),
    ) {
        let mut bp_a: BPlusSet<i64> = values_a.iter().cloned().collect();
        let mut bp_b: BPlusSet<i64> = values_b.iter().cloned().collect();
        let bt_a: BTreeSet<i64> = values_a.iter().cloned().collect();
        let bt_b: BTreeSet<i64> = values_b.iter().cloned().collect();

        bp_a.swap(&mut bp_b);

        let a_items: Vec<_> = bp_a.iter().copied().collect();
        let b_items: Vec<_> = bp_b.iter().copied().collect();
        prop_assert_eq!(&a_items, &bt_b.iter().copied().collect::<Vec<_>>(), "swap left mismatch");
        prop_assert_eq!(&b_items, &bt_a.iter().copied().collect::<Vec<_>>(), "swap right mismatch");
    }
}

// ─── Trait implementations ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Tests FromIterator and Extend match BTreeSet.
    #[test]
    fn extend_matches_btreeset(
        initial in proptest::collection::vec(value_strategy(), TEST_SIZE / 2),
        extra in proptest::collection::vec(value_strategy(), TEST_SIZE / 2),
    ) {
        let mut bp_set: BPlusSet<i64> = initial.iter().cloned().collect();
        let mut bt_set: BTreeSet<i64> = initial.iter().cloned().collect();

        bp_set.extend(extra.iter().cloned());
        bt_set.extend(extra.iter().cloned());

        let bp_items: Vec<_> = bp_set.iter().copied().collect();
        let bt_items: Vec<_> = bt_set.iter().copied().collect();
        prop_assert_eq!(&bp_items, &bt_items, "extend mismatch");
    }

    /// Tests Clone produces an equal but independent set.
    #[test]
    fn clone_produces_equal_set(values in proptest::collection::vec(value_strategy(), TEST_SIZE)) {
        let bp_set: BPlusSet<i64> = values.iter().cloned().collect();
        let cloned = bp_set.clone();

        prop_assert_eq!(bp_set.len(), cloned.len());
        let bp_items: Vec<_> = bp_set.iter().copied().collect();
        let cl_items: Vec<_> = cloned.iter().copied().collect();
        prop_assert_eq!(&bp_items, &cl_items, "clone content mismatch");
    }

    /// Tests PartialEq / Eq.
    #[test]
    fn eq_matches_btreeset(
        values_a in proptest::collection::vec(value_strategy(), TEST_SIZE / 2),
        values_b in proptest::collection::vec(value_strategy(), TEST_SIZE / 2),
    ) {
        let bp_a: BPlusSet<i64> = values_a.iter().cloned().collect();
        let bp_b: BPlusSet<i64> = values_b.iter().cloned().collect();
        let bt_a: BTreeSet<i64> = values_a.iter().cloned().collect();
        let bt_b: BTreeSet<i64> = values_b.iter().cloned().collect();

        prop_assert_eq!(bp_a == bp_b, bt_a == bt_b, "equality mismatch");
    }

    /// Tests Ord / PartialOrd.
    #[test]
    fn ord_matches_btreeset(
        values_a in proptest::collection::vec(value_strategy(), TEST_SIZE / 2),
        values_b in proptest::collection::vec(value_strategy(), TEST_SIZE / 2),
    ) {
        let bp_a: BPlusSet<i64> = values_a.iter().cloned().collect();
        let bp_b: BPlusSet<i64> = values_b.iter().cloned().collect();
        let bt_a: BTreeSet<i64> = values_a.iter().cloned().collect();
        let bt_b: BTreeSet<i64> = values_b.iter().cloned().collect();

        prop_assert_eq!(bp_a.cmp(&bp_b), bt_a.cmp(&bt_b), "Ord mismatch");
        prop_assert_eq!(bp_a.partial_cmp(&bp_b), bt_a.partial_cmp(&bt_b), "PartialOrd mismatch");
    }

    /// Tests Hash consistency for equal sets built in different orders.
    #[test]
    fn hash_consistent_for_equal_sets(values in proptest::collection::vec(value_strategy(), TEST_SIZE)) {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let bp_set1: BPlusSet<i64> = values.iter().cloned().collect();
        let bp_set2: BPlusSet<i64> = values.iter().rev().cloned().collect();

        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        bp_set1.hash(&mut h1);
        bp_set2.hash(&mut h2);

        prop_assert_eq!(h1.finish(), h2.finish(), "equal sets should have equal hashes");
    }
}

// ─── Deterministic Insertion Pattern Tests ────────────────────────────────────

/// Helper function to generate deterministic pseudo-random values using LCG.
fn random_values_deterministic(n: usize) -> Vec<i64> {
    let mut values = Vec::with_capacity(n);
    let mut x: u64 = 12345; // Fixed seed for reproducibility
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        values.push((x >> 33) as i64);
    }
    values
}

mod insertion_pattern_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const N: usize = 10_000;

    /// Tests ordered (ascending) inserts match BTreeSet.
    #[test]
    fn ordered_inserts_match_btreeset() {
        let mut bp_set: BPlusSet<i64> = BPlusSet::new();
        let mut bt_set: BTreeSet<i64> = BTreeSet::new();

        for i in 0..N as i64 {
            bp_set.insert(i);
            bt_set.insert(i);
        }

        assert_eq!(bp_set.len(), N);
        let bp_items: Vec<_> = bp_set.iter().copied().collect();
        let bt_items: Vec<_> = bt_set.iter().copied().collect();
        assert_eq!(bp_items, bt_items, "ordered inserts content mismatch");

        assert_eq!(bp_set.first(), bt_set.first());
        assert_eq!(bp_set.last(), bt_set.last());
    }

    /// Tests reverse-ordered (descending) inserts match BTreeSet.
    #[test]
    fn reverse_ordered_inserts_match_btreeset() {
        let mut bp_set: BPlusSet<i64> = BPlusSet::new();
        let mut bt_set: BTreeSet<i64> = BTreeSet::new();

        for i in (0..N as i64).rev() {
            bp_set.insert(i);
            bt_set.insert(i);
        }

        assert_eq!(bp_set.len(), N);
        let bp_items: Vec<_> = bp_set.iter().copied().collect();
        let bt_items: Vec<_> = bt_set.iter().copied().collect();
        assert_eq!(bp_items, bt_items, "reverse ordered inserts content mismatch");
    }

    /// Tests random inserts match BTreeSet.
    #[test]
    fn random_inserts_match_btreeset() {
        let values = random_values_deterministic(N);
        let mut bp_set: BPlusSet<i64> = BPlusSet::new();
        let mut bt_set: BTreeSet<i64> = BTreeSet::new();

        for &v in &values {
            bp_set.insert(v);
            bt_set.insert(v);
        }

        assert_eq!(bp_set.len(), bt_set.len());
        let bp_items: Vec<_> = bp_set.iter().copied().collect();
        let bt_items: Vec<_> = bt_set.iter().copied().collect();
        assert_eq!(bp_items, bt_items, "random inserts content mismatch");
    }

    /// Tests ascending-order removal, which drains the leftmost leaf over and
    /// over and exercises merge-and-collapse at every level.
    #[test]
    fn ascending_removal_drains_to_empty() {
        let mut bp_set: BPlusSet<i64> = (0..N as i64).collect();

        for i in 0..N as i64 {
            assert!(bp_set.remove(&i), "remove({i}) should succeed");
            assert_eq!(bp_set.len(), N - 1 - i as usize);
            let expected_first = i + 1;
            assert_eq!(bp_set.first(), if (i as usize) < N - 1 { Some(&expected_first) } else { None });
        }

        assert!(bp_set.is_empty());
    }

    /// Tests descending-order removal, exercising rightmost-child rebalancing
    /// where the left sibling is the only repair candidate.
    #[test]
    fn descending_removal_drains_to_empty() {
        let mut bp_set: BPlusSet<i64> = (0..N as i64).collect();

        for i in (0..N as i64).rev() {
            assert!(bp_set.remove(&i), "remove({i}) should succeed");
            let expected_last = i - 1;
            assert_eq!(bp_set.last(), if i > 0 { Some(&expected_last) } else { None });
        }

        assert!(bp_set.is_empty());
    }

    /// Tests alternating inserts and removes around a moving window, keeping
    /// the tree near minimum occupancy for long stretches.
    #[test]
    fn sliding_window_matches_btreeset() {
        let mut bp_set: BPlusSet<i64> = BPlusSet::new();
        let mut bt_set: BTreeSet<i64> = BTreeSet::new();

        for i in 0..N as i64 {
            bp_set.insert(i);
            bt_set.insert(i);
            if i >= 100 {
                bp_set.remove(&(i - 100));
                bt_set.remove(&(i - 100));
            }
            assert_eq!(bp_set.len(), bt_set.len(), "len mismatch at step {i}");
        }

        let bp_items: Vec<_> = bp_set.iter().copied().collect();
        let bt_items: Vec<_> = bt_set.iter().copied().collect();
        assert_eq!(bp_items, bt_items, "sliding window content mismatch");
    }
}

// ─── Diagnostics ─────────────────────────────────────────────────────────────

/// The dump output is unstable, but it must always mention the element count
/// and render something for every key.
#[test]
fn dump_mentions_len_and_keys() {
    let set: BPlusSet<i32> = (1..=5).collect();
    let dump = set.dump();

    assert!(dump.contains("len=5"), "{dump}");
    for key in 1..=5 {
        assert!(dump.contains(&key.to_string()), "missing {key} in:\n{dump}");
    }
}

/// Borrowed lookups work through `Borrow`, like the std collections.
#[test]
fn borrowed_key_lookups() {
    let set: BPlusSet<String> = ["apple", "banana", "cherry"].iter().map(|s| s.to_string()).collect();

    assert!(set.contains("banana"));
    assert!(!set.contains("durian"));
    assert_eq!(set.get("cherry").map(String::as_str), Some("cherry"));
    assert!(set.clone().remove("apple"));
}
