//! Property-based tests for AvlTree.
//!
//! These tests verify that AvlTree behaves like an ordered map and keeps
//! its structural invariants under arbitrary sequences of operations,
//! using `BTreeMap` as the reference model.

use avlbst::AvlTree;
use proptest::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

#[derive(Clone, Debug)]
enum Operation {
    Insert(i16, i32),
    Remove(i16),
}

/// Small key space so that removals and overwrites hit existing keys often.
fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (-64_i16..64, any::<i32>()).prop_map(|(key, value)| Operation::Insert(key, value)),
        2 => (-64_i16..64).prop_map(Operation::Remove),
    ]
}

fn arbitrary_tree(max_size: usize) -> impl Strategy<Value = AvlTree<i32, i32>> {
    prop::collection::vec((any::<i32>(), any::<i32>()), 0..max_size)
        .prop_map(|entries| entries.into_iter().collect::<AvlTree<i32, i32>>())
}

/// Distinct keys paired with a shuffled order to remove them in.
fn keys_with_removal_order(max_size: usize) -> impl Strategy<Value = (Vec<i32>, Vec<i32>)> {
    prop::collection::hash_set(any::<i32>(), 0..max_size).prop_flat_map(|set| {
        let inserted: Vec<i32> = set.into_iter().collect();
        (Just(inserted.clone()), Just(inserted).prop_shuffle())
    })
}

/// Largest height an AVL tree with `length` nodes can have.
fn avl_height_bound(length: usize) -> usize {
    let (mut smaller, mut larger) = (0_usize, 1_usize);
    let mut height = 0;
    while larger <= length {
        (smaller, larger) = (larger, larger + smaller + 1);
        height += 1;
    }
    height
}

// =============================================================================
// Model Laws
// =============================================================================

proptest! {
    /// Law: any operation sequence leaves the same entries as BTreeMap and a
    /// tree that satisfies every invariant after each step.
    #[test]
    fn prop_matches_btreemap_model(operations in prop::collection::vec(operation(), 0..200)) {
        let mut tree = AvlTree::new();
        let mut model = BTreeMap::new();

        for operation in operations {
            match operation {
                Operation::Insert(key, value) => {
                    prop_assert_eq!(tree.insert(key, value), model.insert(key, value));
                }
                Operation::Remove(key) => {
                    prop_assert_eq!(tree.remove(&key), model.remove(&key));
                }
            }
            prop_assert_eq!(tree.validate(), Ok(()));
            prop_assert_eq!(tree.len(), model.len());
        }

        let entries: Vec<(i16, i32)> = tree.iter().map(|(key, value)| (*key, *value)).collect();
        let expected: Vec<(i16, i32)> = model.into_iter().collect();
        prop_assert_eq!(entries, expected);
    }

    /// Law: get after insert returns the inserted value.
    #[test]
    fn prop_get_insert_law(tree in arbitrary_tree(50), key: i32, value: i32) {
        let mut tree = tree;
        tree.insert(key, value);
        prop_assert_eq!(tree.get(&key), Some(&value));
    }

    /// Law: remove does not affect other keys.
    #[test]
    fn prop_get_remove_other_law(tree in arbitrary_tree(50), key1: i32, key2: i32) {
        prop_assume!(key1 != key2);
        let mut removed = tree.clone();
        removed.remove(&key1);
        prop_assert_eq!(removed.get(&key1), None);
        prop_assert_eq!(removed.get(&key2), tree.get(&key2));
    }
}

// =============================================================================
// Structural Laws
// =============================================================================

proptest! {
    /// Law: in-order traversal is strictly increasing.
    #[test]
    fn prop_iteration_strictly_increasing(tree in arbitrary_tree(100)) {
        let keys: Vec<&i32> = tree.keys().collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(keys.len(), tree.len());
    }

    /// Law: reverse iteration is the reverse of forward iteration.
    #[test]
    fn prop_reverse_iteration(tree in arbitrary_tree(100)) {
        let mut forward: Vec<&i32> = tree.keys().collect();
        let backward: Vec<&i32> = tree.keys().rev().collect();
        forward.reverse();
        prop_assert_eq!(forward, backward);
    }

    /// Law: the height never exceeds the AVL bound for the tree's size.
    #[test]
    fn prop_height_bound(keys in prop::collection::vec(any::<i32>(), 0..500)) {
        let tree: AvlTree<i32, ()> = keys.into_iter().map(|key| (key, ())).collect();
        prop_assert!(tree.height() <= avl_height_bound(tree.len()));
    }

    /// Law: overwriting an existing key changes neither shape nor balances.
    #[test]
    fn prop_overwrite_keeps_shape(tree in arbitrary_tree(60), index: prop::sample::Index, value: i32) {
        prop_assume!(!tree.is_empty());
        let key = *tree.keys().nth(index.index(tree.len())).unwrap();
        let mut updated = tree.clone();
        updated.insert(key, value);
        prop_assert_eq!(updated.render(), tree.render());
        prop_assert_eq!(updated.get(&key), Some(&value));
    }

    /// Law: inserting n keys and removing them in any order empties the tree.
    #[test]
    fn prop_round_trip_empties(
        (inserted, removal_order) in keys_with_removal_order(200)
    ) {
        let mut tree: AvlTree<i32, ()> = inserted.iter().map(|&key| (key, ())).collect();
        for key in removal_order {
            prop_assert!(tree.remove(&key).is_some());
            prop_assert_eq!(tree.validate(), Ok(()));
        }
        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.root_key(), None);
    }
}

#[test]
fn avl_height_bound_matches_fibonacci_trees() {
    assert_eq!(avl_height_bound(0), 0);
    assert_eq!(avl_height_bound(1), 1);
    assert_eq!(avl_height_bound(2), 2);
    assert_eq!(avl_height_bound(4), 3);
    assert_eq!(avl_height_bound(6), 3);
    assert_eq!(avl_height_bound(7), 4);
    assert_eq!(avl_height_bound(1000), 14);
}
