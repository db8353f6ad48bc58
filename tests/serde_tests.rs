#![cfg(feature = "serde")]

//! Integration tests for serde support in avlbst.
//!
//! AvlTree serializes as a map in ascending key order and rebuilds a
//! balanced tree on deserialization.

use avlbst::AvlTree;
use rstest::rstest;

// =============================================================================
// AvlTree Integration Tests
// =============================================================================

#[rstest]
fn test_avl_tree_json_roundtrip() {
    let tree: AvlTree<String, i32> = (0..100)
        .map(|element_index| (format!("key{element_index:03}"), element_index))
        .collect();
    let json = serde_json::to_string(&tree).unwrap();
    let restored: AvlTree<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(tree, restored);
    assert!(restored.validate().is_ok());
}

#[rstest]
fn test_avl_tree_preserves_order_in_json() {
    let tree: AvlTree<String, i32> = [("c", 3), ("a", 1), ("b", 2)]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    let json = serde_json::to_string(&tree).unwrap();
    assert_eq!(json, r#"{"a":1,"b":2,"c":3}"#);
}

#[rstest]
fn test_avl_tree_integer_keys() {
    let tree: AvlTree<i64, String> = [(10, "ten"), (-2, "minus two")]
        .into_iter()
        .map(|(key, value)| (key, value.to_string()))
        .collect();

    let json = serde_json::to_string(&tree).unwrap();
    assert_eq!(json, r#"{"-2":"minus two","10":"ten"}"#);
    let restored: AvlTree<i64, String> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.get(&-2), Some(&"minus two".to_string()));
}

#[rstest]
fn test_avl_tree_deserialize_rebalances_sorted_input() {
    let json = r#"{"1":1,"2":2,"3":3,"4":4,"5":5,"6":6,"7":7}"#;
    let tree: AvlTree<u8, u8> = serde_json::from_str(json).unwrap();
    assert_eq!(tree.root_key(), Some(&4));
    assert_eq!(tree.height(), 3);
}

// =============================================================================
// Edge Case Tests
// =============================================================================

#[rstest]
fn test_empty_and_singleton() {
    let empty: AvlTree<String, i32> = AvlTree::new();
    assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");

    let mut singleton = AvlTree::new();
    singleton.insert("key".to_string(), 42);
    assert_eq!(serde_json::to_string(&singleton).unwrap(), r#"{"key":42}"#);
}

#[rstest]
fn test_duplicate_keys_keep_last_value() {
    let json = r#"{"a":1,"a":2}"#;
    let tree: AvlTree<String, i32> = serde_json::from_str(json).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get("a"), Some(&2));
}

#[rstest]
fn test_avl_tree_type_mismatch_error() {
    let json = r#""not a map""#;
    let result: Result<AvlTree<String, i32>, _> = serde_json::from_str(json);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("a map"));
}
