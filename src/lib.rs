//! # avlbst
//!
//! An ordered map built on an AVL tree whose nodes carry parent links.
//!
//! ## Overview
//!
//! The crate is split in two layers that mirror how the tree is maintained:
//!
//! - [`BinarySearchTree`]: the unbalanced base. It knows how to find, link and
//!   unlink nodes, how to walk to in-order neighbours, and how to make two nodes
//!   trade places.
//! - [`AvlTree`]: wraps the base tree and repairs balance factors with
//!   rotations after every structural change, keeping the height within the
//!   AVL bound.
//!
//! Nodes live in an arena owned by the tree. Links between nodes, including
//! the parent back-reference, are [`NodeId`] indices rather than pointers.
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`AvlTree`] (as a map)
//! - `tracing`: emit rebalancing events through the `tracing` crate
//! - `full`: enable all features
//!
//! ## Example
//!
//! ```rust
//! use avlbst::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for key in 1..=7 {
//!     tree.insert(key, key * 10);
//! }
//!
//! assert_eq!(tree.root_key(), Some(&4));
//! assert_eq!(tree.height(), 3);
//! assert_eq!(tree.get(&5), Some(&50));
//!
//! tree.remove(&1);
//! let keys: Vec<i32> = tree.keys().copied().collect();
//! assert_eq!(keys, vec![2, 3, 4, 5, 6, 7]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod tracing_helpers;

pub mod tree;

pub use tree::{
    AvlTree, BinarySearchTree, InsertOutcome, IntoIter, InvariantViolation, Iter, KeyError, Keys,
    Node, NodeId, Removal, Side, Values,
};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use avlbst::prelude::*;
///
/// let tree: AvlTree<i32, &str> = [(2, "two"), (1, "one")].into_iter().collect();
/// assert_eq!(tree.try_get(&3), Err(KeyError));
/// ```
pub mod prelude {
    pub use crate::tree::{AvlTree, BinarySearchTree, KeyError, NodeId, Side};
}
