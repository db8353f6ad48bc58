//! Binary search trees with parent links.
//!
//! This module provides two trees that share one node representation:
//!
//! - [`BinarySearchTree`]: an unbalanced search tree exposing the raw
//!   structural primitives (link, unlink, neighbour navigation, node swap)
//! - [`AvlTree`]: a height-balanced ordered map built on those primitives
//!
//! # Node Storage
//!
//! Every node is stored in an arena owned by the tree and addressed by a
//! [`NodeId`]. The left and right links express ownership of the subtree; the
//! parent link is a plain back-reference used for upward walks. A `NodeId`
//! stays valid until the node it names is removed, even when other nodes are
//! removed or rotated around it.
//!
//! # Examples
//!
//! ```rust
//! use avlbst::tree::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! tree.insert(10, "ten");
//! tree.insert(20, "twenty");
//! tree.insert(30, "thirty");
//!
//! // Ascending inserts trigger a single left rotation
//! assert_eq!(tree.root_key(), Some(&20));
//! assert_eq!(tree.balance_of(&10), Some(0));
//! assert_eq!(tree.balance_of(&30), Some(0));
//! ```

mod arena;
mod avl;
mod bst;
mod error;
mod iter;
mod node;
mod render;
mod validate;

pub use avl::AvlTree;
pub use bst::{BinarySearchTree, InsertOutcome, Removal};
pub use error::{InvariantViolation, KeyError};
pub use iter::{IntoIter, Iter, Keys, Values};
pub use node::{Node, NodeId, Side};
