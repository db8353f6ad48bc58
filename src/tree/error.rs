//! Error types for tree lookups and invariant checks.

use std::fmt;

use super::node::NodeId;

/// Returned by lookups that must find their key.
///
/// # Examples
///
/// ```rust
/// use avlbst::{AvlTree, KeyError};
///
/// let tree: AvlTree<i32, &str> = AvlTree::new();
/// assert_eq!(tree.try_get(&1), Err(KeyError));
/// assert_eq!(format!("{}", KeyError), "key not found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyError;

impl fmt::Display for KeyError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("key not found")
    }
}

impl std::error::Error for KeyError {}

/// A broken structural invariant, found by `validate`.
///
/// These indicate a defect in the tree code itself. They are reported as
/// values so tests and the driver can print which node is wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A key is not strictly between its in-order neighbours.
    Order {
        /// The node whose key is out of order.
        node: NodeId,
    },
    /// A child's parent link does not point back at its parent.
    ParentLink {
        /// The child with the wrong back-reference.
        node: NodeId,
        /// The parent it should point to, `None` for the root.
        expected: Option<NodeId>,
        /// The parent it does point to.
        found: Option<NodeId>,
    },
    /// A stored balance factor differs from the measured height difference.
    BalanceMismatch {
        /// The node with the stale balance factor.
        node: NodeId,
        /// `height(right) - height(left)` measured from the subtrees.
        measured: i32,
        /// The balance factor stored on the node.
        stored: i8,
    },
    /// A node's subtrees differ in height by more than one.
    Unbalanced {
        /// The node whose subtrees are out of balance.
        node: NodeId,
        /// `height(right) - height(left)` measured from the subtrees.
        measured: i32,
    },
    /// The number of reachable nodes differs from the recorded length.
    Length {
        /// The recorded length.
        recorded: usize,
        /// Nodes reachable from the root.
        reachable: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order { node } => write!(formatter, "node {node:?} breaks search order"),
            Self::ParentLink {
                node,
                expected,
                found,
            } => write!(
                formatter,
                "node {node:?} has parent link {found:?}, expected {expected:?}"
            ),
            Self::BalanceMismatch {
                node,
                measured,
                stored,
            } => write!(
                formatter,
                "node {node:?} stores balance {stored} but measures {measured}"
            ),
            Self::Unbalanced { node, measured } => {
                write!(formatter, "node {node:?} is out of balance ({measured})")
            }
            Self::Length {
                recorded,
                reachable,
            } => write!(
                formatter,
                "tree records {recorded} nodes but {reachable} are reachable"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}
