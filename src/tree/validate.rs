//! Whole-tree measurements and invariant checks.
//!
//! All walks here are iterative so that a degenerate (chain-shaped)
//! [`BinarySearchTree`] can be measured without deep recursion.

use super::avl::AvlTree;
use super::bst::BinarySearchTree;
use super::error::InvariantViolation;
use super::node::NodeId;
use crate::tracing_helpers::warn_log;

impl<K, V> BinarySearchTree<K, V> {
    /// Node ids with every child listed before its parent.
    fn post_order(&self) -> Vec<NodeId> {
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        let mut order = Vec::with_capacity(self.len());
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = &self.nodes[id];
            stack.extend(node.left);
            stack.extend(node.right);
        }
        order.reverse();
        order
    }

    /// Height of every subtree, indexed by slot. Vacant slots read `0`.
    fn subtree_heights(&self) -> Vec<i32> {
        let mut heights = vec![0; self.nodes.slot_count()];
        for id in self.post_order() {
            let node = &self.nodes[id];
            let left = node.left.map_or(0, |child| heights[child.index()]);
            let right = node.right.map_or(0, |child| heights[child.index()]);
            heights[id.index()] = 1 + left.max(right);
        }
        heights
    }

    /// Number of nodes on the longest root-to-leaf path; `0` when empty.
    ///
    /// # Complexity
    ///
    /// O(N)
    #[must_use]
    pub fn height(&self) -> usize {
        self.root.map_or(0, |root| {
            let heights = self.subtree_heights();
            usize::try_from(heights[root.index()]).unwrap_or_default()
        })
    }

    /// Returns `true` if every root-to-leaf path has the same length.
    ///
    /// An empty tree trivially has equal paths.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::BinarySearchTree;
    ///
    /// let mut tree = BinarySearchTree::new();
    /// for key in [2, 1, 3] {
    ///     tree.insert_raw(key, ());
    /// }
    /// assert!(tree.equal_paths());
    ///
    /// tree.insert_raw(4, ());
    /// assert!(!tree.equal_paths());
    /// ```
    #[must_use]
    pub fn equal_paths(&self) -> bool {
        let Some(root) = self.root else {
            return true;
        };
        // (shallowest leaf, deepest leaf) below each node
        let mut depths = vec![(0_usize, 0_usize); self.nodes.slot_count()];
        for id in self.post_order() {
            let node = &self.nodes[id];
            let child_depths = |child: Option<NodeId>| child.map(|child| depths[child.index()]);
            depths[id.index()] = match (child_depths(node.left), child_depths(node.right)) {
                (None, None) => (0, 0),
                (Some((shallow, deep)), None) | (None, Some((shallow, deep))) => {
                    (shallow + 1, deep + 1)
                }
                (Some(left), Some(right)) => (left.0.min(right.0) + 1, left.1.max(right.1) + 1),
            };
        }
        let (shallow, deep) = depths[root.index()];
        shallow == deep
    }

    /// Checks parent links, search order and the recorded length.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn validate(&self) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        self.check_structure().inspect_err(|violation| {
            warn_log!(%violation, "search tree invariant violated");
        })
    }

    fn check_structure(&self) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        if let Some(root) = self.root {
            let found = self.nodes[root].parent;
            if found.is_some() {
                return Err(InvariantViolation::ParentLink {
                    node: root,
                    expected: None,
                    found,
                });
            }
        }

        let reachable = self.post_order();
        for &id in &reachable {
            let node = &self.nodes[id];
            for child in [node.left, node.right].into_iter().flatten() {
                let found = self.nodes[child].parent;
                if found != Some(id) {
                    return Err(InvariantViolation::ParentLink {
                        node: child,
                        expected: Some(id),
                        found,
                    });
                }
            }
        }
        if reachable.len() != self.len() {
            return Err(InvariantViolation::Length {
                recorded: self.len(),
                reachable: reachable.len(),
            });
        }

        let mut previous: Option<&K> = None;
        let mut cursor = self.first();
        while let Some(id) = cursor {
            let key = &self.nodes[id].key;
            if previous.is_some_and(|previous| previous >= key) {
                return Err(InvariantViolation::Order { node: id });
            }
            previous = Some(key);
            cursor = self.successor(id);
        }
        Ok(())
    }
}

impl<K, V> AvlTree<K, V> {
    /// Number of nodes on the longest root-to-leaf path; `0` when empty.
    ///
    /// # Complexity
    ///
    /// O(N)
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns `true` if every root-to-leaf path has the same length.
    #[must_use]
    pub fn equal_paths(&self) -> bool {
        self.tree.equal_paths()
    }

    /// Checks every structural invariant of the AVL tree: parent links,
    /// search order, length, and that each stored balance factor equals the
    /// measured height difference and lies within `-1..=1`.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let tree: AvlTree<i32, ()> = (0..100).map(|key| (key, ())).collect();
    /// assert!(tree.validate().is_ok());
    /// ```
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn validate(&self) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        self.tree.check_structure()?;
        self.check_balance().inspect_err(|violation| {
            warn_log!(%violation, "balance invariant violated");
        })
    }

    fn check_balance(&self) -> Result<(), InvariantViolation> {
        let heights = self.tree.subtree_heights();
        let height_of = |child: Option<NodeId>| child.map_or(0, |child| heights[child.index()]);
        for id in self.tree.post_order() {
            let node = &self.tree.nodes[id];
            let measured = height_of(node.right) - height_of(node.left);
            if !(-1..=1).contains(&measured) {
                return Err(InvariantViolation::Unbalanced { node: id, measured });
            }
            if measured != i32::from(node.balance) {
                return Err(InvariantViolation::BalanceMismatch {
                    node: id,
                    measured,
                    stored: node.balance,
                });
            }
        }
        Ok(())
    }
}
