//! Height-balanced ordered map.
//!
//! This module provides [`AvlTree`], an ordered map that keeps every node's
//! balance factor (`height(right) - height(left)`) within `-1..=1`.
//!
//! # Overview
//!
//! - O(log N) get
//! - O(log N) insert
//! - O(log N) remove
//! - O(log N) first/last
//! - O(1) len and `is_empty`
//!
//! # Rebalancing
//!
//! Structural changes are delegated to [`BinarySearchTree`]. Afterwards a
//! repair walk climbs parent links from the changed slot, adjusting balance
//! factors by one per level:
//!
//! - after an insertion the walk stops as soon as a subtree's height is
//!   unchanged, and a single (or double) rotation always ends it;
//! - after a removal a rotation may leave the subtree one level shorter, so
//!   the walk can continue to the root.
//!
//! Rotations recompute the balance factors of the two nodes they move from
//! the pre-rotation factors, so a double rotation is just two single ones.

use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;

use super::bst::{BinarySearchTree, InsertOutcome};
use super::error::KeyError;
use super::iter::{IntoIter, Iter, Keys, Values};
use super::node::{Node, NodeId, Side};
use crate::tracing_helpers::trace_log;

/// An ordered map backed by an AVL tree.
///
/// Keys must implement `Ord`. Entries are kept in sorted key order and the
/// tree height stays below `1.44 * log2(N + 2)`.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log N)          |
/// | `insert`       | O(log N)          |
/// | `remove`       | O(log N)          |
/// | `contains_key` | O(log N)          |
/// | `first`/`last` | O(log N)          |
/// | `len`          | O(1)              |
/// | `iter`         | O(N) total        |
///
/// # Examples
///
/// ```rust
/// use avlbst::AvlTree;
///
/// let mut tree = AvlTree::new();
/// tree.insert(3, "three");
/// tree.insert(1, "one");
/// tree.insert(2, "two");
///
/// let keys: Vec<&i32> = tree.keys().collect();
/// assert_eq!(keys, vec![&1, &2, &3]);
/// assert_eq!(tree.root_key(), Some(&2));
/// ```
#[derive(Clone)]
pub struct AvlTree<K, V> {
    pub(crate) tree: BinarySearchTree<K, V>,
}

static_assertions::assert_impl_all!(AvlTree<i32, String>: Send, Sync, Clone);

impl<K, V> AvlTree<K, V> {
    /// Creates a new empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let tree: AvlTree<i32, String> = AvlTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tree: BinarySearchTree::new(),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// The underlying search tree, for node-level navigation.
    #[inline]
    #[must_use]
    pub const fn as_search_tree(&self) -> &BinarySearchTree<K, V> {
        &self.tree
    }

    /// Key stored at the root.
    #[must_use]
    pub fn root_key(&self) -> Option<&K> {
        self.tree.root().map(|id| &self.tree.nodes[id].key)
    }

    /// Looks up a live node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.tree.node(id)
    }

    /// In-order predecessor of the node `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live node of this tree.
    #[must_use]
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.tree.predecessor(id)
    }

    /// In-order successor of the node `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live node of this tree.
    #[must_use]
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        self.tree.successor(id)
    }

    /// Returns the entry with the smallest key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let tree: AvlTree<i32, &str> = [(3, "three"), (1, "one")].into_iter().collect();
    /// assert_eq!(tree.first(), Some((&1, &"one")));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|id| {
            let node = &self.tree.nodes[id];
            (&node.key, &node.value)
        })
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|id| {
            let node = &self.tree.nodes[id];
            (&node.key, &node.value)
        })
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// The iterator is double-ended; walking backwards follows predecessor
    /// links.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let tree: AvlTree<i32, char> = [(2, 'b'), (1, 'a'), (3, 'c')].into_iter().collect();
    /// let forward: Vec<char> = tree.values().copied().collect();
    /// let backward: Vec<char> = tree.values().rev().copied().collect();
    /// assert_eq!(forward, vec!['a', 'b', 'c']);
    /// assert_eq!(backward, vec!['c', 'b', 'a']);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Returns an iterator over keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        self.tree.keys()
    }

    /// Returns an iterator over values in key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        self.tree.values()
    }

    /// Rotates the subtree rooted at `id` to the left and returns its new
    /// root (the former right child).
    ///
    /// ```text
    ///     x                y
    ///    / \              / \
    ///   a   y     =>     x   c
    ///      / \          / \
    ///     b   c        a   b
    /// ```
    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.tree.nodes[id].right else {
            unreachable!("left rotation of {id:?} without a right child");
        };
        let parent = self.tree.nodes[id].parent;
        let side = self.tree.side_of(id);
        let inner = self.tree.nodes[pivot].left;

        let nodes = &mut self.tree.nodes;
        nodes[id].right = inner;
        if let Some(inner) = inner {
            nodes[inner].parent = Some(id);
        }
        nodes[pivot].left = Some(id);
        nodes[id].parent = Some(pivot);
        nodes[pivot].parent = parent;

        let old_balance = nodes[id].balance;
        let pivot_balance = nodes[pivot].balance;
        let new_balance = old_balance - 1 - pivot_balance.max(0);
        nodes[id].balance = new_balance;
        nodes[pivot].balance = pivot_balance - 1 + new_balance.min(0);

        self.tree.replace_child(parent, side, Some(pivot));
        trace_log!(node = ?id, pivot = ?pivot, "rotate left");
        pivot
    }

    /// Rotates the subtree rooted at `id` to the right and returns its new
    /// root (the former left child).
    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.tree.nodes[id].left else {
            unreachable!("right rotation of {id:?} without a left child");
        };
        let parent = self.tree.nodes[id].parent;
        let side = self.tree.side_of(id);
        let inner = self.tree.nodes[pivot].right;

        let nodes = &mut self.tree.nodes;
        nodes[id].left = inner;
        if let Some(inner) = inner {
            nodes[inner].parent = Some(id);
        }
        nodes[pivot].right = Some(id);
        nodes[id].parent = Some(pivot);
        nodes[pivot].parent = parent;

        let old_balance = nodes[id].balance;
        let pivot_balance = nodes[pivot].balance;
        let new_balance = old_balance + 1 - pivot_balance.min(0);
        nodes[id].balance = new_balance;
        nodes[pivot].balance = pivot_balance + 1 + new_balance.max(0);

        self.tree.replace_child(parent, side, Some(pivot));
        trace_log!(node = ?id, pivot = ?pivot, "rotate right");
        pivot
    }

    /// Restores balance at a node whose factor reached +/-2.
    ///
    /// Returns the new subtree root and the pre-rotation balance of the heavy
    /// child. A zero heavy balance only happens after a removal and means the
    /// rotated subtree kept its height.
    fn rebalance(&mut self, id: NodeId) -> (NodeId, i8) {
        let balance = self.tree.nodes[id].balance;
        let heavy_side = if balance > 0 { Side::Right } else { Side::Left };
        let Some(heavy) = self.tree.nodes[id].child(heavy_side) else {
            unreachable!("node {id:?} with balance {balance} has no {heavy_side:?} child");
        };
        let heavy_balance = self.tree.nodes[heavy].balance;

        let root = match heavy_side {
            Side::Right => {
                if heavy_balance < 0 {
                    self.rotate_right(heavy);
                }
                self.rotate_left(id)
            }
            Side::Left => {
                if heavy_balance > 0 {
                    self.rotate_left(heavy);
                }
                self.rotate_right(id)
            }
        };
        trace_log!(
            node = ?id,
            heavy = ?heavy,
            double = heavy_balance * balance < 0,
            "rebalanced"
        );
        debug_assert!(
            (-1..=1).contains(&self.tree.nodes[root].balance),
            "rotation left {root:?} out of balance"
        );
        (root, heavy_balance)
    }

    /// Repair walk after linking the leaf `leaf`.
    fn insert_fix(&mut self, leaf: NodeId) {
        let mut child = leaf;
        while let Some(parent) = self.tree.nodes[child].parent {
            let side = if self.tree.nodes[parent].left == Some(child) {
                Side::Left
            } else {
                Side::Right
            };
            let balance = self.tree.nodes[parent].balance + side.growth();
            self.tree.nodes[parent].balance = balance;
            match balance {
                0 => break,
                -1 | 1 => child = parent,
                _ => {
                    self.rebalance(parent);
                    break;
                }
            }
        }
    }

    /// Repair walk after the subtree on `side` of `parent` lost a level.
    fn remove_fix(&mut self, mut parent: NodeId, mut side: Side) {
        loop {
            let balance = self.tree.nodes[parent].balance - side.growth();
            self.tree.nodes[parent].balance = balance;
            let shrunk = match balance {
                -1 | 1 => break,
                0 => parent,
                _ => {
                    let (root, heavy_balance) = self.rebalance(parent);
                    if heavy_balance == 0 {
                        break;
                    }
                    root
                }
            };
            let (Some(up), Some(up_side)) =
                (self.tree.nodes[shrunk].parent, self.tree.side_of(shrunk))
            else {
                break;
            };
            parent = up;
            side = up_side;
        }
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(tree.get("hello"), Some(&42));
    /// assert_eq!(tree.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_mut(key)
    }

    /// Returns the value for `key` or a [`KeyError`].
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the tree has no entry for `key`.
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V, KeyError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(KeyError)
    }

    /// Returns `true` if the tree contains a value for the key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }

    /// The id of the node holding `key`.
    #[must_use]
    pub fn find_node<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key)
    }

    /// Balance factor of the node holding `key`.
    #[must_use]
    pub fn balance_of<Q>(&self, key: &Q) -> Option<i8>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).map(|id| self.tree.nodes[id].balance)
    }

    /// Inserts a key-value pair.
    ///
    /// If the key is already present only its value is replaced and the old
    /// value is returned; the shape of the tree does not change.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.insert(1, "one"), None);
    /// assert_eq!(tree.insert(1, "ONE"), Some("one"));
    /// assert_eq!(tree.get(&1), Some(&"ONE"));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.insert_raw(key, value) {
            InsertOutcome::Replaced(previous) => Some(previous),
            InsertOutcome::Inserted(leaf) => {
                self.insert_fix(leaf);
                None
            }
        }
    }

    /// Removes a key and returns its value, or `None` if it was absent.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let mut tree: AvlTree<i32, i32> = (1..=7).map(|key| (key, key)).collect();
    /// assert_eq!(tree.remove(&4), Some(4));
    /// assert_eq!(tree.remove(&4), None);
    /// assert_eq!(tree.len(), 6);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key and returns the stored key and value.
    ///
    /// A node with two children first trades places with its in-order
    /// predecessor, so the node that is finally spliced out has at most one
    /// child. Other nodes keep their [`NodeId`].
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let removal = self.tree.remove_with(key, swap_keeping_balance)?;
        if let Some((parent, side)) = removal.parent {
            self.remove_fix(parent, side);
        }
        Some((removal.key, removal.value))
    }
}

/// Swaps the positions of two nodes, keeping each slot's balance factor
/// with the slot.
///
/// The balance factor describes the subtree shape at a position, not the
/// entry, so it is exchanged back after the base swap moves it.
fn swap_keeping_balance<K, V>(tree: &mut BinarySearchTree<K, V>, a: NodeId, b: NodeId) {
    tree.node_swap(a, b);
    let nodes = &mut tree.nodes;
    let balance_a = nodes[a].balance;
    nodes[a].balance = nodes[b].balance;
    nodes[b].balance = balance_a;
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for AvlTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for AvlTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.tree)
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlTree<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for AvlTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for AvlTree<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct AvlTreeVisitor<K, V> {
    marker: std::marker::PhantomData<fn() -> AvlTree<K, V>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for AvlTreeVisitor<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    type Value = AvlTree<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut tree = AvlTree::new();
        while let Some((key, value)) = access.next_entry()? {
            tree.insert(key, value);
        }
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for AvlTree<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(AvlTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
