//! Unbalanced binary search tree with parent links.
//!
//! [`BinarySearchTree`] owns the node arena and implements everything that
//! does not depend on a balancing strategy: search, leaf insertion, splicing
//! out a node with at most one child, in-order neighbours and swapping the
//! positions of two nodes. [`AvlTree`](super::AvlTree) drives these
//! primitives and adds rebalancing on top.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::mem;

use super::arena::NodeArena;
use super::iter::{Iter, Keys, Values};
use super::node::{Node, NodeId, Side};
use crate::tracing_helpers::debug_log;

/// Result of [`BinarySearchTree::insert_raw`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InsertOutcome<V> {
    /// The key was new; a leaf was linked at this id.
    Inserted(NodeId),
    /// The key was present; its value was replaced and this is the old one.
    /// No link changed.
    Replaced(V),
}

/// Result of a structural removal.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Removal<K, V> {
    /// Key of the destroyed node.
    pub key: K,
    /// Value of the destroyed node.
    pub value: V,
    /// Parent of the vacated slot and the side of that parent which lost a
    /// level. `None` when the removed node was the root.
    pub parent: Option<(NodeId, Side)>,
}

/// An unbalanced binary search tree.
///
/// Keys are unique. Nothing here keeps the tree shallow: inserting sorted
/// keys produces a chain. Use [`AvlTree`](super::AvlTree) for a balanced
/// map.
///
/// # Examples
///
/// ```rust
/// use avlbst::{BinarySearchTree, InsertOutcome};
///
/// let mut tree = BinarySearchTree::new();
/// assert!(matches!(tree.insert_raw(2, "two"), InsertOutcome::Inserted(_)));
/// assert_eq!(tree.insert_raw(2, "TWO"), InsertOutcome::Replaced("two"));
///
/// let two = tree.find(&2).unwrap();
/// tree.insert_raw(1, "one");
/// assert_eq!(tree.node(tree.predecessor(two).unwrap()).unwrap().key(), &1);
/// ```
#[derive(Clone)]
pub struct BinarySearchTree<K, V> {
    pub(crate) nodes: NodeArena<K, V>,
    pub(crate) root: Option<NodeId>,
    length: usize,
}

impl<K, V> BinarySearchTree<K, V> {
    /// Creates an empty tree.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            root: None,
            length: 0,
        }
    }

    /// Returns the number of nodes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree holds no nodes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Destroys every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.length = 0;
    }

    /// The root node's id.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Looks up a live node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.nodes.get(id)
    }

    /// Which side of its parent `id` hangs on; `None` for the root.
    #[must_use]
    pub fn side_of(&self, id: NodeId) -> Option<Side> {
        self.nodes[id].parent.map(|parent| {
            if self.nodes[parent].left == Some(id) {
                Side::Left
            } else {
                Side::Right
            }
        })
    }

    /// Leftmost node of the subtree rooted at `id`.
    pub(crate) fn subtree_first(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    /// Rightmost node of the subtree rooted at `id`.
    pub(crate) fn subtree_last(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    /// The node with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.subtree_first(root))
    }

    /// The node with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<NodeId> {
        self.root.map(|root| self.subtree_last(root))
    }

    /// In-order predecessor: the node with the largest key smaller than the
    /// key of `id`.
    ///
    /// This is the rightmost node of the left subtree when there is one,
    /// otherwise the nearest ancestor whose right subtree contains `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live node of this tree.
    #[must_use]
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes[id].left {
            return Some(self.subtree_last(left));
        }
        let mut child = id;
        let mut parent = self.nodes[id].parent;
        while let Some(ancestor) = parent {
            if self.nodes[ancestor].right == Some(child) {
                return Some(ancestor);
            }
            child = ancestor;
            parent = self.nodes[ancestor].parent;
        }
        None
    }

    /// In-order successor, the mirror of [`predecessor`](Self::predecessor).
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live node of this tree.
    #[must_use]
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.subtree_first(right));
        }
        let mut child = id;
        let mut parent = self.nodes[id].parent;
        while let Some(ancestor) = parent {
            if self.nodes[ancestor].left == Some(child) {
                return Some(ancestor);
            }
            child = ancestor;
            parent = self.nodes[ancestor].parent;
        }
        None
    }

    /// Makes `new_child` take the place of the subtree hanging at `side` of
    /// `parent`, or the root when `parent` is `None`. Only the downward link is
    /// written; the caller fixes `new_child`'s parent link.
    pub(crate) fn replace_child(
        &mut self,
        parent: Option<NodeId>,
        side: Option<Side>,
        new_child: Option<NodeId>,
    ) {
        match (parent, side) {
            (Some(parent), Some(side)) => self.nodes[parent].set_child(side, new_child),
            _ => self.root = new_child,
        }
    }

    /// Exchanges the structural positions of two nodes.
    ///
    /// Parent links, child links and the root reference are rewritten so that
    /// `a` ends up where `b` was and vice versa. Keys, values and balance
    /// factors stay on their node, so every outstanding [`NodeId`] keeps
    /// naming the same entry. Adjacent nodes (one the child of the other) and
    /// siblings are handled.
    ///
    /// Swapping nodes whose keys are not in-order neighbours breaks the search
    /// order; removal only ever swaps a node with its predecessor.
    ///
    /// # Panics
    ///
    /// Panics if either id does not name a live node of this tree.
    pub fn node_swap(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let remap = |link: Option<NodeId>| match link {
            Some(id) if id == a => Some(b),
            Some(id) if id == b => Some(a),
            other => other,
        };

        let (a_parent, a_left, a_right) = {
            let node = &self.nodes[a];
            (node.parent, node.left, node.right)
        };
        let (b_parent, b_left, b_right) = {
            let node = &self.nodes[b];
            (node.parent, node.left, node.right)
        };

        let mut neighbours: Vec<NodeId> = [a_parent, a_left, a_right, b_parent, b_left, b_right]
            .into_iter()
            .flatten()
            .filter(|&id| id != a && id != b)
            .collect();
        neighbours.sort_unstable();
        neighbours.dedup();

        {
            let node = &mut self.nodes[a];
            node.parent = remap(b_parent);
            node.left = remap(b_left);
            node.right = remap(b_right);
        }
        {
            let node = &mut self.nodes[b];
            node.parent = remap(a_parent);
            node.left = remap(a_left);
            node.right = remap(a_right);
        }
        for id in neighbours {
            let node = &mut self.nodes[id];
            node.parent = remap(node.parent);
            node.left = remap(node.left);
            node.right = remap(node.right);
        }
        self.root = remap(self.root);
    }

    /// Splices out a node that has at most one child and destroys it.
    ///
    /// The sole child, if any, takes the node's place on the same side of the
    /// node's parent.
    pub(crate) fn unlink(&mut self, id: NodeId) -> Removal<K, V> {
        let node = &self.nodes[id];
        debug_assert!(
            node.left.is_none() || node.right.is_none(),
            "unlink of {id:?} with two children"
        );
        let child = node.left.or(node.right);
        let parent = node.parent;
        let side = self.side_of(id);

        if let Some(child) = child {
            self.nodes[child].parent = parent;
        }
        self.replace_child(parent, side, child);

        let removed = self.nodes.release(id);
        self.length -= 1;
        debug_log!(node = ?id, parent = ?parent, "node unlinked");
        Removal {
            key: removed.key,
            value: removed.value,
            parent: parent.zip(side),
        }
    }

    /// Returns an iterator over entries in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Returns an iterator over keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Returns an iterator over values in key order.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }
}

impl<K: Ord, V> BinarySearchTree<K, V> {
    /// Finds the node holding `key`.
    ///
    /// # Complexity
    ///
    /// O(height)
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => return Some(id),
            }
        }
        None
    }

    /// Returns a reference to the value stored under `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| &self.nodes[id].value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| &mut self.nodes[id].value)
    }

    /// Inserts without rebalancing.
    ///
    /// An existing key has its value overwritten and no link changes.
    /// Otherwise a new leaf is linked at the position the search ended.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::{BinarySearchTree, InsertOutcome};
    ///
    /// let mut tree = BinarySearchTree::new();
    /// for key in 1..=3 {
    ///     tree.insert_raw(key, ());
    /// }
    /// // Sorted input degenerates into a right-leaning chain
    /// let root = tree.root().unwrap();
    /// assert_eq!(tree.node(root).unwrap().key(), &1);
    /// assert_eq!(tree.height(), 3);
    /// ```
    pub fn insert_raw(&mut self, key: K, value: V) -> InsertOutcome<V> {
        let Some(mut current) = self.root else {
            let id = self.nodes.allocate(Node::new(key, value, None));
            self.root = Some(id);
            self.length = 1;
            return InsertOutcome::Inserted(id);
        };

        loop {
            let side = match key.cmp(&self.nodes[current].key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    let previous = mem::replace(&mut self.nodes[current].value, value);
                    return InsertOutcome::Replaced(previous);
                }
            };
            match self.nodes[current].child(side) {
                Some(next) => current = next,
                None => {
                    let id = self.nodes.allocate(Node::new(key, value, Some(current)));
                    self.nodes[current].set_child(side, Some(id));
                    self.length += 1;
                    debug_log!(node = ?id, parent = ?current, side = ?side, "leaf linked");
                    return InsertOutcome::Inserted(id);
                }
            }
        }
    }

    /// Removes without rebalancing.
    ///
    /// A node with two children first trades places with its in-order
    /// predecessor, which leaves it in a position with at most one child.
    /// It is then spliced out and destroyed. Returns `None` if the key is
    /// absent.
    pub fn remove_raw<Q>(&mut self, key: &Q) -> Option<Removal<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_with(key, Self::node_swap)
    }

    /// [`remove_raw`](Self::remove_raw) with the position exchange supplied
    /// by the caller. `swap` receives the doomed node and its predecessor and
    /// must leave them in each other's positions.
    pub(crate) fn remove_with<Q, S>(&mut self, key: &Q, swap: S) -> Option<Removal<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        S: FnOnce(&mut Self, NodeId, NodeId),
    {
        let id = self.find(key)?;
        let node = &self.nodes[id];
        if node.left.is_some()
            && node.right.is_some()
            && let Some(predecessor) = self.predecessor(id)
        {
            debug_log!(node = ?id, predecessor = ?predecessor, "swap with predecessor");
            swap(self, id, predecessor);
        }
        Some(self.unlink(id))
    }

    /// Returns `true` if the tree contains `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }
}

impl<K, V> Default for BinarySearchTree<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BinarySearchTree<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tree_of(keys: &[i32]) -> BinarySearchTree<i32, i32> {
        let mut tree = BinarySearchTree::new();
        for &key in keys {
            tree.insert_raw(key, key * 10);
        }
        tree
    }

    fn key_of(tree: &BinarySearchTree<i32, i32>, id: Option<NodeId>) -> Option<i32> {
        id.map(|id| tree.nodes[id].key)
    }

    #[rstest]
    fn test_find_present_and_absent() {
        let tree = tree_of(&[5, 3, 8, 1, 4]);
        assert_eq!(key_of(&tree, tree.find(&4)), Some(4));
        assert_eq!(tree.find(&6), None);
        assert_eq!(tree.get(&8), Some(&80));
    }

    #[rstest]
    fn test_insert_raw_replaces_without_relinking() {
        let mut tree = tree_of(&[5, 3, 8]);
        let before = tree.find(&3);
        assert_eq!(tree.insert_raw(3, 99), InsertOutcome::Replaced(30));
        assert_eq!(tree.find(&3), before);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(&3), Some(&99));
    }

    #[rstest]
    #[case(&[5, 3, 8, 1, 4, 7, 9], 5, Some(4))]
    #[case(&[5, 3, 8, 1, 4, 7, 9], 7, Some(5))]
    #[case(&[5, 3, 8, 1, 4, 7, 9], 1, None)]
    #[case(&[5, 3, 8, 1, 4, 7, 9], 9, Some(8))]
    fn test_predecessor(#[case] keys: &[i32], #[case] key: i32, #[case] expected: Option<i32>) {
        let tree = tree_of(keys);
        let id = tree.find(&key).unwrap();
        assert_eq!(key_of(&tree, tree.predecessor(id)), expected);
    }

    #[rstest]
    #[case(&[5, 3, 8, 1, 4, 7, 9], 4, Some(5))]
    #[case(&[5, 3, 8, 1, 4, 7, 9], 5, Some(7))]
    #[case(&[5, 3, 8, 1, 4, 7, 9], 9, None)]
    fn test_successor(#[case] keys: &[i32], #[case] key: i32, #[case] expected: Option<i32>) {
        let tree = tree_of(keys);
        let id = tree.find(&key).unwrap();
        assert_eq!(key_of(&tree, tree.successor(id)), expected);
    }

    #[rstest]
    fn test_node_swap_parent_and_left_child() {
        // 5 -> left 3
        let mut tree = tree_of(&[5, 3, 8]);
        let five = tree.find(&5).unwrap();
        let three = tree.find(&3).unwrap();
        tree.node_swap(five, three);

        assert_eq!(tree.root(), Some(three));
        assert_eq!(tree.nodes[three].left, Some(five));
        assert_eq!(key_of(&tree, tree.nodes[three].right), Some(8));
        assert_eq!(tree.nodes[five].parent, Some(three));
        let eight = tree.find_unchecked(8);
        assert_eq!(tree.nodes[eight].parent, Some(three));
        // Payload stays with the node
        assert_eq!(tree.nodes[five].value, 50);
    }

    #[rstest]
    fn test_node_swap_siblings() {
        let mut tree = tree_of(&[5, 3, 8]);
        let three = tree.find(&3).unwrap();
        let eight = tree.find(&8).unwrap();
        let five = tree.root().unwrap();
        tree.node_swap(three, eight);

        assert_eq!(tree.nodes[five].left, Some(eight));
        assert_eq!(tree.nodes[five].right, Some(three));
        assert_eq!(tree.nodes[three].parent, Some(five));
        assert_eq!(tree.nodes[eight].parent, Some(five));
    }

    #[rstest]
    fn test_node_swap_distant_nodes() {
        let mut tree = tree_of(&[50, 30, 70, 20, 40, 35]);
        let fifty = tree.find(&50).unwrap();
        let forty = tree.find(&40).unwrap();
        tree.node_swap(fifty, forty);

        let thirty = tree.find_unchecked(30);
        let thirty_five = tree.find_unchecked(35);
        let seventy = tree.find_unchecked(70);
        assert_eq!(tree.root(), Some(forty));
        assert_eq!(tree.nodes[forty].left, Some(thirty));
        assert_eq!(tree.nodes[forty].right, Some(seventy));
        assert_eq!(tree.nodes[thirty].right, Some(fifty));
        assert_eq!(tree.nodes[fifty].parent, Some(thirty));
        assert_eq!(tree.nodes[fifty].left, Some(thirty_five));
        assert_eq!(tree.nodes[thirty_five].parent, Some(fifty));
    }

    #[rstest]
    fn test_remove_raw_two_children_uses_predecessor() {
        let mut tree = tree_of(&[50, 30, 70, 20, 40, 35]);
        let forty = tree.find(&40).unwrap();
        let removal = tree.remove_raw(&50).unwrap();

        assert_eq!((removal.key, removal.value), (50, 500));
        assert_eq!(tree.root(), Some(forty));
        // 40's old slot was the right child of 30; its left child 35 moves up
        let thirty = tree.find_unchecked(30);
        assert_eq!(removal.parent, Some((thirty, Side::Right)));
        assert_eq!(key_of(&tree, tree.nodes[thirty].right), Some(35));
        let keys: Vec<i32> = tree.keys().copied().collect();
        assert_eq!(keys, vec![20, 30, 35, 40, 70]);
    }

    #[rstest]
    fn test_remove_with_swaps_only_for_two_children() {
        let mut tree = tree_of(&[50, 30, 70, 20, 40]);
        let fifty = tree.find_unchecked(50);
        let forty = tree.find_unchecked(40);
        let mut swaps = Vec::new();

        tree.remove_with(&20, |tree, a, b| {
            swaps.push((a, b));
            tree.node_swap(a, b);
        });
        assert!(swaps.is_empty());

        let removal = tree.remove_with(&50, |tree, a, b| {
            swaps.push((a, b));
            tree.node_swap(a, b);
        });
        assert_eq!(swaps, vec![(fifty, forty)]);
        assert_eq!(removal.map(|removal| removal.key), Some(50));
        assert_eq!(tree.root(), Some(forty));
        assert_eq!(tree.validate(), Ok(()));
    }

    #[rstest]
    fn test_remove_raw_root_leaf() {
        let mut tree = tree_of(&[1]);
        let removal = tree.remove_raw(&1).unwrap();
        assert_eq!(removal.parent, None);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[rstest]
    fn test_remove_raw_absent_is_none() {
        let mut tree = tree_of(&[1, 2]);
        assert!(tree.remove_raw(&3).is_none());
        assert_eq!(tree.len(), 2);
    }

    #[rstest]
    fn test_debug_is_sorted_map() {
        let tree = tree_of(&[2, 1, 3]);
        assert_eq!(format!("{tree:?}"), "{1: 10, 2: 20, 3: 30}");
    }

    impl BinarySearchTree<i32, i32> {
        fn find_unchecked(&self, key: i32) -> NodeId {
            self.find(&key).unwrap()
        }
    }
}
