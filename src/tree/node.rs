//! Tree node and link types.

use std::fmt;

/// Index of a node inside its tree's arena.
///
/// A `NodeId` is only meaningful for the tree that handed it out, and only
/// until the node it names is removed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`; two live nodes would
    /// otherwise share an id.
    pub(crate) fn from_index(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(raw) => Self(raw),
            Err(_) => panic!("node arena exceeded {} slots", u32::MAX),
        }
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Side {
    /// The left child slot (smaller keys).
    Left,
    /// The right child slot (larger keys).
    Right,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Balance change of a parent whose subtree on this side grew by one level.
    ///
    /// Balance is `height(right) - height(left)`, so growth on the left is
    /// `-1` and growth on the right is `+1`. Shrinking is the negation.
    pub(crate) const fn growth(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// A tree node.
///
/// The key is fixed once the node is linked into a tree; the value can be
/// replaced. `balance` is only maintained by [`AvlTree`](super::AvlTree) and
/// stays `0` in a plain [`BinarySearchTree`](super::BinarySearchTree).
#[derive(Clone, Debug)]
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) balance: i8,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    /// Creates an unlinked leaf hanging under `parent`.
    pub(crate) const fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            balance: 0,
            parent,
            left: None,
            right: None,
        }
    }

    /// The node's key.
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// The node's value.
    #[must_use]
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// `height(right) - height(left)` as last recorded by the AVL repair walk.
    #[must_use]
    pub const fn balance(&self) -> i8 {
        self.balance
    }

    /// The parent link, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The left child link.
    #[must_use]
    pub const fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// The right child link.
    #[must_use]
    pub const fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// The child link on `side`.
    #[must_use]
    pub const fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) const fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Side::Left, Side::Right, -1)]
    #[case(Side::Right, Side::Left, 1)]
    fn test_side_opposite_and_growth(
        #[case] side: Side,
        #[case] opposite: Side,
        #[case] growth: i8,
    ) {
        assert_eq!(side.opposite(), opposite);
        assert_eq!(side.growth(), growth);
    }

    #[rstest]
    fn test_new_node_is_balanced_leaf() {
        let node = Node::new(7, "seven", Some(NodeId::from_index(3)));
        assert!(node.is_leaf());
        assert_eq!(node.balance(), 0);
        assert_eq!(node.parent(), Some(NodeId::from_index(3)));
        assert_eq!(node.key(), &7);
        assert_eq!(node.value(), &"seven");
    }

    #[rstest]
    fn test_set_child_by_side() {
        let mut node = Node::new(1, (), None);
        node.set_child(Side::Right, Some(NodeId::from_index(9)));
        assert_eq!(node.child(Side::Right), Some(NodeId::from_index(9)));
        assert_eq!(node.child(Side::Left), None);
        assert!(!node.is_leaf());
    }

    #[rstest]
    fn test_node_id_debug() {
        assert_eq!(format!("{:?}", NodeId::from_index(12)), "#12");
    }

    #[rstest]
    fn test_node_id_round_trips_largest_index() {
        let largest = u32::MAX as usize;
        assert_eq!(NodeId::from_index(largest).index(), largest);
    }

    #[cfg(target_pointer_width = "64")]
    #[rstest]
    #[should_panic(expected = "node arena exceeded")]
    fn test_node_id_rejects_index_beyond_u32() {
        let _ = NodeId::from_index(u32::MAX as usize + 1);
    }
}
