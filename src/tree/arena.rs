//! Slot storage for tree nodes.

use std::ops::{Index, IndexMut};

use super::node::{Node, NodeId};

/// Owns every node of a tree.
///
/// Removed nodes leave a vacant slot that is recycled by the next
/// allocation, so ids of live nodes never move.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    vacant: Vec<NodeId>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.vacant.pop() {
            self.slots[id.index()] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId::from_index(self.slots.len() - 1)
        }
    }

    /// Takes the node out of its slot. The node must already be unlinked.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<K, V> {
        match self.slots.get_mut(id.index()).and_then(Option::take) {
            Some(node) => {
                self.vacant.push(id);
                node
            }
            None => panic!("released vacant node slot {id:?}"),
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of slots, live or vacant. Every live id indexes below this.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
    }

    /// Drains every live node in slot order.
    pub(crate) fn into_nodes(self) -> impl Iterator<Item = (NodeId, Node<K, V>)> {
        self.slots
            .into_iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|node| (NodeId::from_index(index), node)))
    }
}

impl<K, V> Index<NodeId> for NodeArena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match self.get(id) {
            Some(node) => node,
            None => panic!("dangling node id {id:?}"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for NodeArena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("dangling node id {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_allocate_assigns_sequential_ids() {
        let mut arena = NodeArena::new();
        let first = arena.allocate(Node::new(1, "one", None));
        let second = arena.allocate(Node::new(2, "two", Some(first)));
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(arena[second].parent(), Some(first));
    }

    #[rstest]
    fn test_release_recycles_slot() {
        let mut arena = NodeArena::new();
        let first = arena.allocate(Node::new(1, "one", None));
        let second = arena.allocate(Node::new(2, "two", None));
        let released = arena.release(first);
        assert_eq!(released.key, 1);
        assert!(arena.get(first).is_none());

        let third = arena.allocate(Node::new(3, "three", None));
        assert_eq!(third, first);
        assert_eq!(arena[second].key, 2);
        assert_eq!(arena[third].key, 3);
    }

    #[rstest]
    #[should_panic(expected = "dangling node id")]
    fn test_index_vacant_slot_panics() {
        let mut arena = NodeArena::new();
        let id = arena.allocate(Node::new(1, (), None));
        arena.release(id);
        let _ = &arena[id];
    }

    #[rstest]
    fn test_into_nodes_skips_vacant_slots() {
        let mut arena = NodeArena::new();
        let first = arena.allocate(Node::new(1, (), None));
        arena.allocate(Node::new(2, (), None));
        arena.release(first);
        let keys: Vec<i32> = arena.into_nodes().map(|(_, node)| node.key).collect();
        assert_eq!(keys, vec![2]);
    }
}
