//! Text rendering of tree shape.

use std::fmt::Display;

use super::avl::AvlTree;
use super::bst::BinarySearchTree;
use super::node::{Node, NodeId};

impl<K, V> BinarySearchTree<K, V> {
    /// Draws the tree top-down with box-drawing branches, one node per line,
    /// labelling each node with `label`.
    ///
    /// Children are listed left before right. When only one child exists
    /// the missing side is drawn as `∅` so left and right stay
    /// distinguishable.
    pub fn render_with<F>(&self, mut label: F) -> String
    where
        F: FnMut(&Node<K, V>) -> String,
    {
        let mut out = String::new();
        let Some(root) = self.root else {
            out.push('∅');
            return out;
        };
        out.push_str(&label(&self.nodes[root]));

        // (node, indentation of its line, last sibling)
        let mut stack: Vec<(Option<NodeId>, String, bool)> = Vec::new();
        push_children(&mut stack, &self.nodes[root], "");
        while let Some((id, tab, is_last)) = stack.pop() {
            out.push('\n');
            out.push_str(&tab);
            out.push_str(if is_last { "└─ " } else { "├─ " });
            match id {
                Some(id) => {
                    let node = &self.nodes[id];
                    out.push_str(&label(node));
                    let child_tab = format!("{tab}{}", if is_last { "   " } else { "│  " });
                    push_children(&mut stack, node, &child_tab);
                }
                None => out.push('∅'),
            }
        }
        out
    }

    /// Draws the tree labelling nodes with their keys.
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
    /// assert_eq!(tree.render(), "2\n├─ 1\n└─ 3");
    /// ```
    #[must_use]
    pub fn render(&self) -> String
    where
        K: Display,
    {
        self.render_with(|node| node.key.to_string())
    }
}

/// Queues a node's children so that the left one is popped first.
fn push_children<K, V>(
    stack: &mut Vec<(Option<NodeId>, String, bool)>,
    node: &Node<K, V>,
    tab: &str,
) {
    match (node.left, node.right) {
        (None, None) => {}
        (left, right) => {
            stack.push((right, tab.to_owned(), true));
            stack.push((left, tab.to_owned(), false));
        }
    }
}

impl<K: Display, V> AvlTree<K, V> {
    /// Draws the tree with each node's balance factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avlbst::AvlTree;
    ///
    /// let tree: AvlTree<i32, ()> = [(2, ()), (1, ()), (3, ()), (4, ())].into_iter().collect();
    /// assert_eq!(
    ///     tree.render(),
    ///     "2 (1)\n├─ 1 (0)\n└─ 3 (1)\n   ├─ ∅\n   └─ 4 (0)"
    /// );
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        self.tree
            .render_with(|node| format!("{} ({})", node.key, node.balance))
    }
}
