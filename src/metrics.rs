//! Read-only queries over a [`Tree`]: shape measurements, neighbours in key
//! order, and a silent lookup. None of these record steps.
//!
//! Every walk is iterative, so a degenerate tree of any size is safe.

use std::cmp::Ordering;

use crate::tree::{Node, NodeId, Tree};

impl<K> Tree<K> {
    /// Number of edges between `id` and the root. `0` for the root and for
    /// unknown ids.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id);
        while let Some(parent) = current.and_then(Node::parent) {
            depth += 1;
            current = self.node(parent);
        }
        depth
    }

    /// Number of levels in the whole tree. `0` when empty.
    pub fn height(&self) -> usize {
        self.root().map_or(0, |root| self.height_of(root))
    }

    /// Number of levels in the subtree rooted at `id`. A leaf has height 1.
    pub fn height_of(&self, id: NodeId) -> usize {
        let mut height = 0;
        let mut level: Vec<&Node<K>> = self.node(id).into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|node| [node.left(), node.right()])
                .flatten()
                .filter_map(|child| self.node(child))
                .collect();
        }
        height
    }

    /// Number of nodes in the subtree rooted at `id`.
    pub fn subtree_size(&self, id: NodeId) -> usize {
        let mut size = 0;
        let mut stack: Vec<&Node<K>> = self.node(id).into_iter().collect();
        while let Some(node) = stack.pop() {
            size += 1;
            stack.extend(
                [node.left(), node.right()]
                    .into_iter()
                    .flatten()
                    .filter_map(|child| self.node(child)),
            );
        }
        size
    }

    /// The leftmost node of the subtree rooted at `id`.
    pub fn min_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.node(id)?;
        while let Some(left) = current.left().and_then(|left| self.node(left)) {
            current = left;
        }
        Some(current.id())
    }

    /// The rightmost node of the subtree rooted at `id`.
    pub fn max_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.node(id)?;
        while let Some(right) = current.right().and_then(|right| self.node(right)) {
            current = right;
        }
        Some(current.id())
    }

    /// The node that follows `id` in key order.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        if let Some(right) = node.right() {
            return self.min_of(right);
        }
        self.first_ancestor_from(node, Node::left)
    }

    /// The node that precedes `id` in key order.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        if let Some(left) = node.left() {
            return self.max_of(left);
        }
        self.first_ancestor_from(node, Node::right)
    }

    /// Climbs from `node` until arriving at an ancestor through its `slot`
    /// child.
    fn first_ancestor_from(
        &self,
        node: &Node<K>,
        slot: fn(&Node<K>) -> Option<NodeId>,
    ) -> Option<NodeId> {
        let mut current = node;
        while let Some(parent) = current.parent().and_then(|parent| self.node(parent)) {
            if slot(parent) == Some(current.id()) {
                return Some(parent.id());
            }
            current = parent;
        }
        None
    }

    /// Every key in ascending order, one entry per node.
    pub fn keys_in_order(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut current = self.root();
        loop {
            while let Some(node) = current.and_then(|id| self.node(id)) {
                stack.push(node);
                current = node.left();
            }
            let Some(node) = stack.pop() else {
                break;
            };
            keys.push(node.key());
            current = node.right();
        }
        keys
    }

    /// The id of a node holding `key`, found with the configured comparator.
    pub fn find(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root_node();
        while let Some(node) = current {
            let next = match self.config().compare(key, node.key()) {
                Ordering::Equal => return Some(node.id()),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
            current = next.and_then(|id| self.node(id));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::{Node, NodeId, Side, Tree};
    use crate::Engine;

    fn build(keys: &[i32]) -> Tree<i32> {
        let mut engine = Engine::new();
        keys.iter()
            .fold(Tree::new(), |tree, &k| engine.insert(&tree, k).next)
    }

    fn key(tree: &Tree<i32>, id: Option<NodeId>) -> Option<i32> {
        id.and_then(|id| tree.node(id)).map(|node| *node.key())
    }

    #[test]
    fn test_shape() {
        let tree = build(&[8, 3, 10, 1, 6, 14, 4]);
        let three = tree.find(&3).unwrap();
        let four = tree.find(&4).unwrap();

        assert_eq!(tree.height(), 4);
        assert_eq!(tree.height_of(three), 3);
        assert_eq!(tree.subtree_size(three), 4);
        assert_eq!(tree.depth(four), 3);
        assert_eq!(tree.depth(tree.root().unwrap()), 0);
    }

    #[test]
    fn test_deep_left_chain() {
        let depth = 100_000;
        let mut tree = Tree::new();
        for raw in 1..=depth {
            tree.put(Node::new(NodeId::new(raw), -(raw as i64), None));
        }
        tree.set_root(Some(NodeId::new(1)));
        for raw in 1..depth {
            tree.link(NodeId::new(raw), Side::Left, Some(NodeId::new(raw + 1)));
        }

        assert_eq!(tree.height(), depth as usize);
        assert_eq!(tree.subtree_size(NodeId::new(2)), depth as usize - 1);
        assert_eq!(tree.depth(NodeId::new(depth)), depth as usize - 1);
    }

    #[test]
    fn test_empty_and_unknown() {
        let tree = Tree::<i32>::new();
        let ghost = NodeId::new(99);

        assert_eq!(tree.height(), 0);
        assert_eq!(tree.subtree_size(ghost), 0);
        assert_eq!(tree.depth(ghost), 0);
        assert_eq!(tree.successor(ghost), None);
        assert!(tree.keys_in_order().is_empty());
    }

    #[test]
    fn test_neighbours() {
        let tree = build(&[8, 3, 10, 1, 6, 14, 4]);
        let at = |k| tree.find(&k).unwrap();

        // Through the right subtree.
        assert_eq!(key(&tree, tree.successor(at(3))), Some(4));
        // Up through the ancestors.
        assert_eq!(key(&tree, tree.successor(at(6))), Some(8));
        assert_eq!(key(&tree, tree.successor(at(14))), None);

        assert_eq!(key(&tree, tree.predecessor(at(8))), Some(6));
        assert_eq!(key(&tree, tree.predecessor(at(4))), Some(3));
        assert_eq!(key(&tree, tree.predecessor(at(1))), None);
    }

    #[test]
    fn test_min_max() {
        let tree = build(&[8, 3, 10, 1, 6, 14]);
        let root = tree.root().unwrap();

        assert_eq!(key(&tree, tree.min_of(root)), Some(1));
        assert_eq!(key(&tree, tree.max_of(root)), Some(14));
    }

    #[test]
    fn test_keys_in_order() {
        let tree = build(&[5, 2, 7, 1, 9, 3]);
        let keys: Vec<_> = tree.keys_in_order().into_iter().copied().collect();

        assert_eq!(keys, vec![1, 2, 3, 5, 7, 9]);
        assert_eq!(tree.find(&4), None);
    }
}
