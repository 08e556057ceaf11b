//! Structural checks attached to every recorded step. A failed check is
//! reported, never acted on.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::{Node, NodeId, Tree};

/// Name of the ordering check.
pub const BST_PROPERTY: &str = "BST property";
/// Name of the parent back-reference check.
pub const PARENT_LINKS: &str = "parent links";

/// The outcome of one invariant check on one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantCheck {
    /// Which invariant was checked.
    pub name: String,
    /// Whether it held.
    pub passed: bool,
    /// What went wrong, when it didn't.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl InvariantCheck {
    fn new(name: &str, failure: Option<String>) -> Self {
        Self {
            name: name.to_owned(),
            passed: failure.is_none(),
            detail: failure,
        }
    }
}

/// Runs every check against `tree`.
pub fn check_all<K: fmt::Display>(tree: &Tree<K>) -> Vec<InvariantCheck> {
    vec![check_bst_property(tree), check_parent_links(tree)]
}

/// Every node reachable from the root lies within the closed range its
/// ancestors allow: no greater than any ancestor it sits left of, no smaller
/// than any ancestor it sits right of.
pub fn check_bst_property<K: fmt::Display>(tree: &Tree<K>) -> InvariantCheck {
    let failure = out_of_range(tree).map(|(node, low, high)| {
        format!(
            "{} (key {}) lies outside [{}, {}]",
            node.id(),
            node.key(),
            low.map_or_else(|| "-inf".to_owned(), ToString::to_string),
            high.map_or_else(|| "+inf".to_owned(), ToString::to_string),
        )
    });
    InvariantCheck::new(BST_PROPERTY, failure)
}

type Violation<'t, K> = (&'t Node<K>, Option<&'t K>, Option<&'t K>);

/// The first node, in pre-order, outside the range its ancestors allow.
fn out_of_range<K>(tree: &Tree<K>) -> Option<Violation<'_, K>> {
    let config = tree.config();
    let mut seen = BTreeSet::new();
    let mut stack = vec![(tree.root()?, None, None)];
    while let Some((id, low, high)) = stack.pop() {
        // Dangling ids and cycles are the parent-link check's business.
        let Some(node) = tree.node(id) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        let below = low.map_or(false, |low| config.compare(node.key(), low) == Ordering::Less);
        let above = high.map_or(false, |high| config.compare(node.key(), high) == Ordering::Greater);
        if below || above {
            return Some((node, low, high));
        }

        if let Some(right) = node.right() {
            stack.push((right, Some(node.key()), high));
        }
        if let Some(left) = node.left() {
            stack.push((left, low, Some(node.key())));
        }
    }
    None
}

/// The root has no parent, every reachable child exists and points back at
/// the node referencing it, and no node is referenced twice.
pub fn check_parent_links<K>(tree: &Tree<K>) -> InvariantCheck {
    InvariantCheck::new(PARENT_LINKS, broken_link(tree))
}

fn broken_link<K>(tree: &Tree<K>) -> Option<String> {
    let root = tree.root()?;
    let Some(root_node) = tree.node(root) else {
        return Some(format!("root {} is missing", root));
    };
    if let Some(parent) = root_node.parent() {
        return Some(format!("root {} claims parent {}", root, parent));
    }

    let mut seen = BTreeSet::from([root]);
    let mut stack = vec![root_node];
    while let Some(node) = stack.pop() {
        for child in [node.left(), node.right()].into_iter().flatten() {
            let Some(child_node) = tree.node(child) else {
                return Some(format!("{} references missing child {}", node.id(), child));
            };
            if !seen.insert(child) {
                return Some(format!("{} is referenced more than once", child));
            }
            if child_node.parent() != Some(node.id()) {
                return Some(format!(
                    "{} is a child of {} but its parent is {}",
                    child,
                    node.id(),
                    child_node
                        .parent()
                        .map_or_else(|| "unset".to_owned(), |p| p.to_string()),
                ));
            }
            stack.push(child_node);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Node, Side};
    use crate::Engine;

    fn id(raw: u64) -> NodeId {
        NodeId::new(raw)
    }

    /// 5 with 7 hung off its left side.
    fn misordered() -> Tree<i32> {
        let mut tree = Tree::new();
        tree.put(Node::new(id(1), 5, None));
        tree.put(Node::new(id(2), 7, None));
        tree.set_root(Some(id(1)));
        tree.link(id(1), Side::Left, Some(id(2)));
        tree
    }

    #[test]
    fn test_valid_tree_passes() {
        let mut engine = Engine::new();
        let tree = [8, 3, 10, 1, 6, 14]
            .iter()
            .fold(Tree::new(), |tree, &k| engine.insert(&tree, k).next);

        assert!(check_all(&tree).iter().all(|check| check.passed));
    }

    #[test]
    fn test_empty_tree_passes() {
        assert!(check_all(&Tree::<i32>::new()).iter().all(|check| check.passed));
    }

    #[test]
    fn test_detects_misordered_key() {
        let check = check_bst_property(&misordered());

        assert_eq!(check.name, BST_PROPERTY);
        assert!(!check.passed);
        assert_eq!(
            check.detail.as_deref(),
            Some("node-2 (key 7) lies outside [-inf, 5]")
        );
        assert!(check_parent_links(&misordered()).passed);
    }

    #[test]
    fn test_equal_keys_are_allowed_on_either_side() {
        let mut tree = Tree::new();
        tree.put(Node::new(id(1), 5, None));
        tree.put(Node::new(id(2), 5, None));
        tree.put(Node::new(id(3), 5, None));
        tree.set_root(Some(id(1)));
        tree.link(id(1), Side::Left, Some(id(2)));
        tree.link(id(1), Side::Right, Some(id(3)));

        assert!(check_bst_property(&tree).passed);
    }

    #[test]
    fn test_degenerate_tree_is_checked_without_recursion() {
        let depth = 200_000;
        let mut tree = Tree::new();
        for raw in 1..=depth {
            tree.put(Node::new(id(raw), raw as i64, None));
        }
        tree.set_root(Some(id(1)));
        for raw in 1..depth {
            tree.link(id(raw), Side::Right, Some(id(raw + 1)));
        }

        assert!(check_all(&tree).iter().all(|check| check.passed));

        tree.put(Node::new(id(depth + 1), 0, None));
        tree.link(id(depth), Side::Left, Some(id(depth + 1)));
        let check = check_bst_property(&tree);
        assert_eq!(
            check.detail.as_deref(),
            Some("node-200001 (key 0) lies outside [199999, 200000]")
        );
    }

    #[test]
    fn test_detects_stale_parent() {
        let mut tree = misordered();
        tree.node_mut(id(2)).set_parent(None);

        let check = check_parent_links(&tree);
        assert!(!check.passed);
        assert_eq!(
            check.detail.as_deref(),
            Some("node-2 is a child of node-1 but its parent is unset")
        );
    }

    #[test]
    fn test_detects_shared_child() {
        let mut tree = misordered();
        tree.node_mut(id(1)).set_child(Side::Right, Some(id(2)));

        let check = check_parent_links(&tree);
        assert!(!check.passed);
        assert_eq!(check.detail.as_deref(), Some("node-2 is referenced more than once"));
    }

    #[test]
    fn test_detects_missing_child() {
        let mut tree = misordered();
        tree.take(id(2));

        assert!(!check_parent_links(&tree).passed);
        assert!(check_bst_property(&tree).passed);
    }
}
