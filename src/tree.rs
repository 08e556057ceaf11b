//! The tree model. A [`Tree`] is a value: a root id, a map from [`NodeId`] to
//! [`Node`], and the [`TreeConfig`] it was built under.
//!
//! Nodes link to each other by id rather than by pointer. The map stores
//! `Rc<Node>` so copying a tree for a snapshot only copies the map of
//! pointers; the first write to a node in the copy clones that one node
//! (`Rc::make_mut`) and leaves every earlier snapshot untouched.
//!
//! # Examples
//!
//! ```
//! use bst_trace::{Engine, Tree};
//!
//! let mut engine = Engine::new();
//! let tree = Tree::new();
//! let first = engine.insert(&tree, 4).next;
//! let second = engine.insert(&first, 2).next;
//!
//! // Both versions are still intact.
//! assert_eq!(tree.len(), 0);
//! assert_eq!(first.len(), 1);
//! assert_eq!(second.len(), 2);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Identifies a node for the whole life of the process. Ids are minted by an
/// [`Engine`](crate::Engine) and never handed out twice, even after the node
/// they named has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value behind this id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Which child slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The left child, holding smaller keys.
    Left,
    /// The right child, holding larger keys.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// A single keyed node. The parent owns the edge to each child; `parent` is
/// only a back-reference used for navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node<K> {
    id: NodeId,
    key: K,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    left: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    right: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<NodeId>,
    /// Multiplicity, only tracked under [`DuplicatePolicy::Multiset`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
}

impl<K> Node<K> {
    pub(crate) fn new(id: NodeId, key: K, count: Option<u32>) -> Self {
        Self {
            id,
            key,
            left: None,
            right: None,
            parent: None,
            count,
        }
    }

    /// This node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// This node's key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The left child, if any.
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// The right child, if any.
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// The child on the given side, if any.
    pub fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// The node that references this one as a child. `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The raw multiplicity metadata, present only for multiset nodes.
    pub fn count(&self) -> Option<u32> {
        self.count
    }

    /// How many copies of the key this node stands for.
    pub fn multiplicity(&self) -> u32 {
        self.count.unwrap_or(1)
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_count(&mut self, count: u32) {
        self.count = Some(count);
    }
}

/// How an insert of a key that is already present is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Leave the tree unchanged.
    #[default]
    Reject,
    /// Keep descending left as if the new key were smaller.
    AllowLeft,
    /// Keep descending right as if the new key were larger.
    AllowRight,
    /// Bump the existing node's multiplicity instead of adding a node.
    Multiset,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reject => "reject",
            Self::AllowLeft => "allow-left",
            Self::AllowRight => "allow-right",
            Self::Multiset => "multiset",
        })
    }
}

/// A total order over keys.
pub type Comparator<K> = fn(&K, &K) -> Ordering;

fn natural_order<K: Ord>() -> Comparator<K> {
    <K as Ord>::cmp
}

/// Default capacity of a tree.
pub const DEFAULT_MAX_NODES: usize = 256;

/// Immutable settings a tree is operated under.
///
/// The comparator is not serialized. A deserialized config always compares
/// with the key's natural [`Ord`].
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = "K: Ord"))]
pub struct TreeConfig<K> {
    #[serde(skip, default = "natural_order")]
    comparator: Comparator<K>,
    duplicate_policy: DuplicatePolicy,
    max_nodes: usize,
}

impl<K> TreeConfig<K> {
    /// A config using the given comparator, [`DuplicatePolicy::Reject`], and
    /// [`DEFAULT_MAX_NODES`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_trace::{Engine, Tree, TreeConfig};
    ///
    /// // Floats aren't `Ord`, so hand over a total order explicitly.
    /// let config = TreeConfig::new(f64::total_cmp);
    /// let tree = Engine::new().insert(&Tree::with_config(config), 1.5).next;
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn new(comparator: Comparator<K>) -> Self {
        Self {
            comparator,
            duplicate_policy: DuplicatePolicy::default(),
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    /// Replaces the comparator.
    pub fn with_comparator(self, comparator: Comparator<K>) -> Self {
        Self { comparator, ..self }
    }

    /// Replaces the duplicate policy.
    pub fn with_duplicate_policy(self, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            duplicate_policy,
            ..self
        }
    }

    /// Replaces the node capacity.
    pub fn with_max_nodes(self, max_nodes: usize) -> Self {
        Self { max_nodes, ..self }
    }

    /// The comparator keys are ordered by.
    pub fn comparator(&self) -> Comparator<K> {
        self.comparator
    }

    /// The active duplicate policy.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// The most nodes the tree may hold.
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Compares two keys with the configured comparator.
    pub fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.comparator)(a, b)
    }
}

impl<K: Ord> Default for TreeConfig<K> {
    fn default() -> Self {
        Self::new(natural_order())
    }
}

// Manual impls so `K` doesn't need to be `Clone`/`Debug`/`PartialEq` itself.
impl<K> Clone for TreeConfig<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for TreeConfig<K> {}

impl<K> fmt::Debug for TreeConfig<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeConfig")
            .field("duplicate_policy", &self.duplicate_policy)
            .field("max_nodes", &self.max_nodes)
            .finish_non_exhaustive()
    }
}

/// Function pointers can't be compared meaningfully, so equality ignores the
/// comparator.
impl<K> PartialEq for TreeConfig<K> {
    fn eq(&self, other: &Self) -> bool {
        self.duplicate_policy == other.duplicate_policy && self.max_nodes == other.max_nodes
    }
}

/// A binary search tree state. Operations never change a `Tree` in place;
/// the [`Engine`](crate::Engine) hands back a new one.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Deserialize<'de> + Ord"
))]
pub struct Tree<K> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<NodeId>,
    nodes: BTreeMap<NodeId, Rc<Node<K>>>,
    config: TreeConfig<K>,
}

impl<K: Ord> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning a tree copies the node map but shares every node with the
/// original.
impl<K> Clone for Tree<K> {
    fn clone(&self) -> Self {
        Self {
            root: self.root,
            nodes: self.nodes.clone(),
            config: self.config,
        }
    }
}

impl<K: PartialEq> PartialEq for Tree<K> {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.config == other.config && self.nodes == other.nodes
    }
}

impl<K: Ord> Tree<K> {
    /// An empty tree with the default config.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }
}

impl<K> Tree<K> {
    /// An empty tree with the given config.
    pub fn with_config(config: TreeConfig<K>) -> Self {
        Self {
            root: None,
            nodes: BTreeMap::new(),
            config,
        }
    }

    /// The same tree under a different duplicate policy. Nodes are shared.
    pub fn with_policy(&self, policy: DuplicatePolicy) -> Self {
        Self {
            config: self.config.with_duplicate_policy(policy),
            ..self.clone()
        }
    }

    /// The root's id, if the tree isn't empty.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The root node, if the tree isn't empty.
    pub fn root_node(&self) -> Option<&Node<K>> {
        self.root.and_then(|id| self.node(id))
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node<K>> {
        self.nodes.get(&id).map(Rc::as_ref)
    }

    /// Every node in the tree, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<K>> {
        self.nodes.values().map(Rc::as_ref)
    }

    /// How many nodes the tree holds. Multiset counts are not included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The config this tree is operated under.
    pub fn config(&self) -> &TreeConfig<K> {
        &self.config
    }

    /// Whether `self` and `other` hold the very same allocation for `id`.
    #[cfg(test)]
    pub(crate) fn shares_node(&self, other: &Self, id: NodeId) -> bool {
        match (self.nodes.get(&id), other.nodes.get(&id)) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn max_node_id(&self) -> Option<NodeId> {
        self.nodes.keys().next_back().copied()
    }

    /// Looks up a node the caller knows is present.
    pub(crate) fn get(&self, id: NodeId) -> &Node<K> {
        &self.nodes[&id]
    }

    pub(crate) fn put(&mut self, node: Node<K>) {
        self.nodes.insert(node.id, Rc::new(node));
    }

    pub(crate) fn take(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }
}

impl<K: Clone> Tree<K> {
    /// Mutable access to a present node, cloning it first if a snapshot
    /// still shares it.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        let node = self
            .nodes
            .get_mut(&id)
            .unwrap_or_else(|| unreachable!("{} is not in the tree", id));
        Rc::make_mut(node)
    }

    /// Points `parent`'s `side` slot at `child` and `child` back at `parent`.
    pub(crate) fn link(&mut self, parent: NodeId, side: Side, child: Option<NodeId>) {
        self.node_mut(parent).set_child(side, child);
        if let Some(child) = child {
            self.node_mut(child).set_parent(Some(parent));
        }
    }
}
