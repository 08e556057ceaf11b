//! The operation engine. An [`Engine`] runs insert, delete, search, and
//! traversal against a [`Tree`] and returns the full step trace alongside the
//! resulting tree.
//!
//! The engine keeps no history. Its only state is the pair of counters used
//! to mint node and step ids, which never hand out the same id twice for the
//! life of the engine.
//!
//! # Examples
//!
//! ```
//! use bst_trace::{Engine, StepAction, Tree};
//!
//! let mut engine = Engine::new();
//! let tree = [8, 3, 10]
//!     .iter()
//!     .fold(Tree::new(), |tree, &k| engine.insert(&tree, k).next);
//!
//! let result = engine.search(&tree, 3);
//! assert!(result.found);
//!
//! let last = result.steps.last().unwrap();
//! assert_eq!(last.action, StepAction::VisitNode);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::step::{OpKind, Step, StepId};
use crate::tree::{NodeId, Tree};

mod insert;
mod remove;
mod search;
mod traverse;

/// The two id counters. Both count up from zero and hand out the value
/// after incrementing, so the first id is 1.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IdMint {
    nodes: u64,
    steps: u64,
}

impl IdMint {
    pub(crate) fn node(&mut self) -> NodeId {
        self.nodes += 1;
        NodeId::new(self.nodes)
    }

    pub(crate) fn step(&mut self, op: OpKind) -> StepId {
        self.steps += 1;
        StepId { op, seq: self.steps }
    }
}

/// Result of [`Engine::insert`].
#[derive(Debug, Clone)]
pub struct InsertResult<K> {
    /// The trace of the insert.
    pub steps: Vec<Step<K>>,
    /// The tree after the insert. Equal to the input when nothing changed.
    pub next: Tree<K>,
}

/// Result of [`Engine::remove`].
#[derive(Debug, Clone)]
pub struct RemoveResult<K> {
    /// The trace of the delete.
    pub steps: Vec<Step<K>>,
    /// The tree after the delete. Equal to the input when nothing changed.
    pub next: Tree<K>,
}

/// Result of [`Engine::search`].
#[derive(Debug, Clone)]
pub struct SearchResult<K> {
    /// The trace of the search.
    pub steps: Vec<Step<K>>,
    /// Whether the key is in the tree.
    pub found: bool,
}

/// Order in which [`Engine::traverse`] visits nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraverseKind {
    /// Node, then left subtree, then right subtree.
    Pre,
    /// Left subtree, then node, then right subtree.
    In,
    /// Left subtree, then right subtree, then node.
    Post,
    /// Breadth first, left to right.
    Level,
}

impl fmt::Display for TraverseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pre => "pre",
            Self::In => "in",
            Self::Post => "post",
            Self::Level => "level",
        })
    }
}

/// Runs operations and mints the ids they need.
///
/// Every method takes `&mut self` only to advance the id counters; none of
/// them modifies the tree passed in.
#[derive(Debug, Default, Clone)]
pub struct Engine {
    ids: IdMint,
}

impl Engine {
    /// An engine whose first node and step ids are both 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that continues counting from the given values, e.g. to
    /// resume a saved session or make test ids predictable.
    pub fn with_counters(nodes: u64, steps: u64) -> Self {
        Self {
            ids: IdMint { nodes, steps },
        }
    }

    /// The last node id and step sequence number handed out.
    pub fn counters(&self) -> (u64, u64) {
        (self.ids.nodes, self.ids.steps)
    }

    /// Starts counting from zero again. Only safe when every tree and trace
    /// minted so far is being thrown away.
    pub fn reset(&mut self) {
        self.ids = IdMint::default();
    }

    /// Advances the node counter past every id in `tree` so new nodes can't
    /// collide with it.
    pub fn reserve_past<K>(&mut self, tree: &Tree<K>) {
        if let Some(max) = tree.max_node_id() {
            self.ids.nodes = self.ids.nodes.max(max.get());
        }
    }

    /// Advances the step counter past `seq`.
    pub(crate) fn reserve_step(&mut self, seq: u64) {
        self.ids.steps = self.ids.steps.max(seq);
    }

    /// Inserts `key`, honoring the tree's capacity and duplicate policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_trace::{DuplicatePolicy, Engine, Tree, TreeConfig};
    ///
    /// let config = TreeConfig::default().with_duplicate_policy(DuplicatePolicy::Multiset);
    /// let mut engine = Engine::new();
    /// let once = engine.insert(&Tree::with_config(config), 5).next;
    /// let twice = engine.insert(&once, 5).next;
    ///
    /// assert_eq!(twice.len(), 1);
    /// assert_eq!(twice.root_node().unwrap().multiplicity(), 2);
    /// ```
    pub fn insert<K>(&mut self, tree: &Tree<K>, key: K) -> InsertResult<K>
    where
        K: Clone + fmt::Display,
    {
        tracing::debug!(op = %OpKind::Insert, key = %key, nodes = tree.len(), "operation started");
        let result = insert::insert(&mut self.ids, tree, key);
        tracing::debug!(op = %OpKind::Insert, steps = result.steps.len(), nodes = result.next.len(), "operation finished");
        result
    }

    /// Deletes one occurrence of `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_trace::{Engine, Tree};
    ///
    /// let mut engine = Engine::new();
    /// let tree = engine.insert(&Tree::new(), 1).next;
    /// let removed = engine.remove(&tree, &1);
    ///
    /// assert!(removed.next.is_empty());
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn remove<K>(&mut self, tree: &Tree<K>, key: &K) -> RemoveResult<K>
    where
        K: Clone + fmt::Display,
    {
        tracing::debug!(op = %OpKind::Delete, key = %key, nodes = tree.len(), "operation started");
        let result = remove::remove(&mut self.ids, tree, key);
        tracing::debug!(op = %OpKind::Delete, steps = result.steps.len(), nodes = result.next.len(), "operation finished");
        result
    }

    /// Looks for `key` without changing anything.
    pub fn search<K>(&mut self, tree: &Tree<K>, key: K) -> SearchResult<K>
    where
        K: fmt::Display,
    {
        tracing::debug!(op = %OpKind::Search, key = %key, nodes = tree.len(), "operation started");
        let result = search::search(&mut self.ids, tree, &key);
        tracing::debug!(op = %OpKind::Search, steps = result.steps.len(), found = result.found, "operation finished");
        result
    }

    /// Walks the whole tree in the given order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_trace::{Engine, Tree, TraverseKind};
    ///
    /// let mut engine = Engine::new();
    /// let tree = [2, 1, 3]
    ///     .iter()
    ///     .fold(Tree::new(), |tree, &k| engine.insert(&tree, k).next);
    ///
    /// let steps = engine.traverse(&tree, TraverseKind::In);
    /// let order = &steps.last().unwrap().highlights.order_tag;
    /// let keys: Vec<_> = order.iter().map(|&id| *tree.node(id).unwrap().key()).collect();
    /// assert_eq!(keys, vec![1, 2, 3]);
    /// ```
    pub fn traverse<K>(&mut self, tree: &Tree<K>, kind: TraverseKind) -> Vec<Step<K>>
    where
        K: fmt::Display,
    {
        tracing::debug!(op = %OpKind::Traverse, kind = %kind, nodes = tree.len(), "operation started");
        let steps = traverse::traverse(&mut self.ids, tree, kind);
        tracing::debug!(op = %OpKind::Traverse, steps = steps.len(), "operation finished");
        steps
    }
}
