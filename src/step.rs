//! Steps and the recorder that produces them.
//!
//! A [`Step`] is one micro-decision of an operation: the action taken, why,
//! which pseudocode lines it corresponds to, what to highlight, and the
//! whole tree as it looked at that moment.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::IdMint;
use crate::invariant::{self, InvariantCheck};
use crate::tree::{NodeId, Side, Tree};

/// Which operation a step or history entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// [`Engine::insert`](crate::Engine::insert).
    Insert,
    /// [`Engine::remove`](crate::Engine::remove).
    Delete,
    /// [`Engine::search`](crate::Engine::search).
    Search,
    /// [`Engine::traverse`](crate::Engine::traverse).
    Traverse,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::Traverse => "traverse",
        })
    }
}

/// The fixed vocabulary of step actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepAction {
    /// A key was compared against a node, or a precondition was checked.
    Compare,
    /// The cursor moved to a left child.
    MoveLeft,
    /// The cursor moved to a right child.
    MoveRight,
    /// A node was allocated and attached.
    CreateNode,
    /// A node was visited, found, or singled out.
    VisitNode,
    /// A subtree was relinked in place of another.
    Transplant,
    /// A node's metadata changed without changing the structure.
    ReplaceValue,
    /// A node left the tree.
    DeleteNode,
    /// A node joined the traversal queue.
    Enqueue,
    /// A node left the traversal queue.
    Dequeue,
}

impl StepAction {
    /// The move action heading to `side`.
    pub fn moving(side: Side) -> Self {
        match side {
            Side::Left => Self::MoveLeft,
            Side::Right => Self::MoveRight,
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compare => "compare",
            Self::MoveLeft => "move-left",
            Self::MoveRight => "move-right",
            Self::CreateNode => "create-node",
            Self::VisitNode => "visit-node",
            Self::Transplant => "transplant",
            Self::ReplaceValue => "replace-value",
            Self::DeleteNode => "delete-node",
            Self::Enqueue => "enqueue",
            Self::Dequeue => "dequeue",
        })
    }
}

/// Identifies a step across every trace the engine ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId {
    /// The operation that produced the step.
    pub op: OpKind,
    /// Engine-wide sequence number.
    pub seq: u64,
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.op, self.seq)
    }
}

/// What a renderer should emphasize for a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Nodes to emphasize.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub nodes: BTreeSet<NodeId>,
    /// Directed parent-to-child edges to emphasize.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub edges: BTreeSet<(NodeId, NodeId)>,
    /// Nodes visited so far, in visitation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_tag: Vec<NodeId>,
}

impl Highlight {
    /// Nothing highlighted.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single node.
    pub fn node(id: NodeId) -> Self {
        Self::of_nodes([id])
    }

    /// A set of nodes.
    pub fn of_nodes(ids: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            nodes: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Adds the edge `from -> to`.
    pub fn with_edge(mut self, from: NodeId, to: NodeId) -> Self {
        self.edges.insert((from, to));
        self
    }

    /// Sets the visitation order badge list.
    pub fn with_order_tag(mut self, order_tag: Vec<NodeId>) -> Self {
        self.order_tag = order_tag;
        self
    }

    /// Whether there is nothing to highlight.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.order_tag.is_empty()
    }
}

/// One event of an operation trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Deserialize<'de> + Ord"
))]
pub struct Step<K> {
    /// Unique id of this step.
    pub id: StepId,
    /// The operation this step belongs to.
    pub op: OpKind,
    /// Zero-based position within its trace.
    pub index: usize,
    /// What happened.
    pub action: StepAction,
    /// Narration for what happened and why.
    pub reason: String,
    /// Invariants checked against `snapshot`.
    pub invariant_checks: Vec<InvariantCheck>,
    /// 1-based lines of the operation's [pseudocode](crate::pseudocode).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_lines: Vec<u32>,
    /// What to emphasize.
    #[serde(default, skip_serializing_if = "Highlight::is_empty")]
    pub highlights: Highlight,
    /// The tree as it was when this step happened.
    pub snapshot: Tree<K>,
}

impl<K> Step<K> {
    /// Whether every invariant held at this step.
    pub fn passed_all_checks(&self) -> bool {
        self.invariant_checks.iter().all(|check| check.passed)
    }
}

/// Accumulates the steps of a single operation.
pub(crate) struct Recorder<'e, K> {
    op: OpKind,
    ids: &'e mut IdMint,
    steps: Vec<Step<K>>,
}

impl<'e, K: fmt::Display> Recorder<'e, K> {
    pub(crate) fn new(op: OpKind, ids: &'e mut IdMint) -> Self {
        Self {
            op,
            ids,
            steps: Vec::new(),
        }
    }

    /// Mints an id for a node about to be created.
    pub(crate) fn node_id(&mut self) -> NodeId {
        self.ids.node()
    }

    pub(crate) fn record(
        &mut self,
        tree: &Tree<K>,
        action: StepAction,
        reason: String,
        code_lines: &[u32],
        highlights: Highlight,
    ) {
        let invariant_checks = invariant::check_all(tree);
        for check in invariant_checks.iter().filter(|check| !check.passed) {
            tracing::warn!(
                op = %self.op,
                check = %check.name,
                detail = ?check.detail,
                "invariant check failed"
            );
        }
        tracing::trace!(op = %self.op, action = %action, reason = %reason, "step recorded");

        self.steps.push(Step {
            id: self.ids.step(self.op),
            op: self.op,
            index: 0,
            action,
            reason,
            invariant_checks,
            code_lines: code_lines.to_vec(),
            highlights,
            snapshot: tree.clone(),
        });
    }

    /// Hands back the trace with contiguous, zero-based indices.
    pub(crate) fn finish(self) -> Vec<Step<K>> {
        let mut steps = self.steps;
        for (index, step) in steps.iter_mut().enumerate() {
            step.index = index;
        }
        steps
    }
}
