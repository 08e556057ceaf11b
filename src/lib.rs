//! This crate animates Binary Search Tree (BST) operations step by step,
//! mostly for educational purposes.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a key and
//! sometimes has child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than (or, with duplicates, equal to) its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than (or, with duplicates, equal to) its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! ## Traces
//!
//! Rather than just performing an operation, the [`Engine`] records every
//! micro-decision it makes along the way as a [`Step`]: each comparison,
//! each move down the tree, each transplant during a delete. Every step
//! carries a narration, the [pseudocode] lines it corresponds to, what to
//! highlight, the result of the [invariant] checks, and a snapshot of the
//! whole tree at that instant. Playing the steps back in order animates the
//! operation.
//!
//! Trees are values. Operations never modify the tree they are given; the
//! engine returns a new one that shares every untouched node with the old one,
//! so each snapshot (and the tree from before the operation) stays valid.
//!
//! # Examples
//!
//! ```
//! use bst_trace::{Engine, StepAction, Tree};
//!
//! let mut engine = Engine::new();
//! let tree = [5, 3, 8, 1, 4, 7, 9]
//!     .iter()
//!     .fold(Tree::new(), |tree, &k| engine.insert(&tree, k).next);
//!
//! // Deleting a node with two children promotes its in-order successor.
//! let result = engine.remove(&tree, &5);
//! assert_eq!(result.next.root_node().unwrap().key(), &7);
//! assert_eq!(result.steps.last().unwrap().action, StepAction::DeleteNode);
//!
//! // The original tree is untouched.
//! assert_eq!(tree.root_node().unwrap().key(), &5);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod engine;
mod history;
pub mod invariant;
mod key;
mod metrics;
pub mod pseudocode;
mod script;
mod step;
mod tree;

pub use engine::{Engine, InsertResult, RemoveResult, SearchResult, TraverseKind};
pub use history::{ExportDocument, HistoryEntry, OpId, Session};
pub use invariant::InvariantCheck;
pub use key::Key;
pub use script::{parse_script, Command, ScriptError};
pub use step::{Highlight, OpKind, Step, StepAction, StepId};
pub use tree::{Comparator, DuplicatePolicy, Node, NodeId, Side, Tree, TreeConfig, DEFAULT_MAX_NODES};
