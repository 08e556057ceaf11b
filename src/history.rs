//! Operation history and the exported session document.
//!
//! The [`Engine`] keeps nothing between calls. A [`Session`] is the caller
//! that does: it holds the current tree, applies [`Command`]s, and files each
//! trace together with the tree before and after it as a [`HistoryEntry`].

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::key::Key;
use crate::script::{self, Command, ScriptError};
use crate::step::{OpKind, Step};
use crate::tree::Tree;

/// Identifies one applied operation within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpId(u64);

impl OpId {
    /// The raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// One applied operation: its trace and the trees on either side of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Deserialize<'de> + Ord"
))]
pub struct HistoryEntry<K> {
    /// Which operation this was.
    pub op_id: OpId,
    /// What kind of operation it was.
    pub op: OpKind,
    /// The full trace.
    pub steps: Vec<Step<K>>,
    /// The tree the operation ran against.
    pub before: Tree<K>,
    /// The tree it produced.
    pub after: Tree<K>,
}

/// A tree plus the undoable history of operations that produced it.
///
/// # Examples
///
/// ```
/// use bst_trace::{Command, Session, Tree};
///
/// let mut session = Session::new(Tree::new());
/// session.apply(Command::Insert(2));
/// session.apply(Command::Insert(1));
/// assert_eq!(session.tree().len(), 2);
///
/// assert!(session.undo());
/// assert_eq!(session.tree().len(), 1);
/// assert!(session.redo());
/// assert_eq!(session.tree().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Session<K> {
    engine: Engine,
    tree: Tree<K>,
    history: Vec<HistoryEntry<K>>,
    /// How many entries of `history` are applied; the rest can be redone.
    cursor: usize,
    last_op: u64,
}

impl<K> Session<K>
where
    K: Clone + fmt::Display,
{
    /// A session starting from `tree` with an empty history.
    pub fn new(tree: Tree<K>) -> Self {
        let mut engine = Engine::new();
        engine.reserve_past(&tree);
        Self {
            engine,
            tree,
            history: Vec::new(),
            cursor: 0,
            last_op: 0,
        }
    }

    /// The current tree.
    pub fn tree(&self) -> &Tree<K> {
        &self.tree
    }

    /// Every recorded entry, including ones that were undone.
    pub fn history(&self) -> &[HistoryEntry<K>] {
        &self.history
    }

    /// The entries currently applied, oldest first.
    pub fn applied(&self) -> &[HistoryEntry<K>] {
        &self.history[..self.cursor]
    }

    /// The most recently applied entry.
    pub fn current(&self) -> Option<&HistoryEntry<K>> {
        self.applied().last()
    }

    /// Runs `command` against the current tree and records it. Entries that
    /// had been undone are discarded.
    pub fn apply(&mut self, command: Command<K>) -> &HistoryEntry<K> {
        let op = command.op();
        let before = self.tree.clone();
        let (steps, after) = match command {
            Command::Insert(key) => {
                let result = self.engine.insert(&before, key);
                (result.steps, result.next)
            }
            Command::Delete(key) => {
                let result = self.engine.remove(&before, &key);
                (result.steps, result.next)
            }
            Command::Search(key) => (self.engine.search(&before, key).steps, before.clone()),
            Command::Traverse(kind) => (self.engine.traverse(&before, kind), before.clone()),
        };

        self.last_op += 1;
        let op_id = OpId(self.last_op);
        tracing::debug!(op_id = %op_id, op = %op, steps = steps.len(), "applying operation");

        self.history.truncate(self.cursor);
        self.tree = after.clone();
        self.history.push(HistoryEntry {
            op_id,
            op,
            steps,
            before,
            after,
        });
        self.cursor = self.history.len();
        &self.history[self.cursor - 1]
    }

    /// Restores the tree from before the latest applied entry. `false` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(cursor) = self.cursor.checked_sub(1) else {
            return false;
        };
        self.cursor = cursor;
        self.tree = self.history[cursor].before.clone();
        tracing::debug!(op_id = %self.history[cursor].op_id, "undo");
        true
    }

    /// Re-applies the next undone entry. `false` when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.get(self.cursor) else {
            return false;
        };
        self.tree = entry.after.clone();
        tracing::debug!(op_id = %entry.op_id, "redo");
        self.cursor += 1;
        true
    }

    /// Replaces the tree and forgets all history. Ids keep counting up.
    pub fn reset(&mut self, tree: Tree<K>) {
        self.engine.reserve_past(&tree);
        self.tree = tree;
        self.history.clear();
        self.cursor = 0;
    }

    /// A timestamped document of the current tree and the applied history.
    pub fn export(&self) -> ExportDocument<K> {
        let exported_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        ExportDocument {
            tree: self.tree.clone(),
            history: self.applied().to_vec(),
            exported_at,
        }
    }
}

impl Session<Key> {
    /// Parses `script` and applies every command in order. Returns how many
    /// commands ran. Nothing runs if the script doesn't parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_trace::{Key, Session, Tree};
    ///
    /// let mut session = Session::new(Tree::new());
    /// assert_eq!(session.run_script("I 8, I 3, S 3, D 8, T IN").unwrap(), 5);
    /// assert_eq!(session.tree().keys_in_order(), vec![&Key::from(3)]);
    /// ```
    pub fn run_script(&mut self, script: &str) -> Result<usize, ScriptError> {
        let commands = script::parse_script(script)?;
        let count = commands.len();
        for command in commands {
            self.apply(command);
        }
        Ok(count)
    }
}

/// The persisted form of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Deserialize<'de> + Ord"
))]
pub struct ExportDocument<K> {
    /// The tree at export time.
    pub tree: Tree<K>,
    /// The applied history, oldest first.
    pub history: Vec<HistoryEntry<K>>,
    /// Seconds since the Unix epoch.
    pub exported_at: u64,
}

impl<K: Serialize> ExportDocument<K> {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<K> ExportDocument<K>
where
    K: for<'de> Deserialize<'de> + Ord,
{
    /// Reads a document written by [`to_json`](Self::to_json). Trees come
    /// back with the key's natural ordering as their comparator.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl<K> ExportDocument<K>
where
    K: Clone + fmt::Display,
{
    /// A session positioned at the end of this document's history. Its
    /// engine will never mint an id that appears anywhere in the document.
    pub fn into_session(self) -> Session<K> {
        let mut session = Session::new(self.tree);
        for entry in &self.history {
            session.engine.reserve_past(&entry.before);
            session.engine.reserve_past(&entry.after);
            if let Some(seq) = entry.steps.iter().map(|step| step.id.seq).max() {
                session.engine.reserve_step(seq);
            }
        }
        session.last_op = self.history.last().map_or(0, |entry| entry.op_id.get());
        session.cursor = self.history.len();
        session.history = self.history;
        session
    }
}
