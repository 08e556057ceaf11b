use std::cmp::Ordering;
use std::fmt;

use super::{IdMint, RemoveResult};
use crate::pseudocode::delete as line;
use crate::step::{Highlight, OpKind, Recorder, StepAction};
use crate::tree::{NodeId, Side, Tree};

pub(super) fn remove<K>(ids: &mut IdMint, tree: &Tree<K>, key: &K) -> RemoveResult<K>
where
    K: Clone + fmt::Display,
{
    let mut recorder = Recorder::new(OpKind::Delete, ids);

    let Some(target) = locate(&mut recorder, tree, key) else {
        return RemoveResult {
            steps: recorder.finish(),
            next: tree.clone(),
        };
    };

    let mut next = tree.clone();
    let node = next.get(target);
    let target_key = node.key().clone();

    if node.multiplicity() > 1 {
        let count = node.multiplicity() - 1;
        next.node_mut(target).set_count(count);
        recorder.record(
            &next,
            StepAction::ReplaceValue,
            format!("Multiset: decrementing count of {} to {}.", target_key, count),
            &[line::MULTISET],
            Highlight::node(target),
        );
        return RemoveResult {
            steps: recorder.finish(),
            next,
        };
    }

    match (node.left(), node.right()) {
        (None, right) => transplant(
            &mut recorder,
            &mut next,
            target,
            right,
            format!("Node {} has no left child; replace with right subtree.", target_key),
            line::NO_LEFT,
        ),
        (Some(left), None) => transplant(
            &mut recorder,
            &mut next,
            target,
            Some(left),
            format!("Node {} has no right child; replace with left subtree.", target_key),
            line::NO_RIGHT,
        ),
        (Some(_), Some(right)) => {
            let successor = find_successor(&mut recorder, &next, right);
            replace_with_successor(&mut recorder, &mut next, target, successor);
        }
    }

    next.take(target);
    recorder.record(
        &next,
        StepAction::DeleteNode,
        format!("Node {} removed from tree.", target_key),
        &[line::FREE],
        Highlight::none(),
    );
    RemoveResult {
        steps: recorder.finish(),
        next,
    }
}

/// Walks down to the node holding `key`, recording each comparison. `None`
/// when the key isn't in the tree; the not-found steps are already recorded.
fn locate<K>(recorder: &mut Recorder<'_, K>, tree: &Tree<K>, key: &K) -> Option<NodeId>
where
    K: fmt::Display,
{
    let Some(mut current) = tree.root() else {
        recorder.record(
            tree,
            StepAction::Compare,
            "Tree is empty; nothing to delete.".to_owned(),
            &[line::NOT_FOUND],
            Highlight::none(),
        );
        return None;
    };

    loop {
        let node = tree.get(current);
        let ordering = tree.config().compare(key, node.key());
        let reason = match ordering {
            Ordering::Equal => format!("Found node {} to delete.", node.key()),
            Ordering::Less => format!("{} < {}; traverse left.", key, node.key()),
            Ordering::Greater => format!("{} > {}; traverse right.", key, node.key()),
        };
        recorder.record(
            tree,
            StepAction::Compare,
            reason,
            &[line::SEARCH],
            Highlight::node(current),
        );

        let side = match ordering {
            Ordering::Equal => return Some(current),
            Ordering::Less => Side::Left,
            Ordering::Greater => Side::Right,
        };
        match node.child(side) {
            Some(child) => {
                recorder.record(
                    tree,
                    StepAction::moving(side),
                    format!("Moving {} to {}.", side, tree.get(child).key()),
                    &[line::SEARCH],
                    Highlight::node(child).with_edge(current, child),
                );
                current = child;
            }
            None => {
                recorder.record(
                    tree,
                    StepAction::moving(side),
                    format!("No {} child from {}; {} not present.", side, node.key(), key),
                    &[line::SEARCH, line::NOT_FOUND],
                    Highlight::node(current),
                );
                recorder.record(
                    tree,
                    StepAction::VisitNode,
                    format!("Key {} not found; no deletion.", key),
                    &[line::NOT_FOUND],
                    Highlight::none(),
                );
                return None;
            }
        }
    }
}

/// Leftmost node of the subtree rooted at `start`, recording the descent.
fn find_successor<K>(recorder: &mut Recorder<'_, K>, tree: &Tree<K>, start: NodeId) -> NodeId
where
    K: fmt::Display,
{
    recorder.record(
        tree,
        StepAction::Compare,
        format!("Find successor: start at right child {}.", tree.get(start).key()),
        &[line::SUCCESSOR],
        Highlight::node(start),
    );

    let mut current = start;
    while let Some(left) = tree.get(current).left() {
        recorder.record(
            tree,
            StepAction::MoveLeft,
            format!("Successor search: move left to {}.", tree.get(left).key()),
            &[line::SUCCESSOR],
            Highlight::node(left).with_edge(current, left),
        );
        current = left;
    }

    recorder.record(
        tree,
        StepAction::VisitNode,
        format!("Successor identified: {}.", tree.get(current).key()),
        &[line::SUCCESSOR],
        Highlight::node(current),
    );
    current
}

/// Puts `successor` where `target` is. `successor` is the leftmost node of
/// `target`'s right subtree, so it has no left child of its own.
fn replace_with_successor<K>(
    recorder: &mut Recorder<'_, K>,
    tree: &mut Tree<K>,
    target: NodeId,
    successor: NodeId,
) where
    K: Clone + fmt::Display,
{
    let target_key = tree.get(target).key().clone();
    let succ = tree.get(successor);
    let succ_key = succ.key().clone();
    let succ_parent = succ.parent();
    let succ_right = succ.right();

    let mut selected = Highlight::of_nodes([target, successor]);
    if let Some(parent) = succ_parent {
        selected = selected.with_edge(parent, successor);
    }
    recorder.record(
        tree,
        StepAction::Transplant,
        format!("Successor {} selected to replace {}.", succ_key, target_key),
        &[line::SUCCESSOR_DEEP],
        selected,
    );

    if succ_parent != Some(target) {
        transplant(
            recorder,
            tree,
            successor,
            succ_right,
            format!("Lift successor {}; connect its right child upwards.", succ_key),
            line::LIFT_SUCCESSOR,
        );
        let right = tree.get(target).right();
        tree.link(successor, Side::Right, right);
    }

    transplant(
        recorder,
        tree,
        target,
        Some(successor),
        format!("Transplant successor {} into the position of {}.", succ_key, target_key),
        line::REPLACE,
    );

    let left = tree.get(target).left();
    tree.link(successor, Side::Left, left);
    let mut adopted = Highlight::node(successor);
    if let Some(left) = left {
        adopted = adopted.with_edge(successor, left);
    }
    recorder.record(
        tree,
        StepAction::Transplant,
        format!("Successor {} adopts the left subtree of {}.", succ_key, target_key),
        &[line::ADOPT_LEFT],
        adopted,
    );
}

/// Replaces the subtree rooted at `old` with the one rooted at `new` in the
/// eyes of `old`'s parent. `old` keeps its own child pointers.
fn transplant<K>(
    recorder: &mut Recorder<'_, K>,
    tree: &mut Tree<K>,
    old: NodeId,
    new: Option<NodeId>,
    reason: String,
    code_line: u32,
) where
    K: Clone + fmt::Display,
{
    let parent = tree.get(old).parent();
    match parent {
        None => {
            tree.set_root(new);
            if let Some(new) = new {
                tree.node_mut(new).set_parent(None);
            }
        }
        Some(parent) => {
            let side = if tree.get(parent).left() == Some(old) {
                Side::Left
            } else {
                Side::Right
            };
            tree.link(parent, side, new);
        }
    }

    let highlight = match (new, parent) {
        (Some(new), Some(parent)) => Highlight::of_nodes([old, new]).with_edge(parent, new),
        (Some(new), None) => Highlight::of_nodes([old, new]),
        (None, _) => Highlight::node(old),
    };
    recorder.record(tree, StepAction::Transplant, reason, &[code_line], highlight);
}
