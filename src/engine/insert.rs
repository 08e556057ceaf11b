use std::cmp::Ordering;
use std::fmt;

use super::{IdMint, InsertResult};
use crate::pseudocode::insert as line;
use crate::step::{Highlight, OpKind, Recorder, StepAction};
use crate::tree::{DuplicatePolicy, Node, NodeId, Side, Tree};

pub(super) fn insert<K>(ids: &mut IdMint, tree: &Tree<K>, key: K) -> InsertResult<K>
where
    K: Clone + fmt::Display,
{
    let mut recorder = Recorder::new(OpKind::Insert, ids);
    let config = *tree.config();
    let policy = config.duplicate_policy();

    if tree.len() >= config.max_nodes() {
        recorder.record(
            tree,
            StepAction::Compare,
            format!(
                "Maximum node limit ({}) reached; insertion of {} skipped.",
                config.max_nodes(),
                key
            ),
            &[line::CAPACITY],
            Highlight::of_nodes(tree.root()),
        );
        return InsertResult {
            steps: recorder.finish(),
            next: tree.clone(),
        };
    }

    let mut next = tree.clone();
    let initial_count = (policy == DuplicatePolicy::Multiset).then_some(1);

    let Some(root) = next.root() else {
        let id = recorder.node_id();
        let reason = format!("Tree is empty; creating root node {}.", key);
        next.put(Node::new(id, key, initial_count));
        next.set_root(Some(id));
        recorder.record(
            &next,
            StepAction::CreateNode,
            reason,
            &[line::EMPTY],
            Highlight::node(id),
        );
        return InsertResult {
            steps: recorder.finish(),
            next,
        };
    };

    let mut current = root;
    let (parent, side) = loop {
        let node = next.get(current);
        let ordering = config.compare(&key, node.key());
        let reason = match ordering {
            Ordering::Less => format!("{} < {}; prepare to move left.", key, node.key()),
            Ordering::Greater => format!("{} > {}; prepare to move right.", key, node.key()),
            Ordering::Equal => format!("{} equals {}; duplicate policy applies.", key, node.key()),
        };
        recorder.record(
            &next,
            StepAction::Compare,
            reason,
            &[line::COMPARE],
            Highlight::node(current),
        );

        let side = match ordering {
            Ordering::Less => Side::Left,
            Ordering::Greater => Side::Right,
            Ordering::Equal => {
                recorder.record(
                    &next,
                    StepAction::Compare,
                    format!("Duplicate encountered. Policy: {}.", policy),
                    &[line::DUPLICATE],
                    Highlight::node(current),
                );
                match policy {
                    DuplicatePolicy::Reject => {
                        recorder.record(
                            tree,
                            StepAction::VisitNode,
                            format!("Rejecting duplicate key {}; tree unchanged.", key),
                            &[line::DUPLICATE],
                            Highlight::node(current),
                        );
                        return InsertResult {
                            steps: recorder.finish(),
                            next: tree.clone(),
                        };
                    }
                    DuplicatePolicy::Multiset => {
                        let node = next.node_mut(current);
                        let count = node.multiplicity() + 1;
                        node.set_count(count);
                        recorder.record(
                            &next,
                            StepAction::ReplaceValue,
                            format!("Incrementing count for {} to {}.", key, count),
                            &[line::DUPLICATE],
                            Highlight::node(current),
                        );
                        return InsertResult {
                            steps: recorder.finish(),
                            next,
                        };
                    }
                    DuplicatePolicy::AllowLeft => Side::Left,
                    DuplicatePolicy::AllowRight => Side::Right,
                }
            }
        };

        let node = next.get(current);
        let child = node.child(side);
        if ordering == Ordering::Equal {
            let highlight = match child {
                Some(child) => Highlight::node(child).with_edge(current, child),
                None => Highlight::node(current),
            };
            recorder.record(
                &next,
                StepAction::moving(side),
                format!(
                    "Policy {} sends duplicates {}; continue {} from {}.",
                    policy,
                    side,
                    side,
                    node.key()
                ),
                &[line::DUPLICATE],
                highlight,
            );
        } else if let Some(child) = child {
            recorder.record(
                &next,
                StepAction::moving(side),
                format!(
                    "Moving {} from {} to {}.",
                    side,
                    node.key(),
                    next.get(child).key()
                ),
                &[go_line(side)],
                Highlight::node(child).with_edge(current, child),
            );
        }

        match child {
            Some(child) => current = child,
            None => break (current, side),
        }
    };

    attach(&mut recorder, &mut next, parent, side, key, initial_count);
    InsertResult {
        steps: recorder.finish(),
        next,
    }
}

fn go_line(side: Side) -> u32 {
    match side {
        Side::Left => line::GO_LEFT,
        Side::Right => line::GO_RIGHT,
    }
}

/// Hangs a fresh node for `key` in `parent`'s empty `side` slot.
fn attach<K>(
    recorder: &mut Recorder<'_, K>,
    tree: &mut Tree<K>,
    parent: NodeId,
    side: Side,
    key: K,
    count: Option<u32>,
) where
    K: Clone + fmt::Display,
{
    let id = recorder.node_id();
    let reason = format!(
        "Attaching {} as {} child of {}.",
        key,
        side,
        tree.get(parent).key()
    );
    tree.put(Node::new(id, key, count));
    tree.link(parent, side, Some(id));
    recorder.record(
        tree,
        StepAction::CreateNode,
        reason,
        &[line::ATTACH],
        Highlight::node(id).with_edge(parent, id),
    );
}
