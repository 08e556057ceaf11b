use std::cmp::Ordering;
use std::fmt;

use super::{IdMint, SearchResult};
use crate::pseudocode::search as line;
use crate::step::{Highlight, OpKind, Recorder, StepAction};
use crate::tree::{Side, Tree};

pub(super) fn search<K>(ids: &mut IdMint, tree: &Tree<K>, key: &K) -> SearchResult<K>
where
    K: fmt::Display,
{
    let mut recorder = Recorder::new(OpKind::Search, ids);
    let found = walk(&mut recorder, tree, key);
    SearchResult {
        steps: recorder.finish(),
        found,
    }
}

fn walk<K>(recorder: &mut Recorder<'_, K>, tree: &Tree<K>, key: &K) -> bool
where
    K: fmt::Display,
{
    let Some(mut current) = tree.root() else {
        recorder.record(
            tree,
            StepAction::Compare,
            "Tree is empty; nothing to search.".to_owned(),
            &[line::START],
            Highlight::none(),
        );
        return false;
    };

    loop {
        let node = tree.get(current);
        let ordering = tree.config().compare(key, node.key());
        let reason = match ordering {
            Ordering::Equal => format!("Key {} equals {}; search successful.", key, node.key()),
            Ordering::Less => format!("Key {} < {}; move left.", key, node.key()),
            Ordering::Greater => format!("Key {} > {}; move right.", key, node.key()),
        };
        recorder.record(
            tree,
            StepAction::Compare,
            reason,
            &[line::LOOP],
            Highlight::node(current),
        );

        let side = match ordering {
            Ordering::Equal => {
                recorder.record(
                    tree,
                    StepAction::VisitNode,
                    format!("Found node {}; returning result.", node.key()),
                    &[line::FOUND],
                    Highlight::node(current),
                );
                return true;
            }
            Ordering::Less => Side::Left,
            Ordering::Greater => Side::Right,
        };
        let go_line = match side {
            Side::Left => line::GO_LEFT,
            Side::Right => line::GO_RIGHT,
        };

        match node.child(side) {
            Some(child) => {
                recorder.record(
                    tree,
                    StepAction::moving(side),
                    format!("Moving {} to {}.", side, tree.get(child).key()),
                    &[go_line],
                    Highlight::node(child).with_edge(current, child),
                );
                current = child;
            }
            None => {
                recorder.record(
                    tree,
                    StepAction::moving(side),
                    format!(
                        "No {} child from {}; search terminates unsuccessfully.",
                        side,
                        node.key()
                    ),
                    &[go_line, line::NOT_FOUND],
                    Highlight::node(current),
                );
                recorder.record(
                    tree,
                    StepAction::VisitNode,
                    format!("Key {} not found.", key),
                    &[line::NOT_FOUND],
                    Highlight::none(),
                );
                return false;
            }
        }
    }
}
