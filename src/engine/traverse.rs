use std::collections::VecDeque;
use std::fmt;

use super::{IdMint, TraverseKind};
use crate::pseudocode::traverse as line;
use crate::step::{Highlight, OpKind, Recorder, Step, StepAction};
use crate::tree::{NodeId, Tree};

pub(super) fn traverse<K>(ids: &mut IdMint, tree: &Tree<K>, kind: TraverseKind) -> Vec<Step<K>>
where
    K: fmt::Display,
{
    let mut walk = Walk {
        recorder: Recorder::new(OpKind::Traverse, ids),
        tree,
        visited: Vec::new(),
    };

    match (tree.root(), kind) {
        (None, _) => walk.recorder.record(
            tree,
            StepAction::VisitNode,
            "Tree is empty; traversal yields no nodes.".to_owned(),
            &[line::START],
            Highlight::none(),
        ),
        (Some(root), TraverseKind::Level) => walk.level_order(root),
        (Some(root), kind) => walk.depth_first(root, kind),
    }

    walk.recorder.finish()
}

struct Walk<'e, 't, K> {
    recorder: Recorder<'e, K>,
    tree: &'t Tree<K>,
    /// Visited so far, in order.
    visited: Vec<NodeId>,
}

#[derive(Clone, Copy)]
enum Stage {
    /// Before the left subtree.
    Enter,
    /// Between the subtrees.
    Between,
    /// After the right subtree.
    Leave,
}

impl<K: fmt::Display> Walk<'_, '_, K> {
    /// Pre, in and post order share one explicit stack. Each node passes
    /// through three stages; the traversal kind decides at which one it is
    /// visited.
    fn depth_first(&mut self, root: NodeId, kind: TraverseKind) {
        let tree = self.tree;
        let mut stack = vec![(root, Stage::Enter)];
        while let Some((id, stage)) = stack.pop() {
            let node = tree.get(id);
            match stage {
                Stage::Enter => {
                    if kind == TraverseKind::Pre {
                        self.visit(id, kind, line::PRE);
                    }
                    stack.push((id, Stage::Between));
                    if let Some(left) = node.left() {
                        stack.push((left, Stage::Enter));
                    }
                }
                Stage::Between => {
                    if kind == TraverseKind::In {
                        self.visit(id, kind, line::IN);
                    }
                    stack.push((id, Stage::Leave));
                    if let Some(right) = node.right() {
                        stack.push((right, Stage::Enter));
                    }
                }
                Stage::Leave => {
                    if kind == TraverseKind::Post {
                        self.visit(id, kind, line::POST);
                    }
                }
            }
        }
    }

    fn level_order(&mut self, root: NodeId) {
        let tree = self.tree;
        let mut queue = VecDeque::from([root]);
        self.recorder.record(
            tree,
            StepAction::Enqueue,
            format!(
                "Level-order traversal starts by enqueuing root {}.",
                tree.get(root).key()
            ),
            &[line::ENQUEUE_ROOT],
            Highlight::node(root),
        );

        while let Some(id) = queue.pop_front() {
            let node = tree.get(id);
            self.recorder.record(
                tree,
                StepAction::Dequeue,
                format!("Dequeued {} for visitation.", node.key()),
                &[line::DEQUEUE],
                Highlight::node(id),
            );
            self.visit(id, TraverseKind::Level, line::VISIT);

            for (which, child) in [("left", node.left()), ("right", node.right())] {
                if let Some(child) = child {
                    queue.push_back(child);
                    self.recorder.record(
                        tree,
                        StepAction::Enqueue,
                        format!("Enqueue {} child {}.", which, tree.get(child).key()),
                        &[line::ENQUEUE],
                        Highlight::node(child).with_edge(id, child),
                    );
                }
            }
        }
    }

    fn visit(&mut self, id: NodeId, kind: TraverseKind, code_line: u32) {
        self.visited.push(id);
        self.recorder.record(
            self.tree,
            StepAction::VisitNode,
            format!("Visit {} during {}-order traversal.", self.tree.get(id).key(), kind),
            &[code_line],
            Highlight::node(id).with_order_tag(self.visited.clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::TraverseKind;
    use crate::step::StepAction;
    use crate::tree::{Node, NodeId, Side, Tree, TreeConfig};
    use crate::Engine;

    fn keys(tree: &Tree<i32>, kind: TraverseKind, engine: &mut Engine) -> Vec<i32> {
        let steps = engine.traverse(tree, kind);
        steps
            .iter()
            .filter(|s| s.action == StepAction::VisitNode)
            .map(|s| *s.highlights.order_tag.last().map(|&id| tree.get(id).key()).unwrap())
            .collect()
    }

    fn build(engine: &mut Engine) -> Tree<i32> {
        [8, 3, 10, 1, 6, 14]
            .iter()
            .fold(Tree::new(), |tree, &k| engine.insert(&tree, k).next)
    }

    #[test]
    fn test_orders() {
        let mut engine = Engine::new();
        let tree = build(&mut engine);

        assert_eq!(keys(&tree, TraverseKind::Pre, &mut engine), vec![8, 3, 1, 6, 10, 14]);
        assert_eq!(keys(&tree, TraverseKind::In, &mut engine), vec![1, 3, 6, 8, 10, 14]);
        assert_eq!(keys(&tree, TraverseKind::Post, &mut engine), vec![1, 6, 3, 14, 10, 8]);
        assert_eq!(keys(&tree, TraverseKind::Level, &mut engine), vec![8, 3, 10, 1, 6, 14]);
    }

    #[test]
    fn test_order_tag_grows_by_one() {
        let mut engine = Engine::new();
        let tree = build(&mut engine);
        let steps = engine.traverse(&tree, TraverseKind::In);

        let lengths: Vec<_> = steps.iter().map(|s| s.highlights.order_tag.len()).collect();
        assert_eq!(lengths, vec![1, 2, 3, 4, 5, 6]);
        let last = &steps.last().unwrap().highlights.order_tag;
        for (shorter, step) in steps.iter().zip(1..) {
            assert_eq!(shorter.highlights.order_tag[..], last[..step]);
        }
    }

    #[test]
    fn test_level_order_queue_steps() {
        let mut engine = Engine::new();
        let tree = build(&mut engine);
        let steps = engine.traverse(&tree, TraverseKind::Level);

        let count = |action| steps.iter().filter(|s| s.action == action).count();
        assert_eq!(count(StepAction::Enqueue), 6);
        assert_eq!(count(StepAction::Dequeue), 6);
        assert_eq!(count(StepAction::VisitNode), 6);
        assert_eq!(steps[0].action, StepAction::Enqueue);
    }

    #[test]
    fn test_degenerate_tree() {
        let mut engine = Engine::new();
        let mut tree = Tree::with_config(TreeConfig::default().with_max_nodes(usize::MAX));
        for k in 0..2_000 {
            tree.put(Node::new(NodeId::new(k as u64 + 1), k, None));
        }
        tree.set_root(Some(NodeId::new(1)));
        for raw in 1..2_000 {
            tree.link(NodeId::new(raw), Side::Right, Some(NodeId::new(raw + 1)));
        }

        let descending: Vec<_> = (0..2_000).rev().collect();
        assert_eq!(keys(&tree, TraverseKind::Post, &mut engine), descending);
        assert_eq!(keys(&tree, TraverseKind::Pre, &mut engine), (0..2_000).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_traversal() {
        let mut engine = Engine::new();
        let steps = engine.traverse(&Tree::<i32>::new(), TraverseKind::Post);

        assert_eq!(steps.len(), 1);
        assert!(steps[0].highlights.order_tag.is_empty());
    }
}
