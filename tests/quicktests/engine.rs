use bst_trace::{DuplicatePolicy, Engine, Step, StepAction, Tree, TreeConfig};
use quickcheck_macros::quickcheck;

use std::collections::{BTreeMap, BTreeSet};

use crate::Op;

/// Every trace is non-empty, indexed 0..n, and every snapshot in it passes
/// every invariant check.
fn well_formed<K>(steps: &[Step<K>]) -> bool {
    !steps.is_empty()
        && steps.iter().enumerate().all(|(i, step)| step.index == i)
        && steps.iter().all(Step::passed_all_checks)
}

fn build(engine: &mut Engine, xs: &[i8]) -> Tree<i8> {
    xs.iter()
        .fold(Tree::new(), |tree, &x| engine.insert(&tree, x).next)
}

/// Applies a set of operations to a tree and a set.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same keys in both, and that every trace along
/// the way was sound.
fn do_ops(ops: &[Op<i8>], engine: &mut Engine, mut bst: Tree<i8>, set: &mut BTreeSet<i8>) -> Option<Tree<i8>> {
    for op in ops {
        let steps = match *op {
            Op::Insert(k) => {
                let result = engine.insert(&bst, k);
                bst = result.next;
                set.insert(k);
                result.steps
            }
            Op::Remove(k) => {
                let result = engine.remove(&bst, &k);
                bst = result.next;
                set.remove(&k);
                result.steps
            }
            Op::Search(k) => {
                let result = engine.search(&bst, k);
                if result.found != set.contains(&k) {
                    return None;
                }
                result.steps
            }
            Op::Traverse(kind) => engine.traverse(&bst, kind),
        };
        if !well_formed(&steps) {
            return None;
        }
    }

    Some(bst)
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut engine = Engine::new();
    let mut set = BTreeSet::new();

    match do_ops(&ops, &mut engine, Tree::new(), &mut set) {
        Some(tree) => tree.keys_in_order().into_iter().eq(set.iter()),
        None => false,
    }
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let mut engine = Engine::new();
    let tree = build(&mut engine, &xs);

    xs.iter().all(|&x| {
        let result = engine.search(&tree, x);
        let last = result.steps.last().unwrap();
        let highlighted = last.highlights.nodes.iter().next().and_then(|&id| tree.node(id));
        result.found
            && last.action == StepAction::VisitNode
            && highlighted.map(|node| *node.key()) == Some(x)
    })
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let mut engine = Engine::new();
    let tree = build(&mut engine, &xs);
    let added: BTreeSet<_> = xs.into_iter().collect();

    nots.into_iter()
        .filter(|x| !added.contains(x))
        .all(|x| !engine.search(&tree, x).found)
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut engine = Engine::new();
    let mut tree = build(&mut engine, &xs);
    for delete in &deletes {
        tree = engine.remove(&tree, delete).next;
    }

    let mut still_present: BTreeSet<_> = xs.into_iter().collect();
    for delete in &deletes {
        still_present.remove(delete);
    }

    deletes.iter().all(|x| tree.find(x).is_none())
        && still_present.iter().all(|x| tree.find(x).is_some())
        && tree.len() == still_present.len()
}

#[quickcheck]
fn insert_then_remove_restores_shape(xs: Vec<i8>, x: i8) -> bool {
    let mut engine = Engine::new();
    let tree = build(&mut engine, &xs);
    if tree.find(&x).is_some() {
        return true;
    }

    let grown = engine.insert(&tree, x).next;
    let shrunk = engine.remove(&grown, &x).next;
    shrunk == tree
}

#[quickcheck]
fn rejected_duplicates_change_nothing(xs: Vec<i8>) -> bool {
    let mut engine = Engine::new();
    let tree = build(&mut engine, &xs);

    xs.iter().all(|&x| engine.insert(&tree, x).next == tree)
}

#[quickcheck]
fn multiset_counts_match(inserts: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut engine = Engine::new();
    let config = TreeConfig::default().with_duplicate_policy(DuplicatePolicy::Multiset);
    let mut tree = Tree::with_config(config);
    let mut counts = BTreeMap::new();

    for &x in &inserts {
        tree = engine.insert(&tree, x).next;
        *counts.entry(x).or_insert(0u32) += 1;
    }
    for x in &deletes {
        let result = engine.remove(&tree, x);
        if !well_formed(&result.steps) {
            return false;
        }
        tree = result.next;
        if let Some(count) = counts.get_mut(x) {
            *count -= 1;
            if *count == 0 {
                counts.remove(x);
            }
        }
    }

    tree.len() == counts.len()
        && counts.iter().all(|(x, &count)| {
            tree.find(x)
                .and_then(|id| tree.node(id))
                .map_or(false, |node| node.multiplicity() == count)
        })
}

#[quickcheck]
fn directional_duplicates_stay_ordered(xs: Vec<i8>, left: bool) -> bool {
    let policy = if left {
        DuplicatePolicy::AllowLeft
    } else {
        DuplicatePolicy::AllowRight
    };
    let mut engine = Engine::new();
    let mut tree = Tree::with_config(TreeConfig::default().with_duplicate_policy(policy));
    for &x in &xs {
        let result = engine.insert(&tree, x);
        if !well_formed(&result.steps) {
            return false;
        }
        tree = result.next;
    }

    let mut sorted = xs.clone();
    sorted.sort_unstable();
    tree.len() == xs.len() && tree.keys_in_order().into_iter().eq(sorted.iter())
}
