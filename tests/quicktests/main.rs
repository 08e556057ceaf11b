mod engine;

use bst_trace::TraverseKind;
use quickcheck::{Arbitrary, Gen};

/// An enum for the various kinds of "things" to do to
/// binary search trees in a quicktest.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Op<K> {
    /// Insert the K into the tree
    Insert(K),
    /// Remove the K from the tree
    Remove(K),
    /// Search for the K
    Search(K),
    /// Walk the whole tree
    Traverse(TraverseKind),
}

impl<K> Arbitrary for Op<K>
where
    K: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 1, 2, 3]).unwrap() {
            0 => Op::Insert(K::arbitrary(g)),
            1 => Op::Remove(K::arbitrary(g)),
            2 => Op::Search(K::arbitrary(g)),
            3 => Op::Traverse(
                *g.choose(&[
                    TraverseKind::Pre,
                    TraverseKind::In,
                    TraverseKind::Post,
                    TraverseKind::Level,
                ])
                .unwrap(),
            ),
            _ => unreachable!(),
        }
    }
}
