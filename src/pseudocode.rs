//! Reference pseudocode for each operation. Steps point into these listings
//! through [`Step::code_lines`](crate::Step::code_lines), 1-based.

use crate::step::OpKind;

/// A titled pseudocode listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    /// The operation this listing describes.
    pub op: OpKind,
    /// Heading shown above the listing.
    pub title: &'static str,
    /// The lines; line `n` is `lines[n - 1]`.
    pub lines: &'static [&'static str],
}

impl Listing {
    /// The text of 1-based line `n`.
    pub fn line(&self, n: u32) -> Option<&'static str> {
        let index = usize::try_from(n).ok()?.checked_sub(1)?;
        self.lines.get(index).copied()
    }
}

const INSERT: Listing = Listing {
    op: OpKind::Insert,
    title: "INSERT(x)",
    lines: &[
        "INSERT(x):",
        "  if size ≥ capacity: return",
        "  if root = ∅: root ← new(x); return",
        "  cur ← root",
        "  loop:",
        "    if x < cur.key:",
        "      if cur.left = ∅: break",
        "      cur ← cur.left",
        "    else if x > cur.key:",
        "      if cur.right = ∅: break",
        "      cur ← cur.right",
        "    else: apply duplicate policy",
        "  attach new(x) below cur",
    ],
};

const SEARCH: Listing = Listing {
    op: OpKind::Search,
    title: "SEARCH(x)",
    lines: &[
        "SEARCH(x):",
        "  cur ← root",
        "  while cur ≠ ∅:",
        "    if x = cur.key: return cur",
        "    if x < cur.key: cur ← cur.left",
        "    else: cur ← cur.right",
        "  return ∅",
    ],
};

const DELETE: Listing = Listing {
    op: OpKind::Delete,
    title: "DELETE(x)",
    lines: &[
        "DELETE(x):",
        "  node ← SEARCH(x)",
        "  if node = ∅: return",
        "  if node.count > 1: node.count ← node.count − 1; return",
        "  if node.left = ∅:",
        "    TRANSPLANT(node, node.right)",
        "  else if node.right = ∅:",
        "    TRANSPLANT(node, node.left)",
        "  else:",
        "    succ ← MIN(node.right)",
        "    if succ.parent ≠ node:",
        "      TRANSPLANT(succ, succ.right)",
        "      succ.right ← node.right",
        "    TRANSPLANT(node, succ)",
        "    succ.left ← node.left",
        "  free(node)",
    ],
};

const TRAVERSE: Listing = Listing {
    op: OpKind::Traverse,
    title: "TRAVERSE(kind)",
    lines: &[
        "TRAVERSE(kind):",
        "  PRE:  visit, recurse left, recurse right",
        "  IN:   recurse left, visit, recurse right",
        "  POST: recurse left, recurse right, visit",
        "  LEVEL: enqueue root",
        "    while queue ≠ ∅:",
        "      node ← dequeue",
        "      visit node",
        "      enqueue children if present",
    ],
};

/// The listing for `op`.
pub fn listing(op: OpKind) -> &'static Listing {
    match op {
        OpKind::Insert => &INSERT,
        OpKind::Delete => &DELETE,
        OpKind::Search => &SEARCH,
        OpKind::Traverse => &TRAVERSE,
    }
}

pub(crate) mod insert {
    pub(crate) const CAPACITY: u32 = 2;
    pub(crate) const EMPTY: u32 = 3;
    pub(crate) const COMPARE: u32 = 5;
    pub(crate) const GO_LEFT: u32 = 8;
    pub(crate) const GO_RIGHT: u32 = 11;
    pub(crate) const DUPLICATE: u32 = 12;
    pub(crate) const ATTACH: u32 = 13;
}

pub(crate) mod search {
    pub(crate) const START: u32 = 2;
    pub(crate) const LOOP: u32 = 3;
    pub(crate) const FOUND: u32 = 4;
    pub(crate) const GO_LEFT: u32 = 5;
    pub(crate) const GO_RIGHT: u32 = 6;
    pub(crate) const NOT_FOUND: u32 = 7;
}

pub(crate) mod delete {
    pub(crate) const SEARCH: u32 = 2;
    pub(crate) const NOT_FOUND: u32 = 3;
    pub(crate) const MULTISET: u32 = 4;
    pub(crate) const NO_LEFT: u32 = 6;
    pub(crate) const NO_RIGHT: u32 = 8;
    pub(crate) const SUCCESSOR: u32 = 10;
    pub(crate) const SUCCESSOR_DEEP: u32 = 11;
    pub(crate) const LIFT_SUCCESSOR: u32 = 12;
    pub(crate) const REPLACE: u32 = 14;
    pub(crate) const ADOPT_LEFT: u32 = 15;
    pub(crate) const FREE: u32 = 16;
}

pub(crate) mod traverse {
    pub(crate) const START: u32 = 1;
    pub(crate) const PRE: u32 = 2;
    pub(crate) const IN: u32 = 3;
    pub(crate) const POST: u32 = 4;
    pub(crate) const ENQUEUE_ROOT: u32 = 5;
    pub(crate) const DEQUEUE: u32 = 7;
    pub(crate) const VISIT: u32 = 8;
    pub(crate) const ENQUEUE: u32 = 9;
}
