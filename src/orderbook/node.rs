//! Tree node for slab-based treap storage.
//!
//! ## Design
//!
//! `TreeNode` wraps a `RestingOrder` with the treap bookkeeping: a random
//! heap priority, the size of the subtree rooted here, and the slab keys of
//! its two children. Children are indices, never references, so a node can
//! only be reached through its parent edge.
//!
//! ## Slab Integration
//!
//! Per official slab docs (https://docs.rs/slab/0.4.11):
//! - Keys are `usize` values returned by `slab.insert()`
//! - Keys may be reused after `slab.remove()`
//! - O(1) insert, remove, and lookup

use slab::Slab;

use crate::types::{OrderKey, RestingOrder};

/// Slab key of a tree node.
pub type NodeId = usize;

/// Treap node stored in the slab.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// The resting order carried by this node
    pub order: RestingOrder,

    /// Heap priority; a parent's priority is >= both children's
    pub priority: u64,

    /// Number of nodes in the subtree rooted here (including this one)
    pub size: usize,

    /// Left child (keys ranking before this one)
    pub left: Option<NodeId>,

    /// Right child (keys ranking after this one)
    pub right: Option<NodeId>,
}

impl TreeNode {
    /// Create a detached leaf node.
    ///
    /// # Example
    ///
    /// ```
    /// use rank_book::orderbook::TreeNode;
    /// use rank_book::types::RestingOrder;
    ///
    /// let node = TreeNode::new(RestingOrder::new(10, 5, 0), 42);
    ///
    /// assert!(node.is_leaf());
    /// assert_eq!(node.size, 1);
    /// ```
    #[inline]
    pub fn new(order: RestingOrder, priority: u64) -> Self {
        Self {
            order,
            priority,
            size: 1,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub fn key(&self) -> OrderKey {
        self.order.key()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Child on the given side.
    #[inline]
    pub fn child(&self, dir: Dir) -> Option<NodeId> {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    /// Replace the child on the given side.
    #[inline]
    pub fn set_child(&mut self, dir: Dir, child: Option<NodeId>) {
        match dir {
            Dir::Left => self.left = child,
            Dir::Right => self.right = child,
        }
    }
}

/// Which child edge a descent followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Left,
    Right,
}

impl Dir {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

// ============================================================================
// Slab helpers
// ============================================================================

/// Subtree size of an optional node (0 for an empty subtree).
#[inline]
pub(crate) fn size_of(nodes: &Slab<TreeNode>, node: Option<NodeId>) -> usize {
    node.map_or(0, |id| nodes[id].size)
}

/// Recompute `size` of `id` from its children.
#[inline]
pub(crate) fn update_size(nodes: &mut Slab<TreeNode>, id: NodeId) {
    let size = 1 + size_of(nodes, nodes[id].left) + size_of(nodes, nodes[id].right);
    nodes[id].size = size;
}

/// Point the edge `slot` at `child`. `None` means the slot is the root.
#[inline]
pub(crate) fn attach(
    nodes: &mut Slab<TreeNode>,
    root: &mut Option<NodeId>,
    slot: Option<(NodeId, Dir)>,
    child: Option<NodeId>,
) {
    match slot {
        Some((parent, dir)) => nodes[parent].set_child(dir, child),
        None => *root = child,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
