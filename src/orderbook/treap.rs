//! Order-statistics treap keyed by `(price, sequence)`.
//!
//! ## Architecture
//!
//! - **Slab arena**: every node lives in a `Slab<TreeNode>`; children and
//!   the root are slab keys. Removing a node frees its slot immediately.
//! - **Random priorities**: drawn from a seeded `ChaCha8Rng` owned by the
//!   tree. The same seed and the same operations give the same tree shape.
//! - **Subtree sizes**: every node counts its subtree, so rank lookups
//!   descend by comparing the rank with the left subtree size.
//!
//! ## Invariants
//!
//! After every mutation:
//! 1. In-order traversal is strictly increasing in the side's key order
//! 2. Every parent's priority is >= its children's priorities
//! 3. `size == 1 + size(left) + size(right)` at every node
//!
//! All operations are iterative (explicit path stacks), so a degenerate
//! shape cannot exhaust the call stack.
//!
//! ## Performance
//!
//! | Operation | Complexity (expected) |
//! |-----------|------------|
//! | insert | O(log n) |
//! | get_by_rank | O(log n) |
//! | remove_by_rank | O(log n) |
//! | remove_by_key | O(log n) |
//! | len | O(1) |
//! | split_off / append | O(log n) + O(moved nodes) |

use std::cmp::Ordering;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use slab::Slab;

use crate::orderbook::node::{attach, size_of, update_size, Dir, NodeId, TreeNode};
use crate::types::{
    BookError, InvariantViolation, OrderKey, Price, Rank, RestingOrder, Sequence, Side,
};

/// Order-statistics treap over resting orders.
///
/// ## Example
///
/// ```
/// use rank_book::orderbook::OrderTree;
/// use rank_book::types::{RestingOrder, Side};
///
/// let mut tree = OrderTree::new(Side::Ask, 7);
/// tree.insert(RestingOrder::new(12, 1, 0));
/// tree.insert(RestingOrder::new(10, 1, 1));
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.get_by_rank(0).map(|o| o.price), Some(10));
/// assert!(tree.get_by_rank(2).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct OrderTree {
    /// Node arena
    nodes: Slab<TreeNode>,

    /// Root node, `None` when empty
    root: Option<NodeId>,

    /// Price direction that ranks first
    side: Side,

    /// Priority source
    rng: ChaCha8Rng,
}

impl OrderTree {
    /// Create an empty tree with priorities drawn from `seed`.
    pub fn new(side: Side, seed: u64) -> Self {
        Self::with_rng(side, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Create an empty tree with an explicit priority source.
    pub fn with_rng(side: Side, rng: ChaCha8Rng) -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
            side,
            rng,
        }
    }

    /// Create an empty tree with `capacity` pre-allocated node slots.
    pub fn with_capacity(side: Side, seed: u64, capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            ..Self::new(side, seed)
        }
    }

    // ========================================================================
    // Size
    // ========================================================================

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Number of resting orders. O(1): reads the root's subtree size.
    #[inline]
    pub fn len(&self) -> usize {
        size_of(&self.nodes, self.root)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Pre-allocated node slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Length of the longest root-to-leaf path (0 when empty).
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[id];
            stack.extend(node.left.map(|c| (c, depth + 1)));
            stack.extend(node.right.map(|c| (c, depth + 1)));
        }
        height
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert an order at the position given by its `(price, sequence)` key.
    ///
    /// The node is attached as a leaf and rotated up while its priority
    /// beats its parent's. Keys must be unique within the tree.
    ///
    /// # Returns
    ///
    /// The slab key of the new node
    pub fn insert(&mut self, order: RestingOrder) -> NodeId {
        let key = order.key();
        let priority = self.rng.gen::<u64>();
        let id = self.nodes.insert(TreeNode::new(order, priority));

        // Every ancestor gains one node
        let mut path: Vec<(NodeId, Dir)> = Vec::new();
        let mut cur = self.root;
        while let Some(n) = cur {
            let dir = if self.side.precedes(&key, &self.nodes[n].key()) {
                Dir::Left
            } else {
                Dir::Right
            };
            self.nodes[n].size += 1;
            path.push((n, dir));
            cur = self.nodes[n].child(dir);
        }
        attach(&mut self.nodes, &mut self.root, path.last().copied(), Some(id));

        while let Some((parent, dir)) = path.pop() {
            if self.nodes[id].priority <= self.nodes[parent].priority {
                break;
            }
            self.rotate_up(parent, dir);
            attach(&mut self.nodes, &mut self.root, path.last().copied(), Some(id));
        }

        id
    }

    /// Rotate the `dir` child of `parent` above it and return the child.
    fn rotate_up(&mut self, parent: NodeId, dir: Dir) -> NodeId {
        let Some(child) = self.nodes[parent].child(dir) else {
            return parent;
        };
        let inner = self.nodes[child].child(dir.opposite());
        self.nodes[parent].set_child(dir, inner);
        self.nodes[child].set_child(dir.opposite(), Some(parent));
        update_size(&mut self.nodes, parent);
        update_size(&mut self.nodes, child);
        child
    }

    // ========================================================================
    // Split / Merge
    // ========================================================================

    /// Partition the subtree at `root` into keys `<= key` and keys `> key`.
    pub(crate) fn split(
        &mut self,
        root: Option<NodeId>,
        key: &OrderKey,
    ) -> (Option<NodeId>, Option<NodeId>) {
        let side = self.side;
        self.split_where(root, |k| side.compare(k, key) != Ordering::Greater)
    }

    /// Partition the subtree at `root`: nodes whose key satisfies
    /// `goes_left` form the first tree, the rest the second.
    ///
    /// `goes_left` must be monotone over the key order (true for a prefix).
    fn split_where<F>(&mut self, root: Option<NodeId>, goes_left: F) -> (Option<NodeId>, Option<NodeId>)
    where
        F: Fn(&OrderKey) -> bool,
    {
        let mut left = None;
        let mut right = None;
        // Edge where the next node of each result hangs
        let mut left_slot: Option<(NodeId, Dir)> = None;
        let mut right_slot: Option<(NodeId, Dir)> = None;
        let mut path = Vec::new();

        let mut cur = root;
        while let Some(n) = cur {
            path.push(n);
            if goes_left(&self.nodes[n].key()) {
                attach(&mut self.nodes, &mut left, left_slot, Some(n));
                left_slot = Some((n, Dir::Right));
                cur = self.nodes[n].right;
            } else {
                attach(&mut self.nodes, &mut right, right_slot, Some(n));
                right_slot = Some((n, Dir::Left));
                cur = self.nodes[n].left;
            }
        }
        attach(&mut self.nodes, &mut left, left_slot, None);
        attach(&mut self.nodes, &mut right, right_slot, None);

        // Later path entries sit below earlier ones in both results
        for &n in path.iter().rev() {
            update_size(&mut self.nodes, n);
        }

        (left, right)
    }

    /// Concatenate two subtrees where every key in `left` ranks before every
    /// key in `right`. The higher-priority root always stays on top.
    pub(crate) fn merge(&mut self, left: Option<NodeId>, right: Option<NodeId>) -> Option<NodeId> {
        let mut root = None;
        let mut slot: Option<(NodeId, Dir)> = None;
        let mut path = Vec::new();

        let (mut a, mut b) = (left, right);
        loop {
            match (a, b) {
                (Some(l), Some(r)) => {
                    if self.nodes[l].priority > self.nodes[r].priority {
                        attach(&mut self.nodes, &mut root, slot, Some(l));
                        path.push(l);
                        slot = Some((l, Dir::Right));
                        a = self.nodes[l].right;
                    } else {
                        attach(&mut self.nodes, &mut root, slot, Some(r));
                        path.push(r);
                        slot = Some((r, Dir::Left));
                        b = self.nodes[r].left;
                    }
                }
                (rest, None) | (None, rest) => {
                    attach(&mut self.nodes, &mut root, slot, rest);
                    break;
                }
            }
        }

        for &n in path.iter().rev() {
            update_size(&mut self.nodes, n);
        }

        root
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove the order with exactly this key.
    ///
    /// # Returns
    ///
    /// The removed order, or None (tree unchanged) if the key is absent
    pub fn remove_by_key(&mut self, price: Price, sequence: Sequence) -> Option<RestingOrder> {
        let key = OrderKey::new(price, sequence);
        let side = self.side;

        let (at_most, after) = self.split(self.root, &key);
        let (before, matched) = self.split_where(at_most, |k| side.precedes(k, &key));

        let Some(id) = matched else {
            self.root = self.merge(before, after);
            return None;
        };

        let node = self.nodes.remove(id);
        let rest = self.merge(node.left, node.right);
        let lower = self.merge(before, rest);
        self.root = self.merge(lower, after);

        Some(node.order)
    }

    /// Remove the order at `rank` (0 = best).
    ///
    /// # Returns
    ///
    /// The removed order, or None (tree unchanged) if `rank >= len()`
    pub fn remove_by_rank(&mut self, rank: Rank) -> Option<RestingOrder> {
        if rank >= self.len() {
            return None;
        }

        let mut path = Vec::new();
        let mut slot: Option<(NodeId, Dir)> = None;
        let mut rank = rank;
        let mut cur = self.root;

        while let Some(n) = cur {
            let left_size = size_of(&self.nodes, self.nodes[n].left);
            match rank.cmp(&left_size) {
                Ordering::Less => {
                    path.push(n);
                    slot = Some((n, Dir::Left));
                    cur = self.nodes[n].left;
                }
                Ordering::Equal => {
                    let node = self.nodes.remove(n);
                    let merged = self.merge(node.left, node.right);
                    attach(&mut self.nodes, &mut self.root, slot, merged);
                    for &p in &path {
                        self.nodes[p].size -= 1;
                    }
                    return Some(node.order);
                }
                Ordering::Greater => {
                    rank -= left_size + 1;
                    path.push(n);
                    slot = Some((n, Dir::Right));
                    cur = self.nodes[n].right;
                }
            }
        }

        None
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    fn find_rank(&self, rank: Rank) -> Option<NodeId> {
        let mut rank = rank;
        let mut cur = self.root;
        while let Some(n) = cur {
            let left_size = size_of(&self.nodes, self.nodes[n].left);
            match rank.cmp(&left_size) {
                Ordering::Less => cur = self.nodes[n].left,
                Ordering::Equal => return Some(n),
                Ordering::Greater => {
                    rank -= left_size + 1;
                    cur = self.nodes[n].right;
                }
            }
        }
        None
    }

    /// Order at `rank` (0 = best), or None if out of range.
    pub fn get_by_rank(&self, rank: Rank) -> Option<&RestingOrder> {
        self.find_rank(rank).map(|id| &self.nodes[id].order)
    }

    /// Mutable access for in-place fills. Callers must not change the key.
    pub(crate) fn get_by_rank_mut(&mut self, rank: Rank) -> Option<&mut RestingOrder> {
        self.find_rank(rank).map(|id| &mut self.nodes[id].order)
    }

    /// Rank of the order with exactly this key, if present.
    pub fn rank_of(&self, price: Price, sequence: Sequence) -> Option<Rank> {
        let key = OrderKey::new(price, sequence);
        let mut before = 0;
        let mut cur = self.root;
        while let Some(n) = cur {
            let node = &self.nodes[n];
            match self.side.compare(&key, &node.key()) {
                Ordering::Less => cur = node.left,
                Ordering::Equal => return Some(before + size_of(&self.nodes, node.left)),
                Ordering::Greater => {
                    before += size_of(&self.nodes, node.left) + 1;
                    cur = node.right;
                }
            }
        }
        None
    }

    /// Best order (rank 0).
    pub fn first(&self) -> Option<&RestingOrder> {
        let mut cur = self.root?;
        while let Some(left) = self.nodes[cur].left {
            cur = left;
        }
        Some(&self.nodes[cur].order)
    }

    /// Worst order (rank `len() - 1`).
    pub fn last(&self) -> Option<&RestingOrder> {
        let mut cur = self.root?;
        while let Some(right) = self.nodes[cur].right {
            cur = right;
        }
        Some(&self.nodes[cur].order)
    }

    /// Iterate orders best-first.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.nodes, self.root)
    }

    // ========================================================================
    // Subtree surgery
    // ========================================================================

    /// Move every order ranking strictly after `(price, sequence)` into a new
    /// tree and return it. The new tree draws its priorities from a seed
    /// taken from this tree's source.
    pub fn split_off(&mut self, price: Price, sequence: Sequence) -> OrderTree {
        let key = OrderKey::new(price, sequence);
        let (kept, moved) = self.split(self.root, &key);
        self.root = kept;

        let mut other = OrderTree::new(self.side, self.rng.gen());
        other.root = other.adopt(&mut self.nodes, moved);
        other
    }

    /// Move every order of `other` to the end of this tree.
    ///
    /// Every key of `other` must rank after every key of `self`; on error
    /// both trees are left untouched. On success `other` is empty.
    pub fn append(&mut self, other: &mut OrderTree) -> Result<(), BookError> {
        if other.is_empty() {
            return Ok(());
        }
        if self.side != other.side {
            return Err(BookError::SideMismatch {
                this: self.side,
                other: other.side,
            });
        }
        if let (Some(last), Some(first)) = (self.last(), other.first()) {
            if !self.side.precedes(&last.key(), &first.key()) {
                return Err(BookError::OverlappingKeys {
                    sequence: first.sequence,
                });
            }
        }

        let moved = other.root.take();
        let adopted = self.adopt(&mut other.nodes, moved);
        self.root = self.merge(self.root, adopted);
        Ok(())
    }

    /// Copy the subtree at `root` out of `source` into this arena, keeping
    /// its shape, and free the source slots.
    fn adopt(&mut self, source: &mut Slab<TreeNode>, root: Option<NodeId>) -> Option<NodeId> {
        let mut new_root = None;
        let mut stack: Vec<(NodeId, Option<(NodeId, Dir)>)> =
            root.map(|r| (r, None)).into_iter().collect();

        while let Some((src, slot)) = stack.pop() {
            let mut node = source.remove(src);
            let left = node.left.take();
            let right = node.right.take();
            let id = self.nodes.insert(node);
            attach(&mut self.nodes, &mut new_root, slot, Some(id));
            stack.extend(left.map(|l| (l, Some((id, Dir::Left)))));
            stack.extend(right.map(|r| (r, Some((id, Dir::Right)))));
        }

        new_root
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check key order, heap order and subtree sizes across the whole tree.
    ///
    /// # Returns
    ///
    /// The first violation found, walking best-first
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut prev: Option<OrderKey> = None;
        let mut reachable = 0;

        for (rank, (id, node)) in InOrder::new(&self.nodes, self.root).enumerate() {
            reachable += 1;

            if let Some(prev) = prev {
                if !self.side.precedes(&prev, &node.key()) {
                    return Err(InvariantViolation::KeyOrder { rank });
                }
            }
            prev = Some(node.key());

            for child in [node.left, node.right].into_iter().flatten() {
                if self.nodes[child].priority > node.priority {
                    return Err(InvariantViolation::HeapOrder { node: id });
                }
            }

            let actual = 1 + size_of(&self.nodes, node.left) + size_of(&self.nodes, node.right);
            if node.size != actual {
                return Err(InvariantViolation::SubtreeSize {
                    node: id,
                    recorded: node.size,
                    actual,
                });
            }
        }

        if reachable != self.nodes.len() {
            return Err(InvariantViolation::NodeCount {
                reachable,
                stored: self.nodes.len(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// In-order walk yielding slab keys with their nodes.
struct InOrder<'a> {
    nodes: &'a Slab<TreeNode>,
    stack: Vec<NodeId>,
    cur: Option<NodeId>,
}

impl<'a> InOrder<'a> {
    fn new(nodes: &'a Slab<TreeNode>, root: Option<NodeId>) -> Self {
        Self {
            nodes,
            stack: Vec::new(),
            cur: root,
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(n) = self.cur {
            self.stack.push(n);
            self.cur = self.nodes[n].left;
        }
        let id = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[id];
        self.cur = node.right;
        Some((id, node))
    }
}

/// Best-first iterator over resting orders.
pub struct Iter<'a> {
    inner: InOrder<'a>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    fn new(nodes: &'a Slab<TreeNode>, root: Option<NodeId>) -> Self {
        Self {
            inner: InOrder::new(nodes, root),
            remaining: size_of(nodes, root),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a RestingOrder;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, node) = self.inner.next()?;
        self.remaining -= 1;
        Some(&node.order)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a OrderTree {
    type Item = &'a RestingOrder;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
