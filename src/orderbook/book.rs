//! Single-sided order book on top of the order-statistics treap.
//!
//! ## Operations
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `add_order(price, qty)` | new resting order at its natural rank |
//! | `cancel_at_rank(rank)` | removes the order at `rank`; out of range is a no-op |
//! | `execute_market(qty)` | walks the book from rank 0, returns the cost |
//!
//! Ranks are 0-based in best-first order. On the default ask side the best
//! order is the lowest price, earliest inserted first.
//!
//! ## Example
//!
//! ```
//! use rank_book::OrderBook;
//!
//! let mut book = OrderBook::new();
//! book.add_order(10, 5).unwrap();
//! book.add_order(10, 3).unwrap();
//!
//! let report = book.execute_market(6);
//! assert_eq!(report.cost, 60);
//!
//! let best = book.get_by_rank(0).unwrap();
//! assert_eq!((best.price, best.quantity), (10, 2));
//! ```

use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::orderbook::treap::{Iter, OrderTree};
use crate::types::{
    BookError, Cost, ExecutionReport, InvariantViolation, Price, Quantity, Rank, RestingOrder,
    Sequence, Side,
};

/// Seed used by [`OrderBook::new`].
pub const DEFAULT_SEED: u64 = 0xDEAD_BEEF;

/// Whether the book holds any orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookState {
    Empty,
    NonEmpty,
}

/// Price-time priority book for one side of a market.
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Resting orders, ranked best-first
    tree: OrderTree,

    /// Sequence assigned to the next accepted order
    next_sequence: Sequence,

    /// Sum of resting quantities
    resting_quantity: u128,

    /// Total cost paid across all executions
    traded_cost: Cost,

    /// Total quantity filled across all executions
    traded_quantity: u128,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Create an empty ask-side book with the default seed
    pub fn new() -> Self {
        Self::with_side(Side::Ask, DEFAULT_SEED)
    }

    /// Create an empty ask-side book whose tree priorities come from `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::with_side(Side::Ask, seed)
    }

    pub fn with_side(side: Side, seed: u64) -> Self {
        Self::from_tree(OrderTree::new(side, seed))
    }

    /// Create a book with `capacity` pre-allocated order slots
    ///
    /// # Example
    ///
    /// ```
    /// use rank_book::{OrderBook, Side};
    ///
    /// let book = OrderBook::with_capacity(Side::Bid, 1, 10_000);
    /// assert!(book.capacity() >= 10_000);
    /// ```
    pub fn with_capacity(side: Side, seed: u64, capacity: usize) -> Self {
        Self::from_tree(OrderTree::with_capacity(side, seed, capacity))
    }

    fn from_tree(tree: OrderTree) -> Self {
        Self {
            tree,
            next_sequence: 0,
            resting_quantity: 0,
            traded_cost: 0,
            traded_quantity: 0,
        }
    }

    // ========================================================================
    // Core operations
    // ========================================================================

    /// Add a resting order.
    ///
    /// # Returns
    ///
    /// The sequence assigned to the order
    ///
    /// # Errors
    ///
    /// `BookError::InvalidQuantity` if `quantity` is zero. Nothing is
    /// inserted and no sequence number is consumed.
    pub fn add_order(&mut self, price: Price, quantity: Quantity) -> Result<Sequence, BookError> {
        if quantity == 0 {
            debug!(price, "rejected order with zero quantity");
            return Err(BookError::InvalidQuantity);
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.tree.insert(RestingOrder::new(price, quantity, sequence));
        self.resting_quantity += u128::from(quantity);

        trace!(price, quantity, sequence, "order added");
        Ok(sequence)
    }

    /// Cancel the order at `rank`. Every order behind it moves up one rank.
    ///
    /// # Returns
    ///
    /// The canceled order, or None if `rank >= len()` (book unchanged)
    pub fn cancel_at_rank(&mut self, rank: Rank) -> Option<RestingOrder> {
        let Some(order) = self.tree.remove_by_rank(rank) else {
            debug!(rank, len = self.len(), "cancel rank out of range");
            return None;
        };

        self.resting_quantity -= u128::from(order.quantity);
        trace!(rank, price = order.price, sequence = order.sequence, "order canceled");
        Some(order)
    }

    /// Buy up to `quantity` units starting from the best order.
    ///
    /// Each step takes `min(remaining, best.quantity)` at the best order's
    /// price and removes the order once it is exhausted. Stops when the
    /// request is filled or the book is empty; running out of liquidity
    /// simply yields a smaller `filled` and `cost`.
    pub fn execute_market(&mut self, quantity: Quantity) -> ExecutionReport {
        let mut report = ExecutionReport::new(quantity);
        let mut remaining = quantity;

        while remaining > 0 {
            let Some(best) = self.tree.get_by_rank_mut(0) else {
                break;
            };

            let taken = best.fill(remaining);
            report.cost += best.cost_of(taken);
            report.filled += taken;
            remaining -= taken;

            if best.is_filled() {
                self.tree.remove_by_rank(0);
                report.orders_consumed += 1;
            }
        }

        self.resting_quantity -= u128::from(report.filled);
        self.traded_quantity += u128::from(report.filled);
        self.traded_cost += report.cost;

        trace!(
            requested = report.requested,
            filled = report.filled,
            cost = %report.cost,
            consumed = report.orders_consumed,
            "market executed"
        );
        report
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Order at `rank` (0 = best), or None if out of range
    #[inline]
    pub fn get_by_rank(&self, rank: Rank) -> Option<&RestingOrder> {
        self.tree.get_by_rank(rank)
    }

    /// The best resting order
    #[inline]
    pub fn best(&self) -> Option<&RestingOrder> {
        self.tree.first()
    }

    /// Number of resting orders
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[inline]
    pub fn state(&self) -> BookState {
        if self.is_empty() {
            BookState::Empty
        } else {
            BookState::NonEmpty
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.tree.side()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Sequence the next accepted order will receive
    #[inline]
    pub fn next_sequence(&self) -> Sequence {
        self.next_sequence
    }

    /// Liquidity currently available to `execute_market`
    #[inline]
    pub fn total_quantity(&self) -> u128 {
        self.resting_quantity
    }

    /// Cumulative cost across every execution so far
    #[inline]
    pub fn traded_cost(&self) -> Cost {
        self.traded_cost
    }

    /// Cumulative filled quantity across every execution so far
    #[inline]
    pub fn traded_quantity(&self) -> u128 {
        self.traded_quantity
    }

    /// Iterate resting orders best-first
    pub fn orders(&self) -> Iter<'_> {
        self.tree.iter()
    }

    /// The underlying tree
    pub fn tree(&self) -> &OrderTree {
        &self.tree
    }

    // ========================================================================
    // Integrity
    // ========================================================================

    /// Check tree invariants plus the book's own bookkeeping.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.tree.validate()?;

        let mut actual: u128 = 0;
        for order in self.tree.iter() {
            if order.quantity == 0 {
                return Err(InvariantViolation::EmptyOrder {
                    sequence: order.sequence,
                });
            }
            actual += u128::from(order.quantity);
        }

        if actual != self.resting_quantity {
            return Err(InvariantViolation::RestingQuantity {
                cached: self.resting_quantity,
                actual,
            });
        }

        Ok(())
    }

    /// SHA-256 over the SSZ encoding of every resting order, best-first.
    ///
    /// Two books with the same resting orders in the same rank order have
    /// the same root, whatever their tree shapes.
    pub fn state_root(&self) -> Result<[u8; 32], BookError> {
        let mut hasher = Sha256::new();
        for order in self.tree.iter() {
            let bytes =
                ssz_rs::serialize(order).map_err(|e| BookError::Encoding(format!("{e:?}")))?;
            hasher.update(&bytes);
        }
        Ok(hasher.finalize().into())
    }

    /// Hex form of [`state_root`](Self::state_root) for logs.
    pub fn state_root_hex(&self) -> Result<String, BookError> {
        self.state_root().map(hex::encode)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
