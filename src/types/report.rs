//! Execution report for a market execution against the book.

use crate::types::{Cost, Quantity};

/// Summary of one `execute_market` call.
///
/// `cost` is the total notional paid for the units actually filled. When
/// the book runs out of liquidity `filled < requested`; this is a normal
/// outcome, not an error.
///
/// ## Example
///
/// ```
/// use rank_book::OrderBook;
///
/// let mut book = OrderBook::new();
/// book.add_order(7, 4).unwrap();
///
/// let report = book.execute_market(10);
/// assert_eq!(report.cost, 28);
/// assert!(report.is_partial());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionReport {
    /// Quantity the caller asked for
    pub requested: Quantity,

    /// Quantity actually taken from the book
    pub filled: Quantity,

    /// Sum of `price * units_taken` over every touched order
    pub cost: Cost,

    /// Number of resting orders exhausted and removed
    pub orders_consumed: usize,
}

impl ExecutionReport {
    /// An empty report for a request of `requested` units.
    pub fn new(requested: Quantity) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    /// True if the book could not supply the full request.
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.filled < self.requested
    }

    /// Quantity that could not be filled.
    #[inline]
    pub fn unfilled(&self) -> Quantity {
        self.requested - self.filled
    }

    /// Volume-weighted average price of the fill, truncated to whole ticks.
    pub fn average_price(&self) -> Option<Cost> {
        if self.filled == 0 {
            return None;
        }
        Some(self.cost / Cost::from(self.filled))
    }
}
