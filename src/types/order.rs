//! Resting order types for the rank book.
//!
//! ## SSZ Serialization
//!
//! `RestingOrder` derives `SimpleSerialize` from ssz_rs so the book can be
//! fingerprinted deterministically (see `OrderBook::state_root`).
//! Per the SSZ spec (ethereum.org):
//! - Basic types (u64): Direct little-endian encoding
//! - Fixed-size composites: Concatenated little-endian fields
//!
//! Scalar aliases used across the crate live here too.

use ssz_rs::prelude::*;

use crate::types::OrderKey;

/// Price in integer ticks.
pub type Price = u64;

/// Tradable units.
pub type Quantity = u64;

/// Insertion sequence number, unique per book.
pub type Sequence = u64;

/// 0-based position of an order in best-first order.
pub type Rank = usize;

/// Accumulated notional (price x quantity). Wide enough that no realistic
/// book can overflow it.
pub type Cost = u128;

// ============================================================================
// RestingOrder
// ============================================================================

/// An order resting in the book.
///
/// `quantity` is the remaining tradable amount. It is strictly positive
/// while the order is in the book; the book removes the order as soon as a
/// fill brings it to zero.
///
/// ## SSZ Layout
///
/// Fixed-size container, 24 bytes (price + quantity + sequence).
///
/// ## Example
///
/// ```
/// use rank_book::types::RestingOrder;
///
/// let mut order = RestingOrder::new(10, 5, 0);
/// assert_eq!(order.fill(3), 3);
/// assert_eq!(order.quantity, 2);
/// assert!(!order.is_filled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct RestingOrder {
    /// Price in ticks
    pub price: u64,

    /// Remaining quantity
    pub quantity: u64,

    /// Insertion sequence (FIFO tie-breaker)
    pub sequence: u64,
}

impl RestingOrder {
    pub fn new(price: Price, quantity: Quantity, sequence: Sequence) -> Self {
        Self {
            price,
            quantity,
            sequence,
        }
    }

    /// The tree key of this order.
    #[inline]
    pub fn key(&self) -> OrderKey {
        OrderKey::new(self.price, self.sequence)
    }

    /// Check if the order has nothing left to trade
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.quantity == 0
    }

    /// Take up to `quantity` units from this order.
    ///
    /// # Returns
    ///
    /// The quantity actually taken (never more than what remains)
    #[inline]
    pub fn fill(&mut self, quantity: Quantity) -> Quantity {
        let taken = quantity.min(self.quantity);
        self.quantity -= taken;
        taken
    }

    /// Cost of taking `quantity` units at this order's price.
    #[inline]
    pub fn cost_of(&self, quantity: Quantity) -> Cost {
        Cost::from(self.price) * Cost::from(quantity)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_fill() {
        let mut order = RestingOrder::new(7, 4, 0);

        assert_eq!(order.fill(3), 3);
        assert_eq!(order.quantity, 1);
        assert!(!order.is_filled());

        // Over-fill only takes what remains
        assert_eq!(order.fill(10), 1);
        assert!(order.is_filled());
    }

    #[test]
    fn test_cost_of_does_not_overflow_u64() {
        let order = RestingOrder::new(u64::MAX, u64::MAX, 0);
        let expected = Cost::from(u64::MAX) * Cost::from(u64::MAX);

        assert_eq!(order.cost_of(u64::MAX), expected);
    }

    #[test]
    fn test_order_ssz_size() {
        let order = RestingOrder::new(10, 5, 3);
        let bytes = ssz_rs::serialize(&order).expect("Failed to serialize");

        // price + quantity + sequence
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[0..8], &10u64.to_le_bytes());
    }
}
