//! Book side and the ordering key it induces.
//!
//! Orders are ranked by `(price, sequence)`. The price direction depends on
//! the [`Side`] of the book; the sequence always ranks earlier orders first.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{Price, Sequence};

// ============================================================================
// Side enum
// ============================================================================

/// Which side of the market a book holds.
///
/// - `Ask`: lowest price is best (a buyer walks the book upward)
/// - `Bid`: highest price is best (a seller walks the book downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Sell orders, ascending price
    #[default]
    Ask,
    /// Buy orders, descending price
    Bid,
}

impl Side {
    /// Compare two keys in best-first order for this side.
    ///
    /// Equal prices fall back to the sequence so earlier orders rank first.
    #[inline]
    pub fn compare(self, a: &OrderKey, b: &OrderKey) -> Ordering {
        let by_price = match self {
            Side::Ask => a.price.cmp(&b.price),
            Side::Bid => b.price.cmp(&a.price),
        };
        by_price.then(a.sequence.cmp(&b.sequence))
    }

    /// True if `a` ranks strictly before `b`.
    #[inline]
    pub fn precedes(self, a: &OrderKey, b: &OrderKey) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

// ============================================================================
// OrderKey
// ============================================================================

/// Tree key: price first, insertion sequence as tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderKey {
    pub price: Price,
    pub sequence: Sequence,
}

impl OrderKey {
    #[inline]
    pub fn new(price: Price, sequence: Sequence) -> Self {
        Self { price, sequence }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_side_ordering() {
        let cheap = OrderKey::new(10, 5);
        let dear = OrderKey::new(11, 0);

        assert!(Side::Ask.precedes(&cheap, &dear));
        assert!(!Side::Ask.precedes(&dear, &cheap));
    }

    #[test]
    fn test_bid_side_ordering() {
        let cheap = OrderKey::new(10, 0);
        let dear = OrderKey::new(11, 5);

        assert!(Side::Bid.precedes(&dear, &cheap));
        assert!(!Side::Bid.precedes(&cheap, &dear));
    }

    #[test]
    fn test_fifo_tie_break_on_both_sides() {
        let first = OrderKey::new(10, 1);
        let second = OrderKey::new(10, 2);

        for side in [Side::Ask, Side::Bid] {
            assert!(side.precedes(&first, &second));
            assert_eq!(side.compare(&first, &first), Ordering::Equal);
        }
    }
}
