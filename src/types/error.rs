//! Error types for the book and its tree.

use thiserror::Error;

use crate::types::{Rank, Sequence, Side};

/// Errors returned by book and tree operations.
///
/// Out-of-range ranks and under-filled executions are not errors; those
/// operations report "nothing happened" through their return values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// A resting order must have a positive quantity.
    #[error("order quantity must be positive")]
    InvalidQuantity,

    /// Tried to join trees that rank prices in opposite directions.
    #[error("cannot append a {other:?} tree to a {this:?} tree")]
    SideMismatch { this: Side, other: Side },

    /// Tried to append a tree whose first key does not follow our last key.
    #[error("appended keys overlap: first appended sequence {sequence} does not follow the current last key")]
    OverlappingKeys { sequence: Sequence },

    /// SSZ encoding failed while fingerprinting the book.
    #[error("failed to encode resting order: {0}")]
    Encoding(String),
}

/// A broken structural invariant found by `validate()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("keys out of order at rank {rank}")]
    KeyOrder { rank: Rank },

    #[error("child priority exceeds parent priority at node {node}")]
    HeapOrder { node: usize },

    #[error("node {node} records subtree size {recorded}, actual {actual}")]
    SubtreeSize {
        node: usize,
        recorded: usize,
        actual: usize,
    },

    #[error("tree reaches {reachable} nodes but the arena holds {stored}")]
    NodeCount { reachable: usize, stored: usize },

    #[error("resting order with sequence {sequence} has zero quantity")]
    EmptyOrder { sequence: Sequence },

    #[error("cached resting quantity {cached} does not match actual {actual}")]
    RestingQuantity { cached: u128, actual: u128 },
}
