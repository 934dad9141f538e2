//! # Rank Book
//!
//! Single-sided, price-time priority order book backed by an
//! order-statistics treap.
//!
//! ## Architecture
//!
//! - **Types**: Core data structures (RestingOrder, Side, ExecutionReport)
//! - **OrderBook**: Treap with slab-based node storage and rank queries
//! - **Engine**: Text command model and the replay processor that drives a book
//! - **Config**: Layered configuration for the binary
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Tree priorities come from a seeded PRNG
//! 2. **Integer Math**: Costs accumulate in `u128`, no rounding
//! 3. **Arena Memory**: Nodes are addressed by slab key, never by reference
//! 4. **Synchronous Execution**: Every command runs to completion in order

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: RestingOrder, Side, ExecutionReport, errors
pub mod types;

/// Order book: treap with slab-based storage
pub mod orderbook;

/// Command parsing and replay
pub mod engine;

/// Layered configuration
pub mod config;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use engine::{Command, CommandProcessor, ReplayStats};
pub use orderbook::{BookState, OrderBook, OrderTree};
pub use types::{BookError, ExecutionReport, RestingOrder, Side};
