//! Order book module for the rank book.
//!
//! ## Architecture
//!
//! The book is a single side of a market stored in an order-statistics
//! treap:
//!
//! - **Slab-based storage**: tree nodes live in an arena, children are slab keys
//! - **Treap**: BST on `(price, sequence)`, max-heap on a random priority
//! - **Subtree sizes**: O(log n) lookup and removal by rank
//!
//! ## Components
//!
//! - [`TreeNode`]: Resting order plus treap bookkeeping
//! - [`OrderTree`]: The order-statistics treap
//! - [`OrderBook`]: Add / cancel-by-rank / execute-market on top of the tree
//!
//! ## Performance
//!
//! | Operation | Complexity (expected) |
//! |-----------|------------|
//! | Add order | O(log n) |
//! | Cancel at rank | O(log n) |
//! | Execute market | O(k log n) for k touched orders |
//! | Size | O(1) |
//!
//! ## Example
//!
//! ```
//! use rank_book::orderbook::OrderBook;
//!
//! let mut book = OrderBook::with_seed(7);
//! book.add_order(101, 3).unwrap();
//! book.add_order(100, 2).unwrap();
//!
//! assert_eq!(book.best().map(|o| o.price), Some(100));
//! assert_eq!(book.execute_market(4).cost, 2 * 100 + 2 * 101);
//! ```

pub mod book;
pub mod node;
pub mod treap;

pub use book::{BookState, OrderBook, DEFAULT_SEED};
pub use node::{NodeId, TreeNode};
pub use treap::{Iter, OrderTree};
