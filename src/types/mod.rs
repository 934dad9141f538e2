//! Core data types for the rank book
//!
//! ## Types
//!
//! - [`RestingOrder`]: An order waiting in the book
//! - [`OrderKey`]: `(price, sequence)` tree key
//! - [`Side`]: Which price direction is best
//! - [`ExecutionReport`]: Outcome of a market execution
//! - [`BookError`] / [`InvariantViolation`]: Error types
//!
//! ## Integer Arithmetic
//!
//! Prices and quantities are `u64` ticks and units. Costs are accumulated
//! in `u128` so `price * quantity` summed over a whole book cannot overflow.

mod error;
mod order;
mod report;
mod side;

pub use error::{BookError, InvariantViolation};
pub use order::{Cost, Price, Quantity, Rank, RestingOrder, Sequence};
pub use report::ExecutionReport;
pub use side::{OrderKey, Side};
