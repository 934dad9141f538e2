//! Command engine for the rank book.
//!
//! ## Flow
//!
//! ```text
//! text line -> Command (FromStr) -> CommandProcessor::apply -> OrderBook
//! ```
//!
//! Parsing and replay sit outside the book: the book only ever sees valid
//! integers. Malformed input is counted and skipped here.
//!
//! ## Example
//!
//! ```
//! use rank_book::engine::{Command, CommandProcessor, Outcome};
//! use rank_book::OrderBook;
//!
//! let mut processor = CommandProcessor::new(OrderBook::new(), 1_000);
//! processor.apply(Command::Add { price: 10, quantity: 5 });
//!
//! let outcome = processor.apply(Command::Execute { quantity: 2 });
//! assert!(matches!(outcome, Outcome::Executed(r) if r.cost == 20));
//! ```

pub mod command;
pub mod processor;

pub use command::{Command, CommandParseError};
pub use processor::{
    CommandProcessor, Outcome, ReplayError, ReplayStats, DEFAULT_FINAL_QUANTITY,
    DEFAULT_MAX_COMMANDS,
};
