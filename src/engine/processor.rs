//! Replay processor: drives an [`OrderBook`] from a command stream.
//!
//! Malformed lines and rejected orders are skipped and counted, never
//! fatal. Commands apply strictly in input order; each one runs to
//! completion before the next line is read.

use std::io::BufRead;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::engine::command::Command;
use crate::orderbook::OrderBook;
use crate::types::{BookError, ExecutionReport, Quantity, RestingOrder, Sequence};

/// Command lines processed before the replay stops.
pub const DEFAULT_MAX_COMMANDS: usize = 1_000_000;

/// Size of the closing market execution.
pub const DEFAULT_FINAL_QUANTITY: Quantity = 1_000;

/// Counters for one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Non-blank lines read (including malformed ones)
    pub lines: usize,
    pub adds: usize,
    pub cancels: usize,
    /// Cancels whose rank was out of range
    pub cancel_misses: usize,
    pub executes: usize,
    /// Lines that did not parse as a command
    pub malformed: usize,
    /// Commands the book refused (zero-quantity adds)
    pub rejected: usize,
}

/// Failure to read the command stream itself.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read command stream: {0}")]
    Io(#[from] std::io::Error),
}

/// What applying one command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Sequence),
    Canceled(Option<RestingOrder>),
    Executed(ExecutionReport),
    Rejected(BookError),
}

/// Applies commands to an owned book and keeps replay statistics.
///
/// ## Example
///
/// ```
/// use rank_book::{CommandProcessor, OrderBook};
///
/// let input = "+ 10 5\n+ 10 3\nbogus\n= 6\n";
/// let mut processor = CommandProcessor::new(OrderBook::new(), 100);
///
/// let stats = processor.run(input.as_bytes()).unwrap();
/// assert_eq!(stats.malformed, 1);
/// assert_eq!(processor.finish(1_000).cost, 20);
/// ```
#[derive(Debug)]
pub struct CommandProcessor {
    book: OrderBook,
    max_commands: usize,
    stats: ReplayStats,
}

impl CommandProcessor {
    pub fn new(book: OrderBook, max_commands: usize) -> Self {
        Self {
            book,
            max_commands,
            stats: ReplayStats::default(),
        }
    }

    /// Apply one parsed command.
    pub fn apply(&mut self, command: Command) -> Outcome {
        trace!(%command, "applying command");
        match command {
            Command::Add { price, quantity } => match self.book.add_order(price, quantity) {
                Ok(sequence) => {
                    self.stats.adds += 1;
                    Outcome::Added(sequence)
                }
                Err(err) => {
                    warn!(%command, error = %err, "order rejected");
                    self.stats.rejected += 1;
                    Outcome::Rejected(err)
                }
            },
            Command::Cancel { rank } => {
                let canceled = self.book.cancel_at_rank(rank);
                self.stats.cancels += 1;
                if canceled.is_none() {
                    self.stats.cancel_misses += 1;
                }
                Outcome::Canceled(canceled)
            }
            Command::Execute { quantity } => {
                self.stats.executes += 1;
                Outcome::Executed(self.book.execute_market(quantity))
            }
        }
    }

    /// Parse and apply one line.
    ///
    /// # Returns
    ///
    /// None for blank or malformed lines (malformed ones are counted)
    pub fn apply_line(&mut self, line: &str) -> Option<Outcome> {
        if line.trim().is_empty() {
            return None;
        }
        self.stats.lines += 1;

        match line.parse::<Command>() {
            Ok(command) => Some(self.apply(command)),
            Err(err) => {
                debug!(line, error = %err, "skipping malformed line");
                self.stats.malformed += 1;
                None
            }
        }
    }

    /// Replay every line of `reader` until end of input or until
    /// `max_commands` non-blank lines have been processed.
    ///
    /// Invalid UTF-8 is treated as a malformed line.
    pub fn run<R: BufRead>(&mut self, reader: R) -> Result<ReplayStats, ReplayError> {
        for chunk in reader.split(b'\n') {
            if self.stats.lines >= self.max_commands {
                info!(max_commands = self.max_commands, "command limit reached");
                break;
            }
            let bytes = chunk?;
            let line = String::from_utf8_lossy(&bytes);
            self.apply_line(&line);
        }

        info!(
            lines = self.stats.lines,
            adds = self.stats.adds,
            cancels = self.stats.cancels,
            executes = self.stats.executes,
            malformed = self.stats.malformed,
            rejected = self.stats.rejected,
            resting = self.book.len(),
            "replay finished"
        );
        Ok(self.stats)
    }

    /// Issue the closing market execution.
    pub fn finish(&mut self, quantity: Quantity) -> ExecutionReport {
        let report = self.book.execute_market(quantity);
        info!(
            requested = report.requested,
            filled = report.filled,
            cost = %report.cost,
            "final execution"
        );
        report
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    pub fn into_book(self) -> OrderBook {
        self.book
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> CommandProcessor {
        CommandProcessor::new(OrderBook::with_seed(1), DEFAULT_MAX_COMMANDS)
    }

    #[test]
    fn test_apply_each_command() {
        let mut p = processor();

        assert_eq!(
            p.apply(Command::Add {
                price: 7,
                quantity: 4
            }),
            Outcome::Added(0)
        );
        assert_eq!(
            p.apply(Command::Cancel { rank: 5 }),
            Outcome::Canceled(None)
        );

        let Outcome::Executed(report) = p.apply(Command::Execute { quantity: 10 }) else {
            panic!("expected an execution");
        };
        assert_eq!(report.cost, 28);

        let stats = p.stats();
        assert_eq!((stats.adds, stats.cancels, stats.cancel_misses, stats.executes), (1, 1, 1, 1));
    }

    #[test]
    fn test_zero_quantity_add_is_rejected_and_counted() {
        let mut p = processor();

        assert_eq!(
            p.apply_line("+ 10 0"),
            Some(Outcome::Rejected(BookError::InvalidQuantity))
        );
        assert_eq!(p.stats().rejected, 1);
        assert!(p.book().is_empty());
    }

    #[test]
    fn test_run_skips_blank_and_malformed_lines() {
        let input = "+ 10 5\n\n+ 12 1\nhello\n+ 10\n- 0\n= 3\n";
        let mut p = processor();

        let stats = p.run(input.as_bytes()).unwrap();

        assert_eq!(stats.lines, 6);
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.adds, 2);
        assert_eq!(stats.cancels, 1);
        assert_eq!(stats.executes, 1);
        // "- 0" canceled the 10, "= 3" took 1@12
        assert!(p.book().is_empty());
        assert_eq!(p.book().traded_cost(), 12);
    }

    #[test]
    fn test_run_treats_invalid_utf8_as_malformed() {
        let mut input = b"+ 5 1\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"+ 6 1\n");
        let mut p = processor();

        let stats = p.run(input.as_slice()).unwrap();

        assert_eq!(stats.adds, 2);
        assert_eq!(stats.malformed, 1);
    }

    #[test]
    fn test_run_stops_at_command_limit() {
        let input = "+ 1 1\n+ 2 1\n+ 3 1\n+ 4 1\n";
        let mut p = CommandProcessor::new(OrderBook::new(), 2);

        let stats = p.run(input.as_bytes()).unwrap();

        assert_eq!(stats.lines, 2);
        assert_eq!(p.book().len(), 2);
    }

    #[test]
    fn test_finish_executes_final_quantity() {
        let mut p = processor();
        p.run("+ 3 600\n+ 4 600\n".as_bytes()).unwrap();

        let report = p.finish(DEFAULT_FINAL_QUANTITY);

        assert_eq!(report.filled, 1_000);
        assert_eq!(report.cost, 600 * 3 + 400 * 4);
        assert_eq!(p.into_book().total_quantity(), 200);
    }
}
