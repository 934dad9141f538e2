//! Text commands accepted by the replay processor.
//!
//! ## Grammar
//!
//! One command per line, tokens separated by whitespace:
//!
//! ```text
//! + <price> <quantity>   add a resting order
//! - <rank>               cancel the order at a rank
//! = <quantity>           execute a market buy
//! ```
//!
//! The symbol may be glued to the first argument (`+10 5`). Arguments are
//! non-negative decimal integers.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::types::{Price, Quantity, Rank};

/// A parsed book command.
///
/// ## Example
///
/// ```
/// use rank_book::Command;
///
/// let cmd: Command = "+ 101 5".parse().unwrap();
/// assert_eq!(cmd, Command::Add { price: 101, quantity: 5 });
/// assert!("* 1".parse::<Command>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `+ <price> <quantity>`
    Add { price: Price, quantity: Quantity },
    /// `- <rank>`
    Cancel { rank: Rank },
    /// `= <quantity>`
    Execute { quantity: Quantity },
}

/// Why a line is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("empty line")]
    Empty,

    #[error("unknown command symbol {0:?}")]
    UnknownSymbol(char),

    #[error("missing {0} argument")]
    MissingArgument(&'static str),

    #[error("invalid {field} argument {value:?}")]
    InvalidArgument { field: &'static str, value: String },

    #[error("unexpected trailing token {0:?}")]
    TrailingToken(String),
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let symbol = line.chars().next().ok_or(CommandParseError::Empty)?;
        let mut tokens = line[symbol.len_utf8()..].split_whitespace();

        let command = match symbol {
            '+' => Command::Add {
                price: argument(&mut tokens, "price")?,
                quantity: argument(&mut tokens, "quantity")?,
            },
            '-' => Command::Cancel {
                rank: argument(&mut tokens, "rank")?,
            },
            '=' => Command::Execute {
                quantity: argument(&mut tokens, "quantity")?,
            },
            other => return Err(CommandParseError::UnknownSymbol(other)),
        };

        if let Some(extra) = tokens.next() {
            return Err(CommandParseError::TrailingToken(extra.to_string()));
        }

        Ok(command)
    }
}

fn argument<'a, T, I>(tokens: &mut I, field: &'static str) -> Result<T, CommandParseError>
where
    T: FromStr,
    I: Iterator<Item = &'a str>,
{
    let token = tokens
        .next()
        .ok_or(CommandParseError::MissingArgument(field))?;
    token
        .parse()
        .map_err(|_| CommandParseError::InvalidArgument {
            field,
            value: token.to_string(),
        })
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Add { price, quantity } => write!(f, "+ {price} {quantity}"),
            Command::Cancel { rank } => write!(f, "- {rank}"),
            Command::Execute { quantity } => write!(f, "= {quantity}"),
        }
    }
}
