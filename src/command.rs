use std::str::FromStr;

use thiserror::Error;

use crate::common::{Price, Quantity};
use crate::error::OrderError;
use crate::order::{OrderId, Side};

/// Failure to decode one feed line into a [`Command`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DecodeError {
    #[error("empty command line")]
    EmptyLine,
    #[error("unknown command [{0}]")]
    UnknownCommand(String),
    #[error("bad number of tokens for [{command}]: expected {expected}, got {actual}")]
    BadTokenCount {
        command: String,
        expected: usize,
        actual: usize,
    },
    #[error("bad numeric field [{0}]")]
    BadNumber(String),
    #[error(transparent)]
    InvalidSide(#[from] OrderError),
}

/// One decoded feed command. Decoding never touches engine state.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    OrderAdd {
        order_id: OrderId,
        symbol: String,
        side: Side,
        quantity: Quantity,
        price: Price,
    },
    OrderModify {
        order_id: OrderId,
        quantity: Quantity,
        price: Price,
    },
    OrderCancel {
        order_id: OrderId,
    },
    SubscribeBbo {
        symbol: String,
    },
    UnsubscribeBbo {
        symbol: String,
    },
    SubscribeVwap {
        symbol: String,
        quantity: Quantity,
    },
    UnsubscribeVwap {
        symbol: String,
        quantity: Quantity,
    },
    Print {
        symbol: String,
    },
    PrintFull {
        symbol: String,
    },
}

/// Split on `delim`, dropping the empty tokens repeated delimiters leave
/// behind.
fn split(line: &str, delim: char) -> Vec<&str> {
    line.split(delim).filter(|token| !token.is_empty()).collect()
}

fn expect_len(
    command: &str,
    tokens: &[&str],
    expected: usize,
) -> Result<(), DecodeError> {
    if tokens.len() != expected {
        return Err(DecodeError::BadTokenCount {
            command: command.to_string(),
            expected,
            actual: tokens.len(),
        });
    }
    Ok(())
}

fn parse_quantity(token: &str) -> Result<u64, DecodeError> {
    token
        .parse()
        .map_err(|_| DecodeError::BadNumber(token.to_string()))
}

fn parse_price(token: &str) -> Result<Price, DecodeError> {
    token
        .parse()
        .map_err(|_| DecodeError::BadNumber(token.to_string()))
}

impl FromStr for Command {
    type Err = DecodeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens = split(line, ',');
        let Some(&name) = tokens.first() else {
            return Err(DecodeError::EmptyLine);
        };
        match name {
            "ORDER ADD" => {
                expect_len(name, &tokens, 6)?;
                Ok(Command::OrderAdd {
                    order_id: parse_quantity(tokens[1])?,
                    symbol: tokens[2].to_string(),
                    side: tokens[3].parse()?,
                    quantity: parse_quantity(tokens[4])?,
                    price: parse_price(tokens[5])?,
                })
            }
            "ORDER MODIFY" => {
                expect_len(name, &tokens, 4)?;
                Ok(Command::OrderModify {
                    order_id: parse_quantity(tokens[1])?,
                    quantity: parse_quantity(tokens[2])?,
                    price: parse_price(tokens[3])?,
                })
            }
            "ORDER CANCEL" => {
                expect_len(name, &tokens, 2)?;
                Ok(Command::OrderCancel {
                    order_id: parse_quantity(tokens[1])?,
                })
            }
            "SUBSCRIBE BBO" => {
                expect_len(name, &tokens, 2)?;
                Ok(Command::SubscribeBbo {
                    symbol: tokens[1].to_string(),
                })
            }
            "UNSUBSCRIBE BBO" => {
                expect_len(name, &tokens, 2)?;
                Ok(Command::UnsubscribeBbo {
                    symbol: tokens[1].to_string(),
                })
            }
            "SUBSCRIBE VWAP" => {
                expect_len(name, &tokens, 3)?;
                Ok(Command::SubscribeVwap {
                    symbol: tokens[1].to_string(),
                    quantity: parse_quantity(tokens[2])?,
                })
            }
            "UNSUBSCRIBE VWAP" => {
                expect_len(name, &tokens, 3)?;
                Ok(Command::UnsubscribeVwap {
                    symbol: tokens[1].to_string(),
                    quantity: parse_quantity(tokens[2])?,
                })
            }
            "PRINT" => {
                expect_len(name, &tokens, 2)?;
                Ok(Command::Print {
                    symbol: tokens[1].to_string(),
                })
            }
            "PRINT_FULL" => {
                expect_len(name, &tokens, 2)?;
                Ok(Command::PrintFull {
                    symbol: tokens[1].to_string(),
                })
            }
            other => Err(DecodeError::UnknownCommand(other.to_string())),
        }
    }
}
