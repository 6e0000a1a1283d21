use thiserror::Error;

use crate::order::OrderId;

/// Failure kinds reported by the order-book engine and the registry.
///
/// All of these are recoverable conditions returned to the caller; no
/// operation mutates state before its validation passes.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum OrderError {
    #[error("order with id [{0}] already exists")]
    DuplicateId(OrderId),
    #[error("order with id [{0}] is not registered")]
    UnknownId(OrderId),
    #[error("bad side [{0}], expected Buy or Sell")]
    InvalidSide(String),
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("price must not be negative")]
    NegativePrice,
    #[error("vwap quantity must be greater than zero")]
    ZeroQuantity,
}
