use std::str::FromStr;

use arbitrary::Arbitrary;
use eq_float::F64;
use serde::{Deserialize, Serialize};

use crate::common::{Price, Quantity};
use crate::error::OrderError;

pub type OrderId = u64;

/// Side of the book an order rests on, as carried by the feed.
#[derive(
    Arbitrary, Copy, Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub enum Side {
    Buy,
    Sell,
}

impl FromStr for Side {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(Side::Buy),
            "Sell" => Ok(Side::Sell),
            other => Err(OrderError::InvalidSide(other.to_string())),
        }
    }
}

/// A single resting order. Immutable once created; a modify replaces the
/// whole record.
///
/// Records do not order themselves: the side collections key their price
/// levels on a total-ordered float wrapper, so price is the only sort key
/// and `order_id`/`quantity` never participate.
#[derive(Arbitrary, Copy, Clone, Debug, Deserialize, Serialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub quantity: Quantity,
    pub price: Price,
}

impl PartialEq for OrderRecord {
    fn eq(&self, other: &Self) -> bool {
        self.order_id == other.order_id
            && self.quantity == other.quantity
            && F64(self.price) == F64(other.price)
    }
}

impl Eq for OrderRecord {}
