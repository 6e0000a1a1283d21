use std::fmt::Display;

use serde::Serialize;

use crate::common::Price;

/// Volume-weighted average price over the best N shares of each side.
///
/// `0.0` on a side means either that the side holds no orders or that the
/// requested quantity exceeds the quantity resting there; the feed format
/// does not distinguish the two (and a book of zero-priced orders reports
/// the same value).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vwap {
    pub buy_price: Price,
    pub sell_price: Price,
}

impl Display for Vwap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{:.2},{:.2}>", self.buy_price, self.sell_price)
    }
}
