use std::fmt::Display;

use serde::Serialize;

use crate::common::{Price, Quantity};

/// Column width shared by every fixed-width table this crate prints.
pub(crate) const FIELD_WIDTH: usize = 10;

/// Cell content for an absent side.
pub(crate) const NIL: &str = "NIL";

/// Aggregation over one side's best price level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Quote {
    pub total_volume: Quantity,
    pub price: Price,
    pub order_count: u32,
}

/// Best bid and offer snapshot. A side with no resting orders is `None`.
///
/// Computed fresh from book state on each query, never cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Bbo {
    pub buy: Option<Quote>,
    pub sell: Option<Quote>,
}

impl Display for Bbo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.buy {
            Some(quote) => write!(
                f,
                "|{:>w$}|{:>w$}|{:>w$.2}",
                quote.order_count,
                quote.total_volume,
                quote.price,
                w = FIELD_WIDTH
            )?,
            None => write!(
                f,
                "|{NIL:>w$}|{NIL:>w$}|{NIL:>w$}",
                w = FIELD_WIDTH
            )?,
        }
        match self.sell {
            Some(quote) => write!(
                f,
                "|{:>w$.2}|{:>w$}|{:>w$}|",
                quote.price,
                quote.total_volume,
                quote.order_count,
                w = FIELD_WIDTH
            ),
            None => write!(
                f,
                "|{NIL:>w$}|{NIL:>w$}|{NIL:>w$}|",
                w = FIELD_WIDTH
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_both_sides() {
        let bbo = Bbo {
            buy: Some(Quote {
                total_volume: 55,
                price: 72.82,
                order_count: 4,
            }),
            sell: Some(Quote {
                total_volume: 100,
                price: 72.85,
                order_count: 1,
            }),
        };

        assert_eq!(
            bbo.to_string(),
            "|         4|        55|     72.82|     72.85|       100|         1|"
        );
    }

    #[test]
    fn test_display_nil_sides() {
        assert_eq!(
            Bbo::default().to_string(),
            "|       NIL|       NIL|       NIL|       NIL|       NIL|       NIL|"
        );
    }

    #[test]
    fn test_display_one_sided() {
        let bbo = Bbo {
            buy: Some(Quote {
                total_volume: 10,
                price: 9.5,
                order_count: 1,
            }),
            sell: None,
        };

        assert_eq!(
            bbo.to_string(),
            "|         1|        10|      9.50|       NIL|       NIL|       NIL|"
        );
    }
}
