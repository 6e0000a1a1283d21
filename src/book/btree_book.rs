use std::collections::{BTreeMap, HashMap, VecDeque};

use eq_float::F64;

use crate::book::bbo::{Bbo, Quote};
use crate::book::iter::DualSideIterator;
use crate::book::vwap::Vwap;
use crate::book::Book;
use crate::common::{Price, Quantity};
use crate::error::OrderError;
use crate::order::{OrderId, OrderRecord, Side};

/// One side of the book: a price level per map entry, orders at the same
/// price queued in arrival order.
pub(crate) type SideMap = BTreeMap<F64, VecDeque<OrderRecord>>;

/// Limit order book for a single symbol where each side is an ordered
/// mapping (using B-trees) keyed on price.
///
/// The id index records each resting order's side and level key, so modify
/// and cancel go straight to the right level instead of scanning a side:
/// O(log n) in the side size plus the width of the one level touched. The
/// index and the two sides always describe the same set of orders; every
/// operation validates before it mutates, so a failed call leaves the book
/// untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct BTreeBook {
    symbol: String,
    bids: SideMap,
    asks: SideMap,
    index: HashMap<OrderId, (Side, F64)>,
    /// Total resting volume on each side.
    depth: (Quantity, Quantity),
}

impl BTreeBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
            depth: (0, 0),
        }
    }

    fn validate(quantity: Quantity, price: Price) -> Result<(), OrderError> {
        if quantity == 0 {
            return Err(OrderError::NonPositiveQuantity);
        }
        if !price.is_finite() || price < 0.0 {
            return Err(OrderError::NegativePrice);
        }
        Ok(())
    }

    fn side_mut(&mut self, side: Side) -> &mut SideMap {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn insert_record(&mut self, side: Side, record: OrderRecord) {
        let key = F64(record.price);
        self.index.insert(record.order_id, (side, key));
        self.side_mut(side).entry(key).or_default().push_back(record);
        match side {
            Side::Buy => self.depth.0 += record.quantity,
            Side::Sell => self.depth.1 += record.quantity,
        }
    }

    /// Remove `order_id` from the level at `key`, pruning the level once it
    /// empties.
    fn remove_record(&mut self, side: Side, key: F64, order_id: OrderId) {
        let levels = self.side_mut(side);
        let Some(level) = levels.get_mut(&key) else {
            return;
        };
        let Some(position) =
            level.iter().position(|order| order.order_id == order_id)
        else {
            return;
        };
        let Some(record) = level.remove(position) else {
            return;
        };
        if level.is_empty() {
            levels.remove(&key);
        }
        match side {
            Side::Buy => self.depth.0 -= record.quantity,
            Side::Sell => self.depth.1 -= record.quantity,
        }
    }

    fn side_quote(&self, side: Side) -> Option<Quote> {
        let best = match side {
            Side::Buy => self.bids.last_key_value(),
            Side::Sell => self.asks.first_key_value(),
        };
        best.map(|(price, level)| Quote {
            total_volume: level.iter().map(|order| order.quantity).sum(),
            price: price.0,
            order_count: level.len() as u32,
        })
    }

    /// Weighted price of the best `requested` shares, walking records
    /// best-to-worst and partially consuming the last one touched. `0.0`
    /// when the side cannot cover the request.
    fn side_vwap<'a>(
        records: impl Iterator<Item = &'a OrderRecord>,
        requested: Quantity,
    ) -> Price {
        let mut remaining = requested;
        let mut notional = 0.0;
        for record in records {
            if remaining > record.quantity {
                notional += record.price * record.quantity as f64;
                remaining -= record.quantity;
            } else {
                notional += record.price * remaining as f64;
                remaining = 0;
                break;
            }
        }
        if remaining > 0 {
            return 0.0;
        }
        notional / requested as f64
    }
}

impl Book for BTreeBook {
    type Error = OrderError;

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn add(
        &mut self,
        order_id: OrderId,
        side: Side,
        quantity: Quantity,
        price: Price,
    ) -> Result<(), OrderError> {
        Self::validate(quantity, price)?;
        if self.index.contains_key(&order_id) {
            return Err(OrderError::DuplicateId(order_id));
        }
        self.insert_record(
            side,
            OrderRecord {
                order_id,
                quantity,
                price,
            },
        );
        Ok(())
    }

    fn modify(
        &mut self,
        order_id: OrderId,
        quantity: Quantity,
        price: Price,
    ) -> Result<(), OrderError> {
        Self::validate(quantity, price)?;
        let (side, key) = *self
            .index
            .get(&order_id)
            .ok_or(OrderError::UnknownId(order_id))?;
        self.remove_record(side, key, order_id);
        // Re-inserted at the back of the (possibly new) price level: time
        // priority at the old price is not retained.
        self.insert_record(
            side,
            OrderRecord {
                order_id,
                quantity,
                price,
            },
        );
        Ok(())
    }

    fn cancel(&mut self, order_id: OrderId) -> Result<(), OrderError> {
        let (side, key) = self
            .index
            .remove(&order_id)
            .ok_or(OrderError::UnknownId(order_id))?;
        self.remove_record(side, key, order_id);
        Ok(())
    }

    fn bbo(&self) -> Bbo {
        Bbo {
            buy: self.side_quote(Side::Buy),
            sell: self.side_quote(Side::Sell),
        }
    }

    fn vwap(&self, quantity: Quantity) -> Result<Vwap, OrderError> {
        if quantity == 0 {
            return Err(OrderError::ZeroQuantity);
        }
        Ok(Vwap {
            buy_price: Self::side_vwap(
                self.bids.values().rev().flatten(),
                quantity,
            ),
            sell_price: Self::side_vwap(self.asks.values().flatten(), quantity),
        })
    }

    fn total_quantity(&self) -> Quantity {
        self.depth.0 + self.depth.1
    }

    fn iter(&self) -> DualSideIterator<'_> {
        DualSideIterator::new(&self.bids, &self.asks)
    }
}
