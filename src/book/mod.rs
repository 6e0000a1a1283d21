pub mod bbo;
pub mod btree_book;
pub mod iter;
pub mod vwap;

pub use bbo::{Bbo, Quote};
pub use btree_book::BTreeBook;
pub use iter::{DualSideIterator, IterStatus};
pub use vwap::Vwap;

use std::fmt::Debug;

use crate::common::{Price, Quantity};
use crate::order::{OrderId, Side};

/// A per-symbol limit order book of resting orders.
///
/// Books only store orders; nothing here matches or generates trades.
pub trait Book: Debug {
    type Error;

    fn symbol(&self) -> &str;

    /// Rest a new order. Validation precedes any mutation.
    fn add(
        &mut self,
        order_id: OrderId,
        side: Side,
        quantity: Quantity,
        price: Price,
    ) -> Result<(), Self::Error>;

    /// Replace an existing order's quantity and price. The side of an
    /// order cannot change.
    fn modify(
        &mut self,
        order_id: OrderId,
        quantity: Quantity,
        price: Price,
    ) -> Result<(), Self::Error>;

    /// Remove a resting order.
    fn cancel(&mut self, order_id: OrderId) -> Result<(), Self::Error>;

    /// Best bid and offer, aggregated over each side's best price level.
    fn bbo(&self) -> Bbo;

    /// Volume-weighted average price over the best `quantity` shares on
    /// each side.
    fn vwap(&self, quantity: Quantity) -> Result<Vwap, Self::Error>;

    /// Total resting quantity across both sides.
    fn total_quantity(&self) -> Quantity;

    /// Lock-step read cursor over both sides, best prices first.
    fn iter(&self) -> DualSideIterator<'_>;
}
