use std::collections::HashMap;

use crate::book::BTreeBook;
use crate::common::Quantity;
use crate::error::OrderError;
use crate::order::OrderId;

/// Process-wide replay state: the symbol→book map, the global order-id
/// routing table, and the BBO/VWAP subscription counters.
///
/// The routing table only routes modify/cancel commands that carry no
/// symbol; each book's own index stays the single source of truth for
/// whether an order exists in that book. Constructed explicitly and passed
/// by reference — never a global.
#[derive(Debug, Default)]
pub struct Registry {
    books: HashMap<String, BTreeBook>,
    active_orders: HashMap<OrderId, String>,
    bbo_subscribers: HashMap<String, u32>,
    vwap_subscribers: HashMap<String, HashMap<Quantity, u32>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book for `symbol`, created on first use. Idempotent.
    pub fn bind_symbol(&mut self, symbol: &str) -> &mut BTreeBook {
        self.books
            .entry(symbol.to_string())
            .or_insert_with(|| BTreeBook::new(symbol))
    }

    pub fn book(&self, symbol: &str) -> Option<&BTreeBook> {
        self.books.get(symbol)
    }

    pub fn book_mut(&mut self, symbol: &str) -> Option<&mut BTreeBook> {
        self.books.get_mut(symbol)
    }

    /// Route `order_id` to `symbol` for later modify/cancel commands.
    pub fn register_order(&mut self, order_id: OrderId, symbol: &str) {
        self.active_orders.insert(order_id, symbol.to_string());
    }

    pub fn unregister_order(&mut self, order_id: OrderId) {
        self.active_orders.remove(&order_id);
    }

    pub fn is_registered(&self, order_id: OrderId) -> bool {
        self.active_orders.contains_key(&order_id)
    }

    /// Symbol that `order_id` routes to.
    pub fn resolve_symbol(&self, order_id: OrderId) -> Result<&str, OrderError> {
        self.active_orders
            .get(&order_id)
            .map(String::as_str)
            .ok_or(OrderError::UnknownId(order_id))
    }

    pub fn subscribe_bbo(&mut self, symbol: &str) {
        *self.bbo_subscribers.entry(symbol.to_string()).or_default() += 1;
    }

    /// Drop one BBO subscription. Counters never go negative; returns
    /// `false` when `symbol` was never subscribed at all.
    pub fn unsubscribe_bbo(&mut self, symbol: &str) -> bool {
        match self.bbo_subscribers.get_mut(symbol) {
            Some(count) => {
                *count = count.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    pub fn bbo_subscriber_count(&self, symbol: &str) -> u32 {
        self.bbo_subscribers.get(symbol).copied().unwrap_or(0)
    }

    pub fn subscribe_vwap(&mut self, symbol: &str, quantity: Quantity) {
        *self
            .vwap_subscribers
            .entry(symbol.to_string())
            .or_default()
            .entry(quantity)
            .or_default() += 1;
    }

    /// Drop one VWAP subscription. Returns `false` when the
    /// (symbol, quantity) pair was never subscribed at all.
    pub fn unsubscribe_vwap(&mut self, symbol: &str, quantity: Quantity) -> bool {
        match self
            .vwap_subscribers
            .get_mut(symbol)
            .and_then(|counts| counts.get_mut(&quantity))
        {
            Some(count) => {
                *count = count.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    /// Quantities with at least one live VWAP subscription for `symbol`,
    /// ascending for deterministic output order.
    pub fn vwap_subscriptions(&self, symbol: &str) -> Vec<Quantity> {
        let mut quantities: Vec<Quantity> = self
            .vwap_subscribers
            .get(symbol)
            .map(|counts| {
                counts
                    .iter()
                    .filter(|(_, &count)| count > 0)
                    .map(|(&quantity, _)| quantity)
                    .collect()
            })
            .unwrap_or_default();
        quantities.sort_unstable();
        quantities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use crate::order::Side;

    #[test]
    fn test_bind_symbol_is_idempotent() {
        let mut registry = Registry::new();
        registry
            .bind_symbol("AAPL")
            .add(1, Side::Buy, 10, 72.82)
            .unwrap();

        // A second bind must return the same live book, not a fresh one.
        assert_eq!(registry.bind_symbol("AAPL").total_quantity(), 10);
        assert_eq!(registry.book("AAPL").unwrap().symbol(), "AAPL");
    }

    #[test]
    fn test_order_routing_lifecycle() {
        let mut registry = Registry::new();
        registry.register_order(1, "AAPL");

        assert!(registry.is_registered(1));
        assert_eq!(registry.resolve_symbol(1).unwrap(), "AAPL");

        registry.unregister_order(1);
        assert!(!registry.is_registered(1));
        assert_eq!(registry.resolve_symbol(1), Err(OrderError::UnknownId(1)));
    }

    #[test]
    fn test_bbo_subscription_counting() {
        let mut registry = Registry::new();
        assert_eq!(registry.bbo_subscriber_count("AAPL"), 0);

        registry.subscribe_bbo("AAPL");
        registry.subscribe_bbo("AAPL");
        assert_eq!(registry.bbo_subscriber_count("AAPL"), 2);

        assert!(registry.unsubscribe_bbo("AAPL"));
        assert_eq!(registry.bbo_subscriber_count("AAPL"), 1);
    }

    #[test]
    fn test_bbo_unsubscribe_never_goes_negative() {
        let mut registry = Registry::new();
        registry.subscribe_bbo("AAPL");

        assert!(registry.unsubscribe_bbo("AAPL"));
        assert!(registry.unsubscribe_bbo("AAPL"));
        assert_eq!(registry.bbo_subscriber_count("AAPL"), 0);

        // Unknown symbols are reported, not created.
        assert!(!registry.unsubscribe_bbo("MSFT"));
    }

    #[test]
    fn test_vwap_subscriptions_sorted_and_filtered() {
        let mut registry = Registry::new();
        registry.subscribe_vwap("AAPL", 500);
        registry.subscribe_vwap("AAPL", 100);
        registry.subscribe_vwap("AAPL", 250);
        assert!(registry.unsubscribe_vwap("AAPL", 250));

        assert_eq!(registry.vwap_subscriptions("AAPL"), vec![100, 500]);
        assert!(registry.vwap_subscriptions("MSFT").is_empty());
    }

    #[test]
    fn test_vwap_unsubscribe_unknown_pair() {
        let mut registry = Registry::new();
        registry.subscribe_vwap("AAPL", 100);

        assert!(!registry.unsubscribe_vwap("AAPL", 200));
        assert!(!registry.unsubscribe_vwap("MSFT", 100));
        assert_eq!(registry.vwap_subscriptions("AAPL"), vec![100]);
    }
}
