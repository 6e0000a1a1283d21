use std::io::{self, Write};

use tracing::warn;

use crate::book::Book;
use crate::command::Command;
use crate::common::{Price, Quantity};
use crate::order::{OrderId, Side};
use crate::print::{self, OutputFormat};
use crate::registry::Registry;

/// Applies decoded feed commands to the registry's books and emits
/// subscriber-driven output.
///
/// Commands are applied strictly in feed order, one at a time. A command
/// that fails validation is logged with its reason and skipped; the feed
/// continues. `io::Result` only carries sink failures.
pub struct Processor<W: Write> {
    registry: Registry,
    filter: Option<String>,
    format: OutputFormat,
    out: W,
}

impl<W: Write> Processor<W> {
    pub fn new(out: W) -> Self {
        Self {
            registry: Registry::new(),
            filter: None,
            format: OutputFormat::default(),
            out,
        }
    }

    /// Restrict output to one symbol. An empty string clears the filter.
    pub fn set_filter(&mut self, symbol: impl Into<String>) {
        let symbol = symbol.into();
        self.filter = (!symbol.is_empty()).then_some(symbol);
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Recover the output sink, consuming the processor.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Decode and apply one feed line. Returns whether the command took
    /// effect.
    pub fn process_line(&mut self, line: &str) -> io::Result<bool> {
        match line.parse::<Command>() {
            Ok(command) => self.apply(command),
            Err(reason) => {
                warn!(%reason, line, "skipping undecodable command");
                Ok(false)
            }
        }
    }

    pub fn apply(&mut self, command: Command) -> io::Result<bool> {
        match command {
            Command::OrderAdd {
                order_id,
                symbol,
                side,
                quantity,
                price,
            } => self.order_add(order_id, symbol, side, quantity, price),
            Command::OrderModify {
                order_id,
                quantity,
                price,
            } => self.order_modify(order_id, quantity, price),
            Command::OrderCancel { order_id } => self.order_cancel(order_id),
            Command::SubscribeBbo { symbol } => {
                self.registry.subscribe_bbo(&symbol);
                Ok(true)
            }
            Command::UnsubscribeBbo { symbol } => {
                if !self.registry.unsubscribe_bbo(&symbol) {
                    warn!(%symbol, "no bbo subscriptions for this symbol");
                    return Ok(false);
                }
                Ok(true)
            }
            Command::SubscribeVwap { symbol, quantity } => {
                if quantity == 0 {
                    warn!(%symbol, "vwap subscription quantity can't be zero");
                    return Ok(false);
                }
                self.registry.subscribe_vwap(&symbol, quantity);
                Ok(true)
            }
            Command::UnsubscribeVwap { symbol, quantity } => {
                if quantity == 0 {
                    warn!(%symbol, "vwap subscription quantity can't be zero");
                    return Ok(false);
                }
                if !self.registry.unsubscribe_vwap(&symbol, quantity) {
                    warn!(
                        %symbol,
                        quantity,
                        "no vwap subscriptions for this symbol and quantity"
                    );
                    return Ok(false);
                }
                Ok(true)
            }
            Command::Print { symbol } => self.print_levels(symbol),
            Command::PrintFull { symbol } => self.print_full(symbol),
        }
    }

    fn order_add(
        &mut self,
        order_id: OrderId,
        symbol: String,
        side: Side,
        quantity: Quantity,
        price: Price,
    ) -> io::Result<bool> {
        // The routing table spans all books, so an id resting under another
        // symbol is a duplicate too.
        if self.registry.is_registered(order_id) {
            warn!(order_id, "order with this id already exists");
            return Ok(false);
        }
        if let Err(reason) =
            self.registry.bind_symbol(&symbol).add(order_id, side, quantity, price)
        {
            warn!(%reason, order_id, %symbol, "order add rejected");
            return Ok(false);
        }
        self.registry.register_order(order_id, &symbol);
        self.emit_market_data(&symbol)?;
        Ok(true)
    }

    fn order_modify(
        &mut self,
        order_id: OrderId,
        quantity: Quantity,
        price: Price,
    ) -> io::Result<bool> {
        let symbol = match self.registry.resolve_symbol(order_id) {
            Ok(symbol) => symbol.to_string(),
            Err(reason) => {
                warn!(%reason, order_id, "order modify rejected");
                return Ok(false);
            }
        };
        let Some(book) = self.registry.book_mut(&symbol) else {
            warn!(order_id, %symbol, "order is registered but its symbol has no book");
            return Ok(false);
        };
        if let Err(reason) = book.modify(order_id, quantity, price) {
            warn!(%reason, order_id, %symbol, "order modify rejected");
            return Ok(false);
        }
        self.emit_market_data(&symbol)?;
        Ok(true)
    }

    fn order_cancel(&mut self, order_id: OrderId) -> io::Result<bool> {
        let symbol = match self.registry.resolve_symbol(order_id) {
            Ok(symbol) => symbol.to_string(),
            Err(reason) => {
                warn!(%reason, order_id, "order cancel rejected");
                return Ok(false);
            }
        };
        match self.registry.book_mut(&symbol) {
            Some(book) => {
                if let Err(reason) = book.cancel(order_id) {
                    // The routing entry goes away regardless; the book-level
                    // failure is reported, not suppressed.
                    warn!(%reason, order_id, %symbol, "book does not know this order, erasing the registration anyway");
                }
                self.registry.unregister_order(order_id);
                self.emit_market_data(&symbol)?;
            }
            None => {
                warn!(order_id, %symbol, "order is registered but its symbol has no book, erasing the registration anyway");
                self.registry.unregister_order(order_id);
            }
        }
        Ok(true)
    }

    fn print_levels(&mut self, symbol: String) -> io::Result<bool> {
        if !self.passes_filter(&symbol) {
            return Ok(true);
        }
        match self.registry.book(&symbol) {
            Some(book) => {
                print::write_price_levels(
                    &mut self.out,
                    book.iter(),
                    &symbol,
                    self.format,
                )?;
                Ok(true)
            }
            None => {
                warn!(%symbol, "symbol is not registered");
                Ok(false)
            }
        }
    }

    fn print_full(&mut self, symbol: String) -> io::Result<bool> {
        if !self.passes_filter(&symbol) {
            return Ok(true);
        }
        match self.registry.book(&symbol) {
            Some(book) => {
                print::write_full_order_list(
                    &mut self.out,
                    book.iter(),
                    &symbol,
                    self.format,
                )?;
                Ok(true)
            }
            None => {
                warn!(%symbol, "symbol is not registered");
                Ok(false)
            }
        }
    }

    fn passes_filter(&self, symbol: &str) -> bool {
        self.filter.as_deref().map_or(true, |filter| filter == symbol)
    }

    /// BBO and VWAP output for current subscribers after a successful
    /// mutation of `symbol`'s book.
    fn emit_market_data(&mut self, symbol: &str) -> io::Result<()> {
        if !self.passes_filter(symbol) {
            return Ok(());
        }
        if self.registry.bbo_subscriber_count(symbol) > 0 {
            if let Some(book) = self.registry.book(symbol) {
                print::write_bbo(&mut self.out, &book.bbo(), symbol, self.format)?;
            }
        }
        let quantities = self.registry.vwap_subscriptions(symbol);
        if let Some(book) = self.registry.book(symbol) {
            for quantity in quantities {
                match book.vwap(quantity) {
                    Ok(vwap) => print::write_vwap(
                        &mut self.out,
                        &vwap,
                        symbol,
                        quantity,
                        self.format,
                    )?,
                    Err(reason) => {
                        warn!(%reason, symbol, quantity, "vwap not computable")
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;

    fn processor() -> Processor<Vec<u8>> {
        Processor::new(Vec::new())
    }

    fn feed(processor: &mut Processor<Vec<u8>>, lines: &[&str]) -> Vec<bool> {
        lines
            .iter()
            .map(|line| processor.process_line(line).unwrap())
            .collect()
    }

    #[test]
    fn test_add_registers_and_rests_order() {
        let mut p = processor();
        assert!(p.process_line("ORDER ADD,1000,AAPL,Buy,100,72.82").unwrap());

        assert!(p.registry().is_registered(1000));
        assert_eq!(p.registry().book("AAPL").unwrap().total_quantity(), 100);
    }

    #[test]
    fn test_add_duplicate_id_across_symbols_is_skipped() {
        let mut p = processor();
        let applied = feed(
            &mut p,
            &[
                "ORDER ADD,1000,AAPL,Buy,100,72.82",
                "ORDER ADD,1000,MSFT,Sell,50,41.00",
            ],
        );

        assert_eq!(applied, vec![true, false]);
        assert!(p.registry().book("MSFT").is_none());
    }

    #[test]
    fn test_rejected_add_registers_nothing() {
        let mut p = processor();
        assert!(!p.process_line("ORDER ADD,1000,AAPL,Buy,0,72.82").unwrap());

        assert!(!p.registry().is_registered(1000));
        assert_eq!(p.registry().book("AAPL").unwrap().total_quantity(), 0);
    }

    #[test]
    fn test_modify_routes_by_order_id() {
        let mut p = processor();
        feed(
            &mut p,
            &[
                "ORDER ADD,1000,AAPL,Buy,100,72.82",
                "ORDER MODIFY,1000,50,72.81",
            ],
        );

        let bbo = p.registry().book("AAPL").unwrap().bbo();
        assert_eq!(bbo.buy.unwrap().price, 72.81);
        assert_eq!(bbo.buy.unwrap().total_volume, 50);
    }

    #[test]
    fn test_modify_unknown_id_is_skipped() {
        let mut p = processor();
        assert!(!p.process_line("ORDER MODIFY,42,50,72.81").unwrap());
    }

    #[test]
    fn test_cancel_unregisters_order() {
        let mut p = processor();
        let applied = feed(
            &mut p,
            &[
                "ORDER ADD,1000,AAPL,Buy,100,72.82",
                "ORDER CANCEL,1000",
                "ORDER CANCEL,1000",
            ],
        );

        assert_eq!(applied, vec![true, true, false]);
        assert!(!p.registry().is_registered(1000));
        assert_eq!(p.registry().book("AAPL").unwrap().total_quantity(), 0);
    }

    #[test]
    fn test_cancel_with_stale_book_state_still_unregisters() {
        let mut p = processor();
        // Simulate external-state drift: the id routes to a symbol whose
        // book never saw the order.
        p.process_line("ORDER ADD,1,AAPL,Buy,10,72.82").unwrap();
        p.registry.register_order(2, "AAPL");

        assert!(p.process_line("ORDER CANCEL,2").unwrap());
        assert!(!p.registry().is_registered(2));
        // The resident order is untouched.
        assert_eq!(p.registry().book("AAPL").unwrap().total_quantity(), 10);
    }

    #[test]
    fn test_cancel_with_no_book_still_unregisters() {
        let mut p = processor();
        p.registry.register_order(7, "GHOST");

        assert!(p.process_line("ORDER CANCEL,7").unwrap());
        assert!(!p.registry().is_registered(7));
    }

    #[test]
    fn test_bbo_emission_requires_subscription() {
        let mut p = processor();
        p.process_line("ORDER ADD,1,AAPL,Buy,100,72.82").unwrap();
        assert!(p.into_inner().is_empty());

        let mut p = processor();
        feed(
            &mut p,
            &["SUBSCRIBE BBO,AAPL", "ORDER ADD,1,AAPL,Buy,100,72.82"],
        );
        let output = String::from_utf8(p.into_inner()).unwrap();
        assert!(output.contains("<-- AAPL BBO"));
        assert!(output.contains("|         1|       100|     72.82|"));
    }

    #[test]
    fn test_unsubscribe_stops_emission() {
        let mut p = processor();
        feed(
            &mut p,
            &[
                "SUBSCRIBE BBO,AAPL",
                "UNSUBSCRIBE BBO,AAPL",
                "ORDER ADD,1,AAPL,Buy,100,72.82",
            ],
        );
        assert!(p.into_inner().is_empty());
    }

    #[test]
    fn test_vwap_emission_per_subscribed_quantity() {
        let mut p = processor();
        feed(
            &mut p,
            &[
                "SUBSCRIBE VWAP,AAPL,10",
                "SUBSCRIBE VWAP,AAPL,500",
                "ORDER ADD,1,AAPL,Buy,100,72.82",
            ],
        );
        let output = String::from_utf8(p.into_inner()).unwrap();
        assert!(output.contains("<-- AAPL VWAP(10)"));
        assert!(output.contains("<72.82,0.00>"));
        // 500 shares exceed the resting 100: sentinel on both sides.
        assert!(output.contains("<-- AAPL VWAP(500)"));
        assert!(output.contains("<0.00,0.00>"));
    }

    #[test]
    fn test_zero_quantity_vwap_subscription_is_rejected() {
        let mut p = processor();
        let applied = feed(&mut p, &["SUBSCRIBE VWAP,AAPL,0"]);
        assert_eq!(applied, vec![false]);
    }

    #[test]
    fn test_symbol_filter_drops_other_symbols() {
        let mut p = processor();
        p.set_filter("AAPL");
        feed(
            &mut p,
            &[
                "SUBSCRIBE BBO,AAPL",
                "SUBSCRIBE BBO,MSFT",
                "ORDER ADD,1,MSFT,Sell,50,41.00",
                "ORDER ADD,2,AAPL,Buy,100,72.82",
                "PRINT,MSFT",
            ],
        );
        let output = String::from_utf8(p.into_inner()).unwrap();
        assert!(output.contains("AAPL"));
        assert!(!output.contains("MSFT"));
    }

    #[test]
    fn test_print_unknown_symbol_is_skipped() {
        let mut p = processor();
        assert!(!p.process_line("PRINT,AAPL").unwrap());
        assert!(p.into_inner().is_empty());
    }

    #[test]
    fn test_undecodable_line_is_skipped() {
        let mut p = processor();
        assert!(!p.process_line("ORDER TELEPORT,1").unwrap());
        assert!(!p.process_line("").unwrap());
    }
}
