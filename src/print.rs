use std::collections::BTreeMap;
use std::io::{self, Write};

use eq_float::F64;
use serde::Serialize;

use crate::book::bbo::{FIELD_WIDTH, NIL};
use crate::book::{Bbo, DualSideIterator, IterStatus, Vwap};
use crate::common::{Price, Quantity};
use crate::order::OrderRecord;

/// How subscriber and print output is rendered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// Fixed-width tables matching the historical replay transcripts.
    #[default]
    Table,
    /// One JSON object per emission.
    Json,
}

/// Aggregated price levels, best first on both sides.
#[derive(Debug, PartialEq, Serialize)]
pub struct Levels {
    pub bids: Vec<(Price, Quantity)>,
    pub asks: Vec<(Price, Quantity)>,
}

/// Per-order book contents, best first on both sides.
#[derive(Debug, PartialEq, Serialize)]
pub struct FullBook {
    pub bids: Vec<OrderRecord>,
    pub asks: Vec<OrderRecord>,
}

#[derive(Serialize)]
struct JsonLine<'a, T: Serialize> {
    kind: &'static str,
    symbol: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<Quantity>,
    #[serde(flatten)]
    data: &'a T,
}

fn write_json<W: Write, T: Serialize>(
    out: &mut W,
    line: &JsonLine<'_, T>,
) -> io::Result<()> {
    serde_json::to_writer(&mut *out, line)?;
    writeln!(out)
}

pub fn write_bbo<W: Write>(
    out: &mut W,
    bbo: &Bbo,
    symbol: &str,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(
                out,
                "|{:>w$}|{:>w$}|{:>w$}|{:>w$}|{:>w$}|{:>w$}| <-- {} BBO",
                "#orders",
                "quantity",
                "bid price",
                "ask price",
                "quantity",
                "#orders",
                symbol,
                w = FIELD_WIDTH
            )?;
            writeln!(out, "{bbo}")
        }
        OutputFormat::Json => write_json(
            out,
            &JsonLine {
                kind: "bbo",
                symbol,
                quantity: None,
                data: bbo,
            },
        ),
    }
}

pub fn write_vwap<W: Write>(
    out: &mut W,
    vwap: &Vwap,
    symbol: &str,
    quantity: Quantity,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(
                out,
                "<buy price, sell price> <-- {symbol} VWAP({quantity})"
            )?;
            writeln!(out, "{vwap}")
        }
        OutputFormat::Json => write_json(
            out,
            &JsonLine {
                kind: "vwap",
                symbol,
                quantity: Some(quantity),
                data: vwap,
            },
        ),
    }
}

/// Aggregate the traversal into per-level volumes. Key order is ascending;
/// bid consumers read it reversed to get best-first.
fn aggregate_levels(
    iter: &mut DualSideIterator<'_>,
) -> (BTreeMap<F64, Quantity>, BTreeMap<F64, Quantity>) {
    let mut bid_levels: BTreeMap<F64, Quantity> = BTreeMap::new();
    let mut ask_levels: BTreeMap<F64, Quantity> = BTreeMap::new();

    iter.first();
    while iter.done() != IterStatus::AllDone {
        if let Some(bid) = iter.bid() {
            *bid_levels.entry(F64(bid.price)).or_default() += bid.quantity;
        }
        if let Some(ask) = iter.ask() {
            *ask_levels.entry(F64(ask.price)).or_default() += ask.quantity;
        }
        iter.next();
    }
    (bid_levels, ask_levels)
}

/// Render the book's aggregated price levels, `<volume@price>` per cell,
/// the shorter side padded with `<NIL@NIL>`. An empty book still prints
/// one all-NIL row.
pub fn write_price_levels<W: Write>(
    out: &mut W,
    mut iter: DualSideIterator<'_>,
    symbol: &str,
    format: OutputFormat,
) -> io::Result<()> {
    let (bid_levels, ask_levels) = aggregate_levels(&mut iter);

    match format {
        OutputFormat::Table => {
            writeln!(out, "|Bid      |       Ask| <-- {symbol} PRINT")?;
            let mut bids = bid_levels.iter().rev().peekable();
            let mut asks = ask_levels.iter().peekable();
            loop {
                match bids.next() {
                    Some((price, volume)) => {
                        write!(out, "<{volume}@{:.2}>", price.0)?
                    }
                    None => write!(out, "<{NIL}@{NIL}>")?,
                }
                write!(out, "|")?;
                match asks.next() {
                    Some((price, volume)) => {
                        writeln!(out, "<{volume}@{:.2}>", price.0)?
                    }
                    None => writeln!(out, "<{NIL}@{NIL}>")?,
                }
                if bids.peek().is_none() && asks.peek().is_none() {
                    break;
                }
            }
            Ok(())
        }
        OutputFormat::Json => {
            let levels = Levels {
                bids: bid_levels
                    .iter()
                    .rev()
                    .map(|(price, &volume)| (price.0, volume))
                    .collect(),
                asks: ask_levels
                    .iter()
                    .map(|(price, &volume)| (price.0, volume))
                    .collect(),
            };
            write_json(
                out,
                &JsonLine {
                    kind: "print",
                    symbol,
                    quantity: None,
                    data: &levels,
                },
            )
        }
    }
}

/// Render every resting order, bids beside asks, best first. `NIL` cells
/// pad the shorter side; an empty book prints one all-NIL row.
pub fn write_full_order_list<W: Write>(
    out: &mut W,
    mut iter: DualSideIterator<'_>,
    symbol: &str,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(
                out,
                "|{:>w$}|{:>w$}|{:>w$}|{:>w$}|{:>w$}|{:>w$}| <-- {} PRINT_FULL",
                "order id",
                "quantity",
                "bid price",
                "ask price",
                "quantity",
                "order id",
                symbol,
                w = FIELD_WIDTH
            )?;

            iter.first();
            if iter.done() == IterStatus::AllDone {
                return writeln!(
                    out,
                    "|{NIL:>w$}|{NIL:>w$}|{NIL:>w$}|{NIL:>w$}|{NIL:>w$}|{NIL:>w$}|",
                    w = FIELD_WIDTH
                );
            }
            while iter.done() != IterStatus::AllDone {
                match iter.bid() {
                    Some(bid) => write!(
                        out,
                        "|{:>w$}|{:>w$}|{:>w$.2}",
                        bid.order_id,
                        bid.quantity,
                        bid.price,
                        w = FIELD_WIDTH
                    )?,
                    None => write!(
                        out,
                        "|{NIL:>w$}|{NIL:>w$}|{NIL:>w$}",
                        w = FIELD_WIDTH
                    )?,
                }
                match iter.ask() {
                    Some(ask) => writeln!(
                        out,
                        "|{:>w$.2}|{:>w$}|{:>w$}|",
                        ask.price,
                        ask.quantity,
                        ask.order_id,
                        w = FIELD_WIDTH
                    )?,
                    None => writeln!(
                        out,
                        "|{NIL:>w$}|{NIL:>w$}|{NIL:>w$}|",
                        w = FIELD_WIDTH
                    )?,
                }
                iter.next();
            }
            Ok(())
        }
        OutputFormat::Json => {
            iter.first();
            let mut book = FullBook {
                bids: Vec::new(),
                asks: Vec::new(),
            };
            while iter.done() != IterStatus::AllDone {
                if let Some(bid) = iter.bid() {
                    book.bids.push(*bid);
                }
                if let Some(ask) = iter.ask() {
                    book.asks.push(*ask);
                }
                iter.next();
            }
            write_json(
                out,
                &JsonLine {
                    kind: "print_full",
                    symbol,
                    quantity: None,
                    data: &book,
                },
            )
        }
    }
}
