//! Market-data feed replay over per-symbol limit order books.
//!
//! The engine keeps, per symbol, a price-ordered book of resting orders
//! (no matching, no trade generation) from which best-bid/offer and
//! volume-weighted-average-price snapshots are computed on demand. Around
//! it sit the feed adapters: a command decoder, a dispatching processor
//! with BBO/VWAP subscription bookkeeping, and the fixed-width/JSON
//! presentation used by the replay binary.

pub mod book;
pub mod command;
pub mod common;
pub mod error;
pub mod order;
pub mod print;
pub mod processor;
pub mod registry;

pub use book::{BTreeBook, Bbo, Book, DualSideIterator, IterStatus, Quote, Vwap};
pub use command::{Command, DecodeError};
pub use error::OrderError;
pub use order::{OrderId, OrderRecord, Side};
pub use processor::Processor;
pub use registry::Registry;
