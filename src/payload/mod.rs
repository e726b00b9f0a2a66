//! Tick payload encoding
//!
//! Turns a [`MarketTick`](crate::market_data::MarketTick) into the JSON
//! record consumers read off the queue or the pub/sub socket. Pure, no I/O.

pub mod encoder;

pub use encoder::{decode, encode, format_timestamp, spread, TickPayload};
