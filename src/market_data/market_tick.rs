use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

/// Top-of-book quote handed over by the upstream feed client
///
/// Prices are passed through verbatim: a tick with bid above ask, or with a
/// non-finite price, is still a valid `MarketTick` as far as publishing goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTick {
    /// Instrument identifier (e.g. "GCZ5", "AAPL")
    pub symbol: String,
    /// Bid price
    pub bid_price: f64,
    /// Ask price
    pub ask_price: f64,
    /// Exchange or feed timestamp, offset preserved
    pub timestamp: DateTime<FixedOffset>,
}

impl MarketTick {
    /// Create a tick from any chrono time zone, keeping its offset
    pub fn new<Tz: TimeZone>(
        symbol: impl Into<String>,
        bid_price: f64,
        ask_price: f64,
        timestamp: DateTime<Tz>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            bid_price,
            ask_price,
            timestamp: timestamp.fixed_offset(),
        }
    }

    /// Create a tick stamped with the current UTC time
    pub fn now(symbol: impl Into<String>, bid_price: f64, ask_price: f64) -> Self {
        Self::new(symbol, bid_price, ask_price, chrono::Utc::now())
    }

    /// Mid-price between bid and ask
    pub fn mid_price(&self) -> f64 {
        (self.bid_price + self.ask_price) / 2.0
    }

    /// Absolute bid/ask spread, never negative for finite prices
    pub fn spread(&self) -> f64 {
        crate::payload::spread(self.bid_price, self.ask_price)
    }

    /// True when the ask sits below the bid
    pub fn is_crossed(&self) -> bool {
        self.ask_price < self.bid_price
    }
}
