/// Market data input types
///
/// `MarketTick` is what the upstream feed client hands to a publisher.
pub mod market_tick;

pub use market_tick::MarketTick;
