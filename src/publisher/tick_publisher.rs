use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::market_data::MarketTick;
use crate::payload;
use crate::transport::{Result, Transport, TransportKind};

/// Statistics for a tick publisher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherStats {
    pub kind: TransportKind,
    pub messages_published: u64,
    pub messages_failed: u64,
    pub is_connected: bool,
}

/// Encode-then-send entry point bound to one connected transport
///
/// The transport is connected before it is handed over, so a `TickPublisher`
/// is always ready; a failed connect never produces one. Share it across
/// tasks with `Arc<TickPublisher>`.
pub struct TickPublisher {
    transport: Arc<dyn Transport>,
    messages_published: AtomicU64,
    messages_failed: AtomicU64,
}

impl TickPublisher {
    /// Create a publisher owning a connected transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Create a publisher over a transport shared with other owners
    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            messages_published: AtomicU64::new(0),
            messages_failed: AtomicU64::new(0),
        }
    }

    /// Encode a tick in this transport's payload shape and send it
    ///
    /// Every call sends its own message, identical ticks included. Errors are
    /// returned as-is, the tick is never dropped silently.
    pub async fn publish(&self, tick: &MarketTick) -> Result<()> {
        let body = payload::encode(tick, self.kind().includes_spread())?;

        match self.transport.send(&body).await {
            Ok(()) => {
                self.messages_published.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Published tick: symbol={}, transport={}", tick.symbol, self.kind());
                Ok(())
            }
            Err(e) => {
                self.messages_failed.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    /// Publish from loose quote fields
    pub async fn publish_quote(
        &self,
        symbol: &str,
        bid_price: f64,
        ask_price: f64,
        time: impl Into<DateTime<FixedOffset>>,
    ) -> Result<()> {
        let time: DateTime<FixedOffset> = time.into();
        let tick = MarketTick::new(symbol, bid_price, ask_price, time);
        self.publish(&tick).await
    }

    /// Backend kind this publisher sends through
    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Check if the underlying transport is still usable
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Close the underlying transport
    pub async fn close(&self) -> Result<()> {
        self.transport.close().await
    }

    /// Get publisher statistics
    pub fn stats(&self) -> PublisherStats {
        PublisherStats {
            kind: self.kind(),
            messages_published: self.messages_published.load(Ordering::Relaxed),
            messages_failed: self.messages_failed.load(Ordering::Relaxed),
            is_connected: self.is_connected(),
        }
    }
}
