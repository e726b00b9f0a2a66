use std::sync::Arc;

use super::tick_publisher::{PublisherStats, TickPublisher};
use crate::market_data::MarketTick;
use crate::transport::{PublishError, Result};

/// Fans each tick out to several publishers
///
/// Every publisher is attempted even when an earlier one fails, so a dead
/// queue connection does not starve pub/sub subscribers. The first error is
/// still returned to the caller.
#[derive(Default)]
pub struct Dispatcher {
    publishers: Vec<Arc<TickPublisher>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a publisher to the fan-out list
    pub fn add(&mut self, publisher: Arc<TickPublisher>) {
        tracing::info!("Dispatcher: added {} publisher", publisher.kind());
        self.publishers.push(publisher);
    }

    /// Publish one tick through every registered publisher
    pub async fn publish(&self, tick: &MarketTick) -> Result<()> {
        let mut first_error: Option<PublishError> = None;

        for publisher in &self.publishers {
            if let Err(e) = publisher.publish(tick).await {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Close every publisher, returning the first failure
    pub async fn close(&self) -> Result<()> {
        let mut result = Ok(());
        for publisher in &self.publishers {
            if let Err(e) = publisher.close().await {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }

    pub fn stats(&self) -> Vec<PublisherStats> {
        self.publishers.iter().map(|p| p.stats()).collect()
    }
}
