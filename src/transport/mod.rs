//! Transport abstraction layer
//!
//! A transport delivers already-encoded payload bytes. Connection setup is
//! backend specific (`QueueTransport::connect`, `PubSubTransport::bind`) and
//! happens before a transport value exists, so every `Transport` handed to a
//! publisher is already live.

pub mod error;

pub use error::{PublishError, Result};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Point-to-point AMQP work queue
    Queue,
    /// Fire-and-forget broadcast to socket subscribers
    PubSub,
}

impl TransportKind {
    /// Whether payloads for this kind carry the derived `spread` field
    pub fn includes_spread(self) -> bool {
        matches!(self, TransportKind::PubSub)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Queue => write!(f, "queue"),
            TransportKind::PubSub => write!(f, "pubsub"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "queue" | "rabbitmq" | "amqp" => Ok(TransportKind::Queue),
            "pubsub" | "zmq" | "zeromq" => Ok(TransportKind::PubSub),
            other => Err(PublishError::InvalidConfig(format!(
                "unknown transport '{}'",
                other
            ))),
        }
    }
}

/// Connected delivery backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Backend kind, decides the payload shape
    fn kind(&self) -> TransportKind;

    /// Deliver one encoded payload
    async fn send(&self, payload: &[u8]) -> Result<()>;

    /// Release the connection; later sends fail with `NotConnected`
    async fn close(&self) -> Result<()>;

    /// Check if the connection is still usable
    fn is_connected(&self) -> bool;
}
