//! Process configuration
//!
//! Defaults are the fixed endpoints existing consumers expect (broker on
//! localhost, queue `marketdata`, pub/sub on port 5555). Environment variables
//! can override each of them.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::pubsub::PubSubConfig;
use crate::rabbitmq::RabbitMQConfig;
use crate::transport::{PublishError, Result, TransportKind};

/// Everything the binary needs to bring its transports up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default)]
    pub rabbitmq: RabbitMQConfig,
    #[serde(default)]
    pub pubsub: PubSubConfig,
    /// Transports connected at startup
    #[serde(default = "default_transports")]
    pub transports: Vec<TransportKind>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            rabbitmq: RabbitMQConfig::default(),
            pubsub: PubSubConfig::default(),
            transports: default_transports(),
        }
    }
}

fn default_transports() -> Vec<TransportKind> {
    vec![TransportKind::Queue, TransportKind::PubSub]
}

impl PublisherConfig {
    /// Build from process environment variables
    ///
    /// Recognized: `RABBITMQ_URI`, `RABBITMQ_QUEUE`,
    /// `RABBITMQ_CONNECT_TIMEOUT_SECS`, `PUBSUB_BIND_ADDR`,
    /// `TICK_PUBLISHER_TRANSPORTS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, unset keys keep their default
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(uri) = lookup("RABBITMQ_URI") {
            config.rabbitmq.uri = uri;
        }
        if let Some(queue) = lookup("RABBITMQ_QUEUE") {
            config.rabbitmq.queue = queue;
        }
        if let Some(secs) = parse_var(&lookup, "RABBITMQ_CONNECT_TIMEOUT_SECS")? {
            config.rabbitmq.connection_timeout_secs = Some(secs);
        }
        if let Some(addr) = parse_var(&lookup, "PUBSUB_BIND_ADDR")? {
            config.pubsub.bind_addr = addr;
        }
        if let Some(list) = lookup("TICK_PUBLISHER_TRANSPORTS") {
            config.transports = parse_transports(&list)?;
        }

        Ok(config)
    }
}

/// Parse a comma separated transport list, duplicates collapse
pub fn parse_transports(list: &str) -> Result<Vec<TransportKind>> {
    let mut kinds = Vec::new();
    for item in list.split(',').filter(|s| !s.trim().is_empty()) {
        let kind: TransportKind = item.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    if kinds.is_empty() {
        return Err(PublishError::InvalidConfig(
            "TICK_PUBLISHER_TRANSPORTS names no transport".to_string(),
        ));
    }
    Ok(kinds)
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                PublishError::InvalidConfig(format!("{}='{}': {}", key, raw, e))
            })
        })
        .transpose()
}
