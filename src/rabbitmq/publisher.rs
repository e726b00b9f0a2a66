use async_trait::async_trait;
use lapin::{
    options::*, types::FieldTable, BasicProperties, Channel, Connection, ConnectionProperties,
};
use std::sync::atomic::{AtomicBool, Ordering};

use super::config::RabbitMQConfig;
use crate::transport::{PublishError, Result, Transport, TransportKind};

/// Point-to-point transport publishing to a single named queue
///
/// Publishes go through the default exchange with the queue name as routing
/// key, so the broker hands each tick to exactly one consumer (or buffers it
/// while none is attached). No publisher confirms are requested.
pub struct QueueTransport {
    config: RabbitMQConfig,
    connection: Connection,
    channel: Channel,
    is_connected: AtomicBool,
}

impl QueueTransport {
    /// Connect to the broker, open a channel and declare the queue
    ///
    /// The declaration is idempotent: redeclaring a queue with the same
    /// attributes is a no-op on the broker side.
    pub async fn connect(config: RabbitMQConfig) -> Result<Self> {
        tracing::info!("Connecting to RabbitMQ at {}", config.uri);

        let connect = Connection::connect(&config.uri, ConnectionProperties::default());
        let connection = match config.connection_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, connect)
                .await
                .map_err(|_| PublishError::ConnectTimeout(timeout))??,
            None => connect.await?,
        };

        let channel = connection.create_channel().await?;

        channel
            .queue_declare(
                &config.queue,
                QueueDeclareOptions {
                    durable: false,
                    exclusive: false,
                    auto_delete: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        tracing::info!("Declared queue '{}', ready to publish", config.queue);

        Ok(Self {
            config,
            connection,
            channel,
            is_connected: AtomicBool::new(true),
        })
    }

    /// Queue (and routing key) ticks are published to
    pub fn queue(&self) -> &str {
        &self.config.queue
    }
}

#[async_trait]
impl Transport for QueueTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Queue
    }

    async fn send(&self, payload: &[u8]) -> Result<()> {
        if !self.is_connected() {
            return Err(PublishError::NotConnected);
        }

        // Fire and forget: the confirm future is not awaited
        let _confirm = self
            .channel
            .basic_publish(
                "",
                &self.config.queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default(),
            )
            .await
            .map_err(|e| PublishError::Send(e.to_string()))?;

        tracing::trace!("Published {} bytes to queue '{}'", payload.len(), self.config.queue);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if !self.is_connected.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        tracing::info!("Disconnecting from RabbitMQ");

        let channel = self.channel.close(200, "Normal shutdown").await;
        let connection = self.connection.close(200, "Normal shutdown").await;
        close_outcome(channel, connection)?;

        tracing::info!("Disconnected from RabbitMQ");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Acquire) && self.channel.status().connected()
    }
}

/// Combine channel and connection shutdown results
///
/// A channel failure is logged and reported unless the connection close
/// failed too, in which case the connection error wins.
fn close_outcome(channel: lapin::Result<()>, connection: lapin::Result<()>) -> Result<()> {
    if let Err(e) = &channel {
        tracing::warn!("Failed to close RabbitMQ channel: {}", e);
    }
    connection?;
    channel?;
    Ok(())
}
