use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use zeromq::{PubSocket, Socket, SocketSend, ZmqMessage};

use super::config::PubSubConfig;
use crate::transport::{PublishError, Result, Transport, TransportKind};

/// ZeroMQ PUB socket bound on a TCP endpoint
///
/// Every payload goes out as one single-frame message to each SUB peer whose
/// subscription matches. Delivery is at-most-once: peers that have not
/// finished subscribing yet, or whose send queue is full, miss the message.
/// No subscriber registry is kept here, the socket tracks its own peers.
pub struct PubSubTransport {
    endpoint: String,
    local_addr: SocketAddr,
    // PubSocket::send needs &mut; the lock only spans the socket write
    socket: Mutex<Option<PubSocket>>,
    is_connected: AtomicBool,
}

impl PubSubTransport {
    /// Bind the PUB socket
    ///
    /// Fails immediately if the address cannot be bound.
    pub async fn bind(config: &PubSubConfig) -> Result<Self> {
        let mut socket = PubSocket::new();
        let bound = socket
            .bind(&config.endpoint())
            .await
            .map_err(|source| PublishError::Bind {
                addr: config.bind_addr,
                source,
            })?;

        let endpoint = bound.to_string();
        let port = bound_port(&endpoint).unwrap_or(config.bind_addr.port());
        let local_addr = SocketAddr::new(config.bind_addr.ip(), port);

        tracing::info!("Pub/sub publisher bound on {}", endpoint);

        Ok(Self {
            endpoint,
            local_addr,
            socket: Mutex::new(Some(socket)),
            is_connected: AtomicBool::new(true),
        })
    }

    /// Endpoint actually bound, in `tcp://host:port` form (resolves port 0)
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Address actually bound
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl Transport for PubSubTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::PubSub
    }

    async fn send(&self, payload: &[u8]) -> Result<()> {
        // encode happened upstream, only the write is serialized
        let message = ZmqMessage::from(payload.to_vec());

        let mut guard = self.socket.lock().await;
        let socket = guard.as_mut().ok_or(PublishError::NotConnected)?;
        socket
            .send(message)
            .await
            .map_err(|e| PublishError::Send(e.to_string()))?;

        tracing::trace!("Broadcast {} bytes on {}", payload.len(), self.endpoint);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.is_connected.store(false, Ordering::Release);

        let socket = self.socket.lock().await.take();
        let Some(socket) = socket else {
            return Ok(());
        };

        let errors = socket.close().await;
        for e in &errors {
            tracing::warn!("Error while closing pub/sub socket {}: {}", self.endpoint, e);
        }

        tracing::info!("Pub/sub publisher on {} closed", self.endpoint);
        match errors.into_iter().next() {
            Some(e) => Err(PublishError::Send(e.to_string())),
            None => Ok(()),
        }
    }

    fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Acquire)
    }
}

/// Port from a `tcp://host:port` endpoint
fn bound_port(endpoint: &str) -> Option<u16> {
    endpoint.rsplit(':').next()?.parse().ok()
}
