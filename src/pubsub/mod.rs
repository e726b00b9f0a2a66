pub mod config;
pub mod publisher;

pub use config::{PubSubConfig, DEFAULT_PORT};
pub use publisher::PubSubTransport;

/// SUB socket helpers shared by transport and publisher tests
#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;
    use zeromq::{Socket, SocketRecv, SubSocket};

    use super::PubSubTransport;
    use crate::transport::Transport;

    /// Marker broadcast until a subscriber proves it is receiving
    pub const SYNC_FRAME: &[u8] = b"__sync__";

    pub async fn connect_subscriber(endpoint: &str) -> SubSocket {
        let mut socket = SubSocket::new();
        socket.connect(endpoint).await.unwrap();
        socket.subscribe("").await.unwrap();
        socket
    }

    /// Publish sync frames until the subscription has reached the publisher
    pub async fn sync_subscriber(transport: &PubSubTransport, subscriber: &mut SubSocket) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                transport.send(SYNC_FRAME).await.unwrap();
                if let Ok(Ok(_)) =
                    tokio::time::timeout(Duration::from_millis(50), subscriber.recv()).await
                {
                    break;
                }
            }
        })
        .await
        .expect("subscriber never joined");
    }

    /// Next single-frame message, skipping leftover sync frames
    pub async fn next_payload(subscriber: &mut SubSocket) -> Vec<u8> {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(5), subscriber.recv())
                .await
                .expect("timed out waiting for message")
                .unwrap();
            assert_eq!(message.len(), 1, "each tick is one frame");
            let frame = message.get(0).unwrap().to_vec();
            if frame != SYNC_FRAME {
                return frame;
            }
        }
    }
}
