//! Error types for tick publishing
//!
//! Every failure along encode-then-send surfaces to the caller of
//! `publish`. Nothing here is retried or logged-and-dropped.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while connecting a transport or publishing a tick
///
/// # Error Categories
///
/// - **Connection Errors**: `Connection`, `ConnectTimeout`, `Bind`, `NotConnected`
/// - **Encoding Errors**: `Encoding`
/// - **Send Errors**: `Send`
/// - **Configuration Errors**: `InvalidConfig`
#[derive(Debug, Error)]
pub enum PublishError {
    /// Broker connection, channel creation or queue declaration failed
    #[error("Connection error: {0}")]
    Connection(#[from] lapin::Error),

    /// Broker did not accept the connection within the configured timeout
    #[error("Connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Pub/sub endpoint could not be bound (e.g. port already in use)
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: zeromq::ZmqError,
    },

    /// Payload could not be serialized or parsed
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Transport rejected or could not complete the publish
    #[error("Send failed: {0}")]
    Send(String),

    /// Transport was closed before the publish
    #[error("Publisher not connected")]
    NotConnected,

    /// Configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PublishError {
    /// Returns true if the transport connection is unusable
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            PublishError::Connection(_)
                | PublishError::ConnectTimeout(_)
                | PublishError::Bind { .. }
                | PublishError::NotConnected
        )
    }

    /// Returns true if a single publish failed on a live connection
    pub fn is_send_error(&self) -> bool {
        matches!(self, PublishError::Send(_))
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PublishError::Send("channel closed".to_string());
        assert_eq!(err.to_string(), "Send failed: channel closed");
        assert_eq!(PublishError::NotConnected.to_string(), "Publisher not connected");
    }

    #[test]
    fn test_error_categories() {
        assert!(PublishError::NotConnected.is_connection_error());
        assert!(PublishError::ConnectTimeout(Duration::from_secs(1)).is_connection_error());
        assert!(PublishError::Send("x".to_string()).is_send_error());
        assert!(!PublishError::Send("x".to_string()).is_connection_error());
        assert!(!PublishError::InvalidConfig("x".to_string()).is_send_error());
    }
}
