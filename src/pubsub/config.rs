use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

/// Port subscribers connect to
pub const DEFAULT_PORT: u16 = 5555;

/// Pub/sub endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubConfig {
    /// Address the publisher binds (all interfaces by default)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl PubSubConfig {
    /// ZeroMQ endpoint string for the bind address
    pub fn endpoint(&self) -> String {
        format!("tcp://{}", self.bind_addr)
    }
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let config = PubSubConfig::default();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:5555");
        assert_eq!(config.endpoint(), "tcp://0.0.0.0:5555");
    }
}
