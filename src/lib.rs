// Library Crate Root
// lib.rs

// Ticks flow market_data -> payload -> transport, wired together by publisher.
// main.rs imports through lib.rs like an external crate.
pub mod config;
pub mod market_data;
pub mod payload;
pub mod publisher;
pub mod pubsub;
pub mod rabbitmq;
pub mod transport;

// pub use = re-export at crate root
pub use config::PublisherConfig;
pub use market_data::MarketTick;
pub use publisher::{Dispatcher, PublisherStats, TickPublisher};
pub use pubsub::{PubSubConfig, PubSubTransport};
pub use rabbitmq::{QueueTransport, RabbitMQConfig};
pub use transport::{PublishError, Transport, TransportKind};
