pub mod config;
pub mod publisher;

pub use config::{RabbitMQConfig, DEFAULT_QUEUE};
pub use publisher::QueueTransport;
