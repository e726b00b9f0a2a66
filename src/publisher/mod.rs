pub mod dispatcher;
pub mod tick_publisher;

pub use dispatcher::Dispatcher;
pub use tick_publisher::{PublisherStats, TickPublisher};
