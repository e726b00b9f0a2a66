use std::sync::Arc;
use std::time::Duration;

use tick_publisher::{
    Dispatcher, MarketTick, PubSubTransport, PublishError, PublisherConfig, QueueTransport,
    TickPublisher, TransportKind,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Grace period after binding so subscribers can attach before the first frame
const SUBSCRIBER_GRACE: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tick_publisher=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PublishError> {
    let config = PublisherConfig::from_env()?;
    let ticks = parse_ticks(std::env::args().skip(1))?;

    // Connect eagerly: a broker or port problem stops the process here
    let dispatcher = connect_transports(&config).await?;

    if config.transports.contains(&TransportKind::PubSub) {
        tokio::time::sleep(SUBSCRIBER_GRACE).await;
    }

    for tick in &ticks {
        if tick.is_crossed() {
            tracing::debug!(
                "Crossed quote for {}: bid {} above ask {}",
                tick.symbol,
                tick.bid_price,
                tick.ask_price
            );
        }
        dispatcher.publish(tick).await?;
        tracing::info!(
            "📤 {} bid={} ask={} spread={}",
            tick.symbol,
            tick.bid_price,
            tick.ask_price,
            tick.spread()
        );
    }

    for stats in dispatcher.stats() {
        tracing::info!(
            "📊 {}: published={}, failed={}",
            stats.kind,
            stats.messages_published,
            stats.messages_failed
        );
    }

    dispatcher.close().await
}

/// Connect every configured transport, each exactly once
async fn connect_transports(config: &PublisherConfig) -> Result<Dispatcher, PublishError> {
    let mut dispatcher = Dispatcher::new();

    for kind in &config.transports {
        let publisher = match kind {
            TransportKind::Queue => {
                let transport = QueueTransport::connect(config.rabbitmq.clone()).await?;
                tracing::info!("🐰 RabbitMQ: publishing to queue '{}'", transport.queue());
                TickPublisher::new(transport)
            }
            TransportKind::PubSub => {
                let transport = PubSubTransport::bind(&config.pubsub).await?;
                tracing::info!("📡 Pub/sub: subscribers connect to {}", transport.endpoint());
                TickPublisher::new(transport)
            }
        };
        dispatcher.add(Arc::new(publisher));
    }

    Ok(dispatcher)
}

/// Read `SYMBOL BID ASK` triples; no arguments publishes a sample tick
fn parse_ticks<I>(args: I) -> Result<Vec<MarketTick>, PublishError>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();

    if args.is_empty() {
        return Ok(vec![MarketTick::now("GCZ5", 3573.7, 3573.8)]);
    }

    if args.len() % 3 != 0 {
        return Err(PublishError::InvalidConfig(
            "usage: tick-publisher [SYMBOL BID ASK]...".to_string(),
        ));
    }

    args.chunks(3)
        .map(|chunk| -> Result<MarketTick, PublishError> {
            let price = |raw: &str| {
                raw.parse::<f64>().map_err(|e| {
                    PublishError::InvalidConfig(format!("invalid price '{}': {}", raw, e))
                })
            };
            Ok(MarketTick::now(chunk[0].clone(), price(&chunk[1])?, price(&chunk[2])?))
        })
        .collect()
}
