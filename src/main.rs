
pub mod config;
pub mod consumer;
pub mod decoder;
pub mod generator;
pub mod publisher;
pub mod stats;
pub mod ui;

use {
    config::Config,
    publisher::{ChannelSink, LogSink},
    std::{sync::Arc, time::Duration},
    tokio::sync::{mpsc, RwLock},
};

#[tokio::main]
pub async fn main() {
    dotenv::dotenv().ok();

    // Write logs to stderr so they stay out of the alternate-screen dashboard
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("🚀 Starting ScoreFlow consumer...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("ERROR: Failed to read environment variables: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("📊 Configuration:");
    log::info!("   Topic: {}", config.topic);
    log::info!("   Broker: {}", config.broker_address);
    log::info!("   Consumer group: {}", config.group_id);

    let headless = parse_headless_from_args();

    log::info!("Step 1. Verify the Kafka broker is reachable.");
    if let Err(e) = consumer::verify_broker(&config) {
        log::error!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    log::info!("Step 2. Create the Kafka consumer.");
    let kafka_consumer = match consumer::create_consumer(&config) {
        Ok(consumer) => consumer,
        Err(e) => {
            log::error!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };

    log::info!("Step 3. Verify the topic exists.");
    if let Err(e) = consumer::ensure_topic_exists(&kafka_consumer, &config.topic) {
        log::error!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
    log::info!("Kafka topic '{}' is ready.", config.topic);

    log::info!("Step 4. Process messages.");

    if headless {
        let mut sink = LogSink;
        let processed = consumer::consume_stream(kafka_consumer, &mut sink).await;
        log::info!("✅ Clean shutdown after {} events", processed);
        return;
    }

    // Bounded channel from the consumer loop to the render task
    let (tx, rx) = mpsc::channel(64);
    let latest = Arc::new(RwLock::new(None));

    tokio::spawn(publisher::snapshot_relay_task(rx, latest.clone()));

    // Spawn UI task; quitting it ('q'/Esc) shuts the whole process down
    let ui_handle = tokio::spawn(async move {
        if let Err(e) = ui::run_ui(latest).await {
            log::error!("UI error: {}", e);
        }
    });

    let mut sink = ChannelSink::new(tx, Duration::from_millis(250));

    tokio::select! {
        _ = ui_handle => {
            log::info!("UI exited, shutting down");
        }
        processed = consumer::consume_stream(kafka_consumer, &mut sink) => {
            log::info!("✅ Clean shutdown after {} events", processed);
        }
    }
}

/// `--headless` swaps the terminal dashboard for one log line per snapshot.
fn parse_headless_from_args() -> bool {
    std::env::args().any(|arg| arg == "--headless")
}
