//! Producer Binary - Synthetic Review Stream
//!
//! Continuously generates game-review messages, appends each one to the
//! live data file, and publishes it to the Kafka topic. A missing broker
//! degrades to file-only operation instead of failing; the consumer's
//! startup checks are the place where a missing broker is fatal.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin producer
//! ```
//!
//! ## Environment Variables
//!
//! - KAFKA_TOPIC - Topic to publish to (default: game_reviews)
//! - KAFKA_BROKER_ADDRESS - Broker address (default: localhost:9092)
//! - MESSAGE_INTERVAL_SECONDS - Pause between messages (default: 1)
//! - LIVE_DATA_PATH - JSONL mirror of the stream (default: data/live_reviews.jsonl)
//! - RUST_LOG - Logging level (optional, default: info)

use {
    rdkafka::{
        admin::{AdminClient, AdminOptions, NewTopic, TopicReplication},
        client::DefaultClientContext,
        config::ClientConfig,
        error::KafkaError,
        producer::{FutureProducer, FutureRecord, Producer},
        types::RDKafkaErrorCode,
        util::Timeout,
    },
    scoreflow::config::Config,
    scoreflow::generator,
    std::time::Duration,
};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a producer and probe the broker; `None` means file-only mode.
fn connect_producer(config: &Config) -> Option<FutureProducer> {
    let producer: FutureProducer = match ClientConfig::new()
        .set("bootstrap.servers", &config.broker_address)
        .set("message.timeout.ms", "5000")
        .create()
    {
        Ok(producer) => producer,
        Err(e) => {
            log::warn!("WARNING: Kafka connection failed: {}", e);
            return None;
        }
    };

    // Creating the client never touches the network; a metadata fetch does.
    match producer.client().fetch_metadata(None, SEND_TIMEOUT) {
        Ok(_) => {
            log::info!("Kafka producer connected to {}", config.broker_address);
            Some(producer)
        }
        Err(e) => {
            log::warn!("WARNING: Kafka broker not reachable: {}", e);
            None
        }
    }
}

/// Create the topic if it does not exist yet (single partition, matching
/// the single-consumer topology).
async fn ensure_topic(config: &Config) -> Result<(), KafkaError> {
    let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", &config.broker_address)
        .create()?;

    let topic = NewTopic::new(&config.topic, 1, TopicReplication::Fixed(1));
    let results = admin.create_topics([&topic], &AdminOptions::new()).await?;

    for result in results {
        match result {
            Ok(name) => log::info!("Created Kafka topic '{}'", name),
            Err((_, RDKafkaErrorCode::TopicAlreadyExists)) => {
                log::info!("Kafka topic '{}' already exists", config.topic);
            }
            Err((name, code)) => {
                return Err(KafkaError::AdminOpCreation(format!("{}: {}", name, code)));
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("🚀 Starting ScoreFlow producer...");

    log::info!("STEP 1. Read environment variables.");
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("ERROR: Failed to read environment variables: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("   Topic: {}", config.topic);
    log::info!("   Broker: {}", config.broker_address);
    log::info!("   Interval: {}s", config.message_interval_secs);
    log::info!("   Live data: {}", config.live_data_path.display());

    log::info!("STEP 2. Reset the live data file.");
    if let Err(e) = generator::reset_live_data(&config.live_data_path) {
        log::error!("ERROR: Failed to reset live data file: {}", e);
        std::process::exit(2);
    }

    log::info!("STEP 3. Connect the Kafka producer and create the topic.");
    let mut producer = connect_producer(&config);
    if producer.is_some() {
        if let Err(e) = ensure_topic(&config).await {
            log::warn!(
                "WARNING: Failed to create or verify topic '{}': {}",
                config.topic,
                e
            );
            producer = None;
        } else {
            log::info!("Kafka topic '{}' is ready.", config.topic);
        }
    }
    if producer.is_none() {
        log::warn!("⚠️ Running in file-only mode (no broker)");
    }

    log::info!("STEP 4. Generate messages continuously.");
    let interval = Duration::from_secs(config.message_interval_secs);
    let mut rng = rand::thread_rng();
    let mut sent = 0u64;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let message = generator::generate_message(&mut rng);
        log::info!("📝 {}", message.message);

        if let Err(e) = generator::append_live_data(&config.live_data_path, &message) {
            log::error!("ERROR: Failed to write live data file: {}", e);
            break;
        }

        if let Some(producer) = &producer {
            match serde_json::to_string(&message) {
                Ok(payload) => {
                    let record: FutureRecord<(), String> =
                        FutureRecord::to(&config.topic).payload(&payload);
                    match producer.send(record, Timeout::After(SEND_TIMEOUT)).await {
                        Ok(_) => {
                            sent += 1;
                            log::debug!("✅ Sent message to topic '{}'", config.topic);
                        }
                        Err((e, _)) => log::warn!("Failed to send message to Kafka: {}", e),
                    }
                }
                Err(e) => log::error!("Failed to serialize message: {}", e),
            }
        }

        tokio::select! {
            _ = &mut ctrl_c => {
                log::warn!("WARNING: Producer interrupted by user.");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    if let Some(producer) = &producer {
        // Let in-flight deliveries finish before dropping the producer
        let _ = producer.flush(Timeout::After(SEND_TIMEOUT));
        log::info!("Kafka producer closed ({} messages sent).", sent);
    }
    log::info!("Producer shutting down.");
}
