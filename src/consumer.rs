//! Stream consumer loop.
//!
//! Startup walks three operator-visible checks before entering steady state:
//! broker reachability, consumer construction + subscription, and topic
//! existence. Each failure is fatal within this run and carries its own exit
//! code so "restart the broker" is distinguishable from "run the producer
//! first". There is no in-process reconnect: remediation is an operator
//! restart, matching the startup contract.
//!
//! Steady state pulls records in commit order, decodes, folds, snapshots,
//! and publishes — once per successfully decoded record. Decode failures
//! skip the record and keep the loop alive. The topic is consumed with
//! at-least-once delivery and no deduplication: a redelivered record is
//! folded again. Accepted, not hidden.

use {
    crate::config::Config,
    crate::decoder,
    crate::publisher::SnapshotSink,
    crate::stats::ScoreBoard,
    rdkafka::{
        config::ClientConfig,
        consumer::{BaseConsumer, Consumer, StreamConsumer},
        error::KafkaError,
        Message,
    },
    std::time::Duration,
};

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Startup failures, each with a distinct operator-facing exit code.
#[derive(Debug)]
pub enum StartupError {
    BrokerUnreachable(KafkaError),
    ConsumerCreation(KafkaError),
    TopicMissing(String),
}

impl StartupError {
    /// Exit code contract: 11 broker unreachable, 12 consumer construction
    /// failed, 13 topic absent. Zero is reserved for clean shutdown.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::BrokerUnreachable(_) => 11,
            StartupError::ConsumerCreation(_) => 12,
            StartupError::TopicMissing(_) => 13,
        }
    }
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::BrokerUnreachable(e) => {
                write!(f, "Kafka broker is not reachable: {}", e)
            }
            StartupError::ConsumerCreation(e) => {
                write!(f, "Could not create Kafka consumer: {}", e)
            }
            StartupError::TopicMissing(topic) => {
                write!(
                    f,
                    "Topic '{}' does not exist. Run the producer first.",
                    topic
                )
            }
        }
    }
}

impl std::error::Error for StartupError {}

/// Verifying: confirm the broker answers a metadata request at all.
pub fn verify_broker(config: &Config) -> Result<(), StartupError> {
    let probe: BaseConsumer = ClientConfig::new()
        .set("bootstrap.servers", &config.broker_address)
        .set("group.id", &config.group_id)
        .create()
        .map_err(StartupError::BrokerUnreachable)?;

    probe
        .fetch_metadata(None, METADATA_TIMEOUT)
        .map_err(StartupError::BrokerUnreachable)?;

    Ok(())
}

/// Subscribing: build the streaming consumer and attach it to the topic
/// under the configured group.
pub fn create_consumer(config: &Config) -> Result<StreamConsumer, StartupError> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &config.broker_address)
        .set("group.id", &config.group_id)
        .set("enable.partition.eof", "false")
        .set("session.timeout.ms", "6000")
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .create()
        .map_err(StartupError::ConsumerCreation)?;

    consumer
        .subscribe(&[config.topic.as_str()])
        .map_err(StartupError::ConsumerCreation)?;

    Ok(consumer)
}

/// AwaitingTopic: distinguish "broker up but topic never created" from
/// "broker down". The topic must be present with at least one partition.
pub fn ensure_topic_exists(consumer: &StreamConsumer, topic: &str) -> Result<(), StartupError> {
    let metadata = consumer
        .fetch_metadata(Some(topic), METADATA_TIMEOUT)
        .map_err(|_| StartupError::TopicMissing(topic.to_string()))?;

    let present = metadata
        .topics()
        .iter()
        .any(|t| t.name() == topic && t.error().is_none() && !t.partitions().is_empty());

    if present {
        Ok(())
    } else {
        Err(StartupError::TopicMissing(topic.to_string()))
    }
}

/// The per-record step: decode, fold, snapshot, publish.
///
/// Returns true when the record was folded. A malformed payload is logged
/// and skipped; a publish failure is logged but never unwinds past here —
/// only startup conditions may terminate the process.
pub async fn apply_record(
    board: &mut ScoreBoard,
    payload: &[u8],
    sink: &mut dyn SnapshotSink,
) -> bool {
    match decoder::decode(payload) {
        Ok(event) => {
            board.fold(event);
            let snapshot = board.snapshot();
            if let Err(e) = sink.publish(snapshot).await {
                log::warn!("Snapshot publish failed: {}", e);
            }
            true
        }
        Err(e) => {
            log::warn!("⚠️ Skipping record: {}", e);
            false
        }
    }
}

/// Consuming: pull records in commit order until cancelled.
///
/// The shutdown signal is observed at the `recv()` suspension point; the
/// in-flight fold/publish always completes before the loop drains, so count
/// and total_score never diverge. Dropping the consumer on return releases
/// the group membership.
pub async fn consume_stream(consumer: StreamConsumer, sink: &mut dyn SnapshotSink) -> u64 {
    let mut board = ScoreBoard::new();
    let mut processed = 0u64;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    log::info!("🎧 Consuming messages (ctrl-c to stop)...");

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                log::info!("⏹ Interrupt received, draining...");
                break;
            }
            received = consumer.recv() => {
                match received {
                    Ok(message) => {
                        let payload = message.payload().unwrap_or_default();
                        if apply_record(&mut board, payload, sink).await {
                            processed += 1;
                        }
                    }
                    Err(e) => {
                        log::warn!("Kafka receive error: {}, continuing to poll", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
        }
    }

    log::info!(
        "✅ Drained: {} events folded across {} categories",
        processed,
        board.category_count()
    );
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::SinkError;
    use crate::stats::Snapshot;
    use async_trait::async_trait;

    /// Sink that records every published snapshot.
    struct CollectSink {
        snapshots: Vec<Snapshot>,
    }

    #[async_trait]
    impl SnapshotSink for CollectSink {
        async fn publish(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
            self.snapshots.push(snapshot);
            Ok(())
        }
    }

    #[test]
    fn test_startup_exit_codes_are_distinct() {
        let broker = StartupError::BrokerUnreachable(KafkaError::Canceled);
        let creation = StartupError::ConsumerCreation(KafkaError::Canceled);
        let topic = StartupError::TopicMissing("game_reviews".to_string());

        assert_ne!(broker.exit_code(), creation.exit_code());
        assert_ne!(creation.exit_code(), topic.exit_code());
        assert_ne!(broker.exit_code(), topic.exit_code());
        assert!(broker.exit_code() != 0);
        assert!(creation.exit_code() != 0);
        assert!(topic.exit_code() != 0);
    }

    #[tokio::test]
    async fn test_malformed_record_is_skipped_not_fatal() {
        let mut board = ScoreBoard::new();
        let mut sink = CollectSink { snapshots: vec![] };

        let records: [&[u8]; 4] = [
            br#"{"category": "Horror", "Review Score": 60}"#,
            b"definitely not json",
            br#"{"category": "Horror", "Review Score": 70}"#,
            br#"{"category": "Action", "Review Score": 80}"#,
        ];

        let mut folded = 0;
        for payload in records {
            if apply_record(&mut board, payload, &mut sink).await {
                folded += 1;
            }
        }

        // three valid records folded, one skipped, one snapshot per fold
        assert_eq!(folded, 3);
        assert_eq!(board.total_events(), 3);
        assert_eq!(sink.snapshots.len(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_published_after_every_fold() {
        let mut board = ScoreBoard::new();
        let mut sink = CollectSink { snapshots: vec![] };

        apply_record(&mut board, br#"{"category": "A", "Review Score": 10}"#, &mut sink).await;
        apply_record(&mut board, br#"{"category": "B", "Review Score": 20}"#, &mut sink).await;
        apply_record(&mut board, br#"{"category": "A", "Review Score": 30}"#, &mut sink).await;

        assert_eq!(sink.snapshots.len(), 3);
        // each snapshot reflects the deterministic prefix of the stream
        assert_eq!(sink.snapshots[0].total_events, 1);
        assert_eq!(sink.snapshots[1].total_events, 2);
        assert_eq!(sink.snapshots[2].total_events, 3);

        let last = &sink.snapshots[2];
        let a = last.get("A").unwrap();
        assert_eq!(a.count, 2);
        assert!((a.average_score - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_stop_folding() {
        struct ClosedSink;

        #[async_trait]
        impl SnapshotSink for ClosedSink {
            async fn publish(&mut self, _snapshot: Snapshot) -> Result<(), SinkError> {
                Err(SinkError::Closed)
            }
        }

        let mut board = ScoreBoard::new();
        let mut sink = ClosedSink;

        let folded =
            apply_record(&mut board, br#"{"category": "RPG", "Review Score": 90}"#, &mut sink)
                .await;
        assert!(folded);
        assert_eq!(board.total_events(), 1);
    }
}
