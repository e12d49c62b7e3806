use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::sync::Arc;
use std::time::Duration;

use crate::common::{ApplicationError, ApplicationResult};
use crate::config::KafkaConfig;
use crate::domains::building_map::{BuildingMapSnapshot, MapPublisher};

use super::snapshot_codec::SnapshotFormat;

/// Publishes the map to a Kafka topic keyed by map name.
///
/// Late consumers see the map only if the topic is compacted (or retains it)
/// and they read from the earliest offset.
pub struct KafkaMapPublisher {
    producer: FutureProducer,
    topic: String,
    format: SnapshotFormat,
}

impl KafkaMapPublisher {
    pub fn new(config: &KafkaConfig, topic: &str, format: SnapshotFormat) -> ApplicationResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("client.id", &config.client_id)
            .set("acks", "all")
            .set("enable.idempotence", "true")
            .set("message.max.bytes", config.max_message_bytes.to_string())
            .create()
            .map_err(|e| ApplicationError::Transport(format!("Failed to create Kafka producer: {}", e)))?;

        tracing::warn!("Topic {} must be compacted for late subscribers to receive the map", topic);

        Ok(Self {
            producer,
            topic: topic.to_string(),
            format,
        })
    }
}

#[async_trait]
impl MapPublisher for KafkaMapPublisher {
    async fn publish(&self, snapshot: Arc<BuildingMapSnapshot>) -> ApplicationResult<()> {
        let payload = self.format.encode(&snapshot)?;
        let record = FutureRecord::to(&self.topic).key(&snapshot.name).payload(&payload);

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| ApplicationError::Transport(format!("Failed to send map to Kafka: {}", e)))?;

        tracing::info!("published {} byte map payload to {}", payload.len(), self.topic);
        Ok(())
    }
}
