use std::time::Duration;

use async_trait::async_trait;
use log::*;
use rdkafka::{
    consumer::{CommitMode, Consumer, StreamConsumer},
    producer::{FutureProducer, FutureRecord},
    ClientConfig,
    Message,
    Offset,
    TopicPartitionList,
};

use super::{BrokerError, Delivery, MessageBroker, Subscription};

#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Comma-separated list of `host:port` pairs
    pub bootstrap_servers: String,
    pub group_id: String,
    pub message_timeout: Duration,
}

impl KafkaConfig {
    pub fn new(bootstrap_servers: &str, group_id: &str) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.to_string(),
            group_id: group_id.to_string(),
            message_timeout: Duration::from_secs(5),
        }
    }
}

pub struct KafkaBroker {
    config: KafkaConfig,
    producer: FutureProducer,
}

impl KafkaBroker {
    pub fn new(config: KafkaConfig) -> Result<Self, BrokerError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("message.timeout.ms", config.message_timeout.as_millis().to_string())
            .set("acks", "all")
            .create::<FutureProducer>()
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        info!("📬️ Kafka producer connected to {}", config.bootstrap_servers);
        Ok(Self { config, producer })
    }
}

#[async_trait]
impl MessageBroker for KafkaBroker {
    async fn publish(&self, topic: &str, key: Option<&str>, payload: Vec<u8>) -> Result<(), BrokerError> {
        let mut record = FutureRecord::<str, Vec<u8>>::to(topic).payload(&payload);
        if let Some(key) = key {
            record = record.key(key);
        }
        let (partition, offset) = self
            .producer
            .send(record, self.config.message_timeout)
            .await
            .map_err(|(e, _)| BrokerError::Publish(e.to_string()))?;
        trace!("📬️ Published to {topic} [{partition}] @ {offset}");
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Box<dyn Subscription>, BrokerError> {
        let consumer = ClientConfig::new()
            .set("bootstrap.servers", &self.config.bootstrap_servers)
            .set("group.id", &self.config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create::<StreamConsumer>()
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        consumer.subscribe(&[topic]).map_err(|e| BrokerError::Connection(e.to_string()))?;
        info!("📬️ Subscribed to {topic} as consumer group {}", self.config.group_id);
        Ok(Box::new(KafkaSubscription { consumer }))
    }
}

pub struct KafkaSubscription {
    consumer: StreamConsumer,
}

#[async_trait]
impl Subscription for KafkaSubscription {
    async fn next_delivery(&mut self) -> Option<Result<Delivery, BrokerError>> {
        let result = match self.consumer.recv().await {
            Ok(message) => Ok(Delivery {
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
                key: message.key().map(<[u8]>::to_vec),
                payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            }),
            Err(e) => Err(BrokerError::Receive(e.to_string())),
        };
        Some(result)
    }

    async fn commit(&mut self, delivery: &Delivery) -> Result<(), BrokerError> {
        let mut offsets = TopicPartitionList::new();
        offsets
            .add_partition_offset(&delivery.topic, delivery.partition, Offset::Offset(delivery.offset + 1))
            .map_err(|e| BrokerError::Commit(e.to_string()))?;
        self.consumer.commit(&offsets, CommitMode::Async).map_err(|e| BrokerError::Commit(e.to_string()))
    }
}
