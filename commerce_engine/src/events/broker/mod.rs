//! Message broker abstraction.
//!
//! Two backends are provided. [`channel::ChannelBroker`] keeps an in-process log per topic and needs no external
//! infrastructure; it is the default, and what the tests run against. The Kafka backend (cargo feature `kafka`)
//! connects to a real cluster and commits offsets manually.
//!
//! Consumers must only [`Subscription::commit`] a delivery once it has been fully handled. A consumer that restarts
//! resumes from the message after its last commit.
use async_trait::async_trait;
use thiserror::Error;

pub mod channel;
#[cfg(feature = "kafka")]
pub mod kafka;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("Could not connect to the message broker. {0}")]
    Connection(String),
    #[error("Could not publish message. {0}")]
    Publish(String),
    #[error("Could not receive message. {0}")]
    Receive(String),
    #[error("Could not commit message offset. {0}")]
    Commit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

#[async_trait]
pub trait Subscription: Send {
    /// Waits for the next message. `None` means the subscription has ended for good.
    async fn next_delivery(&mut self) -> Option<Result<Delivery, BrokerError>>;

    async fn commit(&mut self, delivery: &Delivery) -> Result<(), BrokerError>;
}

#[async_trait]
pub trait MessageBroker: Send + Sync {
    async fn publish(&self, topic: &str, key: Option<&str>, payload: Vec<u8>) -> Result<(), BrokerError>;

    async fn subscribe(&self, topic: &str) -> Result<Box<dyn Subscription>, BrokerError>;
}
