mod broker;
mod catalog_consumer;
mod channel;
mod event_types;
mod hooks;
mod publisher;

#[cfg(feature = "kafka")]
pub use broker::kafka::{KafkaBroker, KafkaConfig};
pub use broker::{
    channel::ChannelBroker,
    BrokerError,
    Delivery,
    MessageBroker,
    Subscription,
};
pub use catalog_consumer::{CatalogEventConsumer, CatalogSyncError};
pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
pub use publisher::{interaction_events_hook, EventPublisher};
