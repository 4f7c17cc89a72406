use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use serde::Serialize;

use crate::events::{Handler, InteractionEvent, MessageBroker, OrderPlacedEvent};

/// Fire-and-forget publishing onto the broker. Failures are logged, never returned.
#[derive(Clone)]
pub struct EventPublisher {
    broker: Arc<dyn MessageBroker>,
}

impl EventPublisher {
    pub fn new(broker: Arc<dyn MessageBroker>) -> Self {
        Self { broker }
    }

    pub async fn publish<E: Serialize + Sync + ?Sized>(&self, topic: &str, key: Option<&str>, event: &E) -> bool {
        let payload = match serde_json::to_vec(event) {
            Ok(p) => p,
            Err(e) => {
                error!("📬️ Could not serialize event for {topic}. {e}");
                return false;
            },
        };
        match self.broker.publish(topic, key, payload).await {
            Ok(()) => {
                trace!("📬️ Event published to {topic}");
                true
            },
            Err(e) => {
                warn!("📬️ Event for {topic} was not delivered. {e}");
                false
            },
        }
    }
}

/// An order-placed hook that publishes one `purchase` interaction per line item, keyed by account id.
///
/// Runs on the hook's own task, so the request that placed the order never waits on the broker.
pub fn interaction_events_hook(publisher: EventPublisher, topic: String) -> Handler<OrderPlacedEvent> {
    Arc::new(move |ev: OrderPlacedEvent| {
        let publisher = publisher.clone();
        let topic = topic.clone();
        Box::pin(async move {
            let key = ev.order.order.account_id.to_string();
            let events = InteractionEvent::purchases_for(&ev.order);
            let total = events.len();
            let mut sent = 0;
            for event in events {
                if publisher.publish(&topic, Some(&key), &event).await {
                    sent += 1;
                }
            }
            debug!("📬️ {sent}/{total} purchase events published for order #{}", ev.order.order.id);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    })
}
