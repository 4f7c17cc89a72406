//! Mirrors catalog product changes into the payment provider.
//!
//! The consumer reads `product_events`, turns each message into a [`ProductLifecycleEvent`] and applies it through the
//! [`PaymentApi`]. A message's offset is only committed once it has been handled, so a consumer that stops part-way
//! through sees the same message again on restart. Every handler is idempotent, which makes that redelivery harmless.
use std::{sync::Arc, time::Duration};

use log::*;
use thiserror::Error;
use tokio::sync::watch;

use crate::{
    api::{errors::PaymentApiError, payment_api::PaymentApi, payment_objects::ProductSyncOutcome},
    db::traits::PaymentProjection,
    events::{BrokerError, Delivery, MessageBroker, ProductLifecycleEvent},
};

#[derive(Debug, Clone, Error)]
pub enum CatalogSyncError {
    #[error("Catalog event subscription failed. {0}")]
    Broker(#[from] BrokerError),
}

pub struct CatalogEventConsumer<B> {
    api: PaymentApi<B>,
    broker: Arc<dyn MessageBroker>,
    topic: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<B> CatalogEventConsumer<B> {
    pub fn new(api: PaymentApi<B>, broker: Arc<dyn MessageBroker>, topic: &str) -> Self {
        Self { api, broker, topic: topic.to_string(), max_attempts: 3, retry_delay: Duration::from_millis(500) }
    }

    /// How often a message is attempted when the provider or database is failing, and the base delay between
    /// attempts. The delay grows linearly with each attempt.
    pub fn with_retries(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }
}

impl<B> CatalogEventConsumer<B>
where B: PaymentProjection
{
    /// Consumes catalog events until `shutdown` flips to `true` (or its sender is dropped), or the subscription ends.
    ///
    /// Returns the number of messages that were handled and committed.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<u64, CatalogSyncError> {
        let mut subscription = self.broker.subscribe(&self.topic).await?;
        info!("🔄️ Consuming catalog events from '{}'", self.topic);
        let mut handled = 0u64;
        loop {
            if *shutdown.borrow() {
                break;
            }
            let next = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                },
                next = subscription.next_delivery() => next,
            };
            let delivery = match next {
                Some(Ok(delivery)) => delivery,
                Some(Err(e)) => {
                    warn!("🔄️ Error receiving catalog event. {e}");
                    continue;
                },
                None => {
                    info!("🔄️ Catalog event subscription has ended");
                    break;
                },
            };
            if !self.handle_with_retries(&delivery, &mut shutdown).await {
                info!("🔄️ Shutdown requested while handling offset {}. It will be redelivered.", delivery.offset);
                break;
            }
            match subscription.commit(&delivery).await {
                Ok(()) => handled += 1,
                Err(e) => warn!("🔄️ Could not commit offset {} on '{}'. {e}", delivery.offset, self.topic),
            }
        }
        info!("🔄️ Catalog event consumer stopped after handling {handled} messages");
        Ok(handled)
    }

    /// Returns `false` if shutdown was requested before the message could be handled.
    async fn handle_with_retries(&self, delivery: &Delivery, shutdown: &mut watch::Receiver<bool>) -> bool {
        let mut attempt = 1;
        loop {
            match self.handle(&delivery.payload).await {
                Ok(_) => return true,
                Err(e) if attempt < self.max_attempts && is_transient(&e) => {
                    warn!("🔄️ Attempt {attempt} to handle offset {} failed. {e}", delivery.offset);
                    let delay = self.retry_delay * attempt;
                    tokio::select! {
                        _ = shutdown.changed() => return false,
                        _ = tokio::time::sleep(delay) => {},
                    }
                    attempt += 1;
                },
                Err(e) => {
                    error!("🔄️ Giving up on catalog event at offset {} after {attempt} attempts. {e}", delivery.offset);
                    return true;
                },
            }
        }
    }

    /// Applies one raw message. Malformed messages are logged and count as handled.
    pub async fn handle(&self, payload: &[u8]) -> Result<Option<ProductSyncOutcome>, PaymentApiError> {
        let event = match ProductLifecycleEvent::from_json(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!("🔄️ Skipping malformed catalog event. {e}");
                return Ok(None);
            },
        };
        debug!("🔄️ Applying catalog event for product {}", event.product_id());
        let outcome = match event {
            ProductLifecycleEvent::Created { product_id, name, description, price } => {
                self.api.register_product(&product_id, &name, description.as_deref(), price).await?
            },
            ProductLifecycleEvent::Updated { product_id, name, price } => {
                self.api.update_product(&product_id, name.as_deref(), price).await?
            },
            ProductLifecycleEvent::Deleted { product_id } => self.api.archive_product(&product_id).await?,
        };
        Ok(Some(outcome))
    }
}

fn is_transient(e: &PaymentApiError) -> bool {
    matches!(e, PaymentApiError::UpstreamUnavailable(_) | PaymentApiError::DatabaseError(_))
}
