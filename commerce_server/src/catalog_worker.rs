use std::sync::Arc;

use commerce_engine::{
    events::{CatalogEventConsumer, MessageBroker},
    PaymentApi,
    SqliteDatabase,
};
use log::*;
use tokio::{sync::watch, task::JoinHandle};

pub struct CatalogWorkerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CatalogWorkerHandle {
    /// Signals the worker to stop and waits for it. A message that is mid-flight is left uncommitted.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!("🔄️ Catalog sync worker did not shut down cleanly. {e}");
        }
    }
}

/// Starts the catalog sync worker, which mirrors catalog product changes into the payment provider.
pub fn start_catalog_worker(
    api: PaymentApi<SqliteDatabase>,
    broker: Arc<dyn MessageBroker>,
    topic: &str,
) -> CatalogWorkerHandle {
    let (shutdown, signal) = watch::channel(false);
    let consumer = CatalogEventConsumer::new(api, broker, topic);
    let task = tokio::spawn(async move {
        info!("🔄️ Catalog sync worker started");
        match consumer.run(signal).await {
            Ok(count) => info!("🔄️ Catalog sync worker stopped after handling {count} events"),
            Err(e) => error!("🔄️ Catalog sync worker stopped. {e}"),
        }
    });
    CatalogWorkerHandle { shutdown, task }
}
