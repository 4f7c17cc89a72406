use async_trait::async_trait;

use crate::{db_types::TransactionStatus, traits::RemoteCallError};

/// Pushes a payment outcome to the order store, which may live in another process.
#[async_trait]
pub trait OrderStatusUpdater: Send + Sync {
    async fn update_order_status(&self, order_id: i64, status: TransactionStatus) -> Result<(), RemoteCallError>;
}
