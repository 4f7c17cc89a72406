use crate::{
    db::traits::OrderStoreError,
    db_types::{NewOrder, Order, OrderWithItems, TransactionStatus},
};

/// The `OrderManagement` trait defines the behaviour for storing and querying orders in the database backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores the order and every line item in a single atomic write. If any line item fails to insert, nothing is
    /// stored.
    async fn insert_order(&self, order: NewOrder) -> Result<OrderWithItems, OrderStoreError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderWithItems>, OrderStoreError>;

    /// All orders for the account, oldest first.
    async fn fetch_orders_for_account(&self, account_id: i64) -> Result<Vec<OrderWithItems>, OrderStoreError>;

    /// Records the payment outcome for the order, and moves the order status to match it.
    async fn update_order_status(&self, order_id: i64, status: TransactionStatus) -> Result<Order, OrderStoreError>;
}
