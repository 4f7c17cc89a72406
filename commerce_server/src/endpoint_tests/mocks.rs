use commerce_engine::{
    db_types::{
        Cents,
        NewOrder,
        NewPaymentCustomer,
        NewPaymentProduct,
        NewTransaction,
        Order,
        OrderWithItems,
        PaymentCustomer,
        PaymentProduct,
        Transaction,
        TransactionStatus,
    },
    InsertOutcome,
    OrderManagement,
    OrderStoreError,
    PaymentProjection,
    ProjectionError,
    UpsertOutcome,
};
use mockall::mock;

mock! {
    pub OrderStore {}
    impl OrderManagement for OrderStore {
        async fn insert_order(&self, order: NewOrder) -> Result<OrderWithItems, OrderStoreError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderWithItems>, OrderStoreError>;
        async fn fetch_orders_for_account(&self, account_id: i64) -> Result<Vec<OrderWithItems>, OrderStoreError>;
        async fn update_order_status(&self, order_id: i64, status: TransactionStatus) -> Result<Order, OrderStoreError>;
    }
}

mock! {
    pub ProjectionStore {}
    impl PaymentProjection for ProjectionStore {
        async fn fetch_customer(&self, user_id: i64) -> Result<Option<PaymentCustomer>, ProjectionError>;
        async fn insert_customer(&self, customer: NewPaymentCustomer) -> Result<InsertOutcome, ProjectionError>;
        async fn fetch_product(&self, product_id: &str) -> Result<Option<PaymentProduct>, ProjectionError>;
        async fn fetch_products(&self, product_ids: &[String]) -> Result<Vec<PaymentProduct>, ProjectionError>;
        async fn insert_product(&self, product: NewPaymentProduct) -> Result<InsertOutcome, ProjectionError>;
        async fn update_product_details(&self, product_id: &str, name: &str, price: Cents) -> Result<Option<PaymentProduct>, ProjectionError>;
        async fn delete_product(&self, product_id: &str) -> Result<bool, ProjectionError>;
        async fn upsert_transaction(&self, transaction: NewTransaction) -> Result<(Transaction, UpsertOutcome), ProjectionError>;
        async fn fetch_transaction(&self, provider_payment_id: &str) -> Result<Option<Transaction>, ProjectionError>;
        async fn fetch_transactions_for_order(&self, order_id: i64) -> Result<Vec<Transaction>, ProjectionError>;
    }
}
