use crate::{
    db::traits::{InsertOutcome, ProjectionError, UpsertOutcome},
    db_types::{
        Cents,
        NewPaymentCustomer,
        NewPaymentProduct,
        NewTransaction,
        PaymentCustomer,
        PaymentProduct,
        Transaction,
    },
};

/// Local mirror of the provider-side objects the payment service cares about.
#[allow(async_fn_in_trait)]
pub trait PaymentProjection {
    async fn fetch_customer(&self, user_id: i64) -> Result<Option<PaymentCustomer>, ProjectionError>;

    /// Inserts the customer unless one already exists for the `user_id`, in which case the stored row wins.
    async fn insert_customer(&self, customer: NewPaymentCustomer) -> Result<InsertOutcome, ProjectionError>;

    async fn fetch_product(&self, product_id: &str) -> Result<Option<PaymentProduct>, ProjectionError>;

    /// Fetches the products for the given catalog ids. Unknown ids are skipped.
    async fn fetch_products(&self, product_ids: &[String]) -> Result<Vec<PaymentProduct>, ProjectionError>;

    /// Inserts the product unless the `product_id` is already mapped.
    async fn insert_product(&self, product: NewPaymentProduct) -> Result<InsertOutcome, ProjectionError>;

    /// Records the name and price last sent to the provider. Returns `None` if the product is not mapped.
    async fn update_product_details(
        &self,
        product_id: &str,
        name: &str,
        price: Cents,
    ) -> Result<Option<PaymentProduct>, ProjectionError>;

    /// Returns `true` if a row was deleted.
    async fn delete_product(&self, product_id: &str) -> Result<bool, ProjectionError>;

    /// Inserts the transaction, or updates the existing row with the same `provider_payment_id`. A `None` status
    /// leaves the stored status as it was (or `pending` for a new row).
    async fn upsert_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<(Transaction, UpsertOutcome), ProjectionError>;

    async fn fetch_transaction(&self, provider_payment_id: &str) -> Result<Option<Transaction>, ProjectionError>;

    async fn fetch_transactions_for_order(&self, order_id: i64) -> Result<Vec<Transaction>, ProjectionError>;
}
