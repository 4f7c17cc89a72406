use async_trait::async_trait;

use crate::{db_types::Cents, traits::RemoteCallError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProductDetails {
    pub name: String,
    pub description: Option<String>,
    pub price: Cents,
}

/// One line of a hosted checkout, already mapped onto the provider's product id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub provider_product_id: String,
    pub quantity: i64,
}

/// The operations the engine needs from the hosted payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// The currency new products are priced in.
    fn currency(&self) -> String;

    /// Returns the provider's id for the new product.
    async fn create_product(&self, product: ProviderProductDetails) -> Result<String, RemoteCallError>;

    async fn update_product(
        &self,
        provider_product_id: &str,
        name: Option<String>,
        price: Option<Cents>,
    ) -> Result<(), RemoteCallError>;

    async fn archive_product(&self, provider_product_id: &str) -> Result<(), RemoteCallError>;

    /// Returns the provider's id for the new customer.
    async fn create_customer(&self, email: &str, name: &str) -> Result<String, RemoteCallError>;

    /// Returns the checkout URL.
    async fn create_checkout_session(
        &self,
        provider_customer_id: &str,
        lines: Vec<CheckoutLine>,
        return_url: &str,
        order_id: i64,
        user_id: i64,
    ) -> Result<String, RemoteCallError>;

    /// Returns the customer portal URL.
    async fn create_customer_portal_session(&self, provider_customer_id: &str) -> Result<String, RemoteCallError>;
}
