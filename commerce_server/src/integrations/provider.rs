use async_trait::async_trait;
use commerce_engine::{
    db_types::Cents,
    traits::{CheckoutLine, PaymentProvider, ProviderProductDetails, RemoteCallError},
};
use log::*;
use payment_provider::{CartItem, ProductUpdate, ProviderApi, ProviderApiError};

/// The hosted payment provider, as seen by the payment engine.
#[derive(Clone)]
pub struct HostedPaymentProvider {
    api: ProviderApi,
}

impl HostedPaymentProvider {
    pub fn new(api: ProviderApi) -> Self {
        Self { api }
    }
}

fn remote_error(e: ProviderApiError) -> RemoteCallError {
    match e {
        ProviderApiError::QueryError { status, message } => RemoteCallError::from_status(status, message),
        ProviderApiError::JsonError(s) => RemoteCallError::Decode(s),
        ProviderApiError::RestResponseError(s) | ProviderApiError::Initialization(s) => RemoteCallError::Unavailable(s),
    }
}

fn cart_item(line: CheckoutLine) -> Result<CartItem, RemoteCallError> {
    let quantity = u32::try_from(line.quantity).map_err(|_| {
        RemoteCallError::InvalidArgument(format!("{} is not a valid quantity for a checkout", line.quantity))
    })?;
    Ok(CartItem { product_id: line.provider_product_id, quantity })
}

#[async_trait]
impl PaymentProvider for HostedPaymentProvider {
    fn currency(&self) -> String {
        self.api.config().currency.clone()
    }

    async fn create_product(&self, product: ProviderProductDetails) -> Result<String, RemoteCallError> {
        let result = self
            .api
            .create_product(&product.name, product.description.as_deref(), product.price.value())
            .await
            .map_err(remote_error)?;
        Ok(result.product_id)
    }

    async fn update_product(
        &self,
        provider_product_id: &str,
        name: Option<String>,
        price: Option<Cents>,
    ) -> Result<(), RemoteCallError> {
        let update =
            ProductUpdate { name, description: None, price: price.map(|p| self.api.one_time_price(p.value())) };
        if update.is_empty() {
            trace!("💳️ Nothing to update for provider product {provider_product_id}");
            return Ok(());
        }
        self.api.update_product(provider_product_id, update).await.map_err(remote_error)
    }

    async fn archive_product(&self, provider_product_id: &str) -> Result<(), RemoteCallError> {
        self.api.archive_product(provider_product_id).await.map_err(remote_error)
    }

    async fn create_customer(&self, email: &str, name: &str) -> Result<String, RemoteCallError> {
        let customer = self.api.create_customer(email, name).await.map_err(remote_error)?;
        Ok(customer.customer_id)
    }

    async fn create_checkout_session(
        &self,
        provider_customer_id: &str,
        lines: Vec<CheckoutLine>,
        return_url: &str,
        order_id: i64,
        user_id: i64,
    ) -> Result<String, RemoteCallError> {
        let cart = lines.into_iter().map(cart_item).collect::<Result<Vec<_>, _>>()?;
        let session = self
            .api
            .create_checkout_session(provider_customer_id, cart, return_url, order_id, user_id)
            .await
            .map_err(remote_error)?;
        Ok(session.checkout_url)
    }

    async fn create_customer_portal_session(&self, provider_customer_id: &str) -> Result<String, RemoteCallError> {
        self.api.create_customer_portal_session(provider_customer_id).await.map_err(remote_error)
    }
}
