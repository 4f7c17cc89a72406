use std::{collections::HashMap, sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::ProviderConfig,
    data_objects::{
        CartItem,
        CheckoutRequest,
        CheckoutSession,
        CustomerRef,
        NewProviderCustomer,
        NewProviderProduct,
        PortalSession,
        ProductPrice,
        ProductUpdate,
        ProviderCustomer,
        ProviderProduct,
    },
    ProviderApiError,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ProviderApi {
    config: ProviderConfig,
    client: Arc<Client>,
}

impl ProviderApi {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderApiError> {
        Self::new_with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn new_with_timeout(config: ProviderConfig, timeout: Duration) -> Result<Self, ProviderApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<reqwest::Response, ProviderApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ProviderApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ProviderApiError::RestResponseError(e.to_string()))?;
            Err(ProviderApiError::QueryError { status, message })
        }
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, ProviderApiError> {
        let response = self.send(method, path, body).await?;
        response.json::<T>().await.map_err(|e| ProviderApiError::JsonError(e.to_string()))
    }

    /// Like [`Self::rest_query`], for endpoints whose response body carries nothing of interest.
    pub async fn rest_command<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<(), ProviderApiError> {
        let _ = self.send(method, path, body).await?;
        Ok(())
    }

    pub fn one_time_price(&self, price: i64) -> ProductPrice {
        ProductPrice::one_time(price, &self.config.currency)
    }

    pub async fn create_product(
        &self,
        name: &str,
        description: Option<&str>,
        price: i64,
    ) -> Result<ProviderProduct, ProviderApiError> {
        let product = NewProviderProduct {
            name: name.to_string(),
            description: description.map(String::from),
            price: self.one_time_price(price),
            tax_category: self.config.tax_category.clone(),
        };
        debug!("💳️ Creating provider product '{name}' at {price}");
        let result = self.rest_query::<ProviderProduct, _>(Method::POST, "/products", Some(product)).await?;
        info!("💳️ Created provider product {}", result.product_id);
        Ok(result)
    }

    pub async fn update_product(&self, provider_product_id: &str, update: ProductUpdate) -> Result<(), ProviderApiError> {
        let path = format!("/products/{provider_product_id}");
        debug!("💳️ Updating provider product {provider_product_id}");
        self.rest_command(Method::PATCH, &path, Some(update)).await?;
        info!("💳️ Updated provider product {provider_product_id}");
        Ok(())
    }

    pub async fn archive_product(&self, provider_product_id: &str) -> Result<(), ProviderApiError> {
        let path = format!("/products/{provider_product_id}/archive");
        debug!("💳️ Archiving provider product {provider_product_id}");
        self.rest_command::<()>(Method::POST, &path, None).await?;
        info!("💳️ Archived provider product {provider_product_id}");
        Ok(())
    }

    pub async fn create_customer(&self, email: &str, name: &str) -> Result<ProviderCustomer, ProviderApiError> {
        let customer = NewProviderCustomer { email: email.to_string(), name: name.to_string() };
        debug!("💳️ Creating provider customer for {email}");
        let result = self.rest_query::<ProviderCustomer, _>(Method::POST, "/customers", Some(customer)).await?;
        info!("💳️ Created provider customer {}", result.customer_id);
        Ok(result)
    }

    pub async fn create_customer_portal_session(&self, customer_id: &str) -> Result<String, ProviderApiError> {
        let path = format!("/customers/{customer_id}/customer-portal/session");
        let session = self.rest_query::<PortalSession, ()>(Method::POST, &path, None).await?;
        debug!("💳️ Opened customer portal session for {customer_id}");
        Ok(session.link)
    }

    /// Opens a hosted checkout for an existing provider customer. `order_id` and `user_id` travel with the session as
    /// metadata, and come back in the payment webhooks.
    pub async fn create_checkout_session(
        &self,
        customer_id: &str,
        cart: Vec<CartItem>,
        return_url: &str,
        order_id: i64,
        user_id: i64,
    ) -> Result<CheckoutSession, ProviderApiError> {
        let metadata = HashMap::from([
            ("order_id".to_string(), order_id.to_string()),
            ("user_id".to_string(), user_id.to_string()),
        ]);
        let request = CheckoutRequest {
            customer: CustomerRef { customer_id: customer_id.to_string() },
            product_cart: cart,
            return_url: return_url.to_string(),
            metadata,
        };
        debug!("💳️ Creating checkout session for order #{order_id}");
        let session = self.rest_query::<CheckoutSession, _>(Method::POST, "/checkouts", Some(request)).await?;
        info!("💳️ Checkout session {} created for order #{order_id}", session.session_id);
        Ok(session)
    }
}
