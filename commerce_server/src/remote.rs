//! JSON-over-HTTP clients for the services the order and payment services depend on.
use std::time::Duration;

use async_trait::async_trait;
use commerce_engine::{
    db_types::{Cents, TransactionStatus},
    traits::{AccountDirectory, CatalogClient, CatalogProduct, OrderStatusUpdater, RemoteCallError},
};
use log::*;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::ServerError;

#[derive(Clone)]
struct RemoteService {
    base_url: String,
    client: Client,
}

impl RemoteService {
    fn new(base_url: &str, timeout: Duration) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::InitializeError(format!("Could not create HTTP client. {e}")))?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, RemoteCallError> {
        let url = self.url(path);
        trace!("💻️ {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = req.send().await.map_err(|e| RemoteCallError::Unavailable(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(RemoteCallError::from_status(status, message))
    }
}

//-------------------------------------------------  Catalog  ----------------------------------------------------------
/// The catalog's wire format. Prices are decimal amounts in major units.
#[derive(Debug, Clone, Deserialize)]
struct CatalogProductDto {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: f64,
    #[serde(default)]
    account_id: Option<i64>,
}

impl TryFrom<CatalogProductDto> for CatalogProduct {
    type Error = RemoteCallError;

    fn try_from(dto: CatalogProductDto) -> Result<Self, Self::Error> {
        let price = Cents::from_major_units(dto.price)
            .map_err(|e| RemoteCallError::Decode(format!("Product {} has an invalid price. {e}", dto.id)))?;
        Ok(Self {
            id: dto.id,
            name: dto.name,
            description: dto.description.unwrap_or_default(),
            price,
            account_id: dto.account_id,
        })
    }
}

#[derive(Clone)]
pub struct HttpCatalogClient {
    remote: RemoteService,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServerError> {
        Ok(Self { remote: RemoteService::new(base_url, timeout)? })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_products(&self, product_ids: &[String]) -> Result<Vec<CatalogProduct>, RemoteCallError> {
        let body = json!({ "ids": product_ids });
        let response = self.remote.send(Method::POST, "/products/lookup", Some(&body)).await?;
        let products = response
            .json::<Vec<CatalogProductDto>>()
            .await
            .map_err(|e| RemoteCallError::Decode(e.to_string()))?;
        trace!("💻️ Catalog returned {} of {} requested products", products.len(), product_ids.len());
        products.into_iter().map(CatalogProduct::try_from).collect()
    }
}

//-------------------------------------------------  Accounts  ---------------------------------------------------------
#[derive(Clone)]
pub struct HttpAccountDirectory {
    remote: RemoteService,
}

impl HttpAccountDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServerError> {
        Ok(Self { remote: RemoteService::new(base_url, timeout)? })
    }
}

#[async_trait]
impl AccountDirectory for HttpAccountDirectory {
    async fn account_exists(&self, account_id: i64) -> Result<bool, RemoteCallError> {
        let path = format!("/accounts/{account_id}");
        match self.remote.send::<()>(Method::GET, &path, None).await {
            Ok(_) => Ok(true),
            Err(RemoteCallError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

//-------------------------------------------------  Order status  -----------------------------------------------------
#[derive(Clone)]
pub struct HttpOrderStatusClient {
    remote: RemoteService,
}

impl HttpOrderStatusClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServerError> {
        Ok(Self { remote: RemoteService::new(base_url, timeout)? })
    }
}

#[async_trait]
impl OrderStatusUpdater for HttpOrderStatusClient {
    async fn update_order_status(&self, order_id: i64, status: TransactionStatus) -> Result<(), RemoteCallError> {
        let path = format!("/orders/{order_id}/status");
        let body = json!({ "status": status });
        self.remote.send(Method::PUT, &path, Some(&body)).await?;
        debug!("💻️ Order #{order_id} was updated to {status}");
        Ok(())
    }
}
