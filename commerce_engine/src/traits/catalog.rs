use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{db_types::Cents, traits::RemoteCallError};

/// A product as the catalog currently describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Cents,
    pub account_id: Option<i64>,
}

/// Read-only lookup of current product names, descriptions and prices.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Batched lookup. Ids the catalog does not know about are absent from the result.
    async fn fetch_products(&self, product_ids: &[String]) -> Result<Vec<CatalogProduct>, RemoteCallError>;
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn account_exists(&self, account_id: i64) -> Result<bool, RemoteCallError>;
}
