use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPrice {
    #[serde(rename = "type")]
    pub price_type: String,
    /// Integer minor units
    pub price: i64,
    pub currency: String,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub purchasing_power_parity: bool,
}

impl ProductPrice {
    pub fn one_time(price: i64, currency: &str) -> Self {
        Self {
            price_type: "one_time_price".to_string(),
            price,
            currency: currency.to_string(),
            discount: 0,
            purchasing_power_parity: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProviderProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: ProductPrice,
    pub tax_category: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<ProductPrice>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderProduct {
    pub product_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProviderCustomer {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCustomer {
    pub customer_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerRef {
    pub customer_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub customer: CustomerRef,
    pub product_cart: Vec<CartItem>,
    pub return_url: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub session_id: String,
    pub checkout_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalSession {
    pub link: String,
}
