use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Cents, LineItem, Order},
    traits::CatalogProduct,
};

/// One entry of a shopping cart, as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: String,
    pub quantity: i64,
}

impl CartEntry {
    pub fn new(product_id: &str, quantity: i64) -> Self {
        Self { product_id: product_id.to_string(), quantity }
    }
}

/// What the product looked like when it was bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub name: String,
    pub description: String,
    pub unit_price: Cents,
}

/// A line item as shown to the account holder: current catalog details where the product still exists, alongside the
/// snapshot taken at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedProduct {
    pub product_id: String,
    pub quantity: i64,
    pub name: String,
    pub description: String,
    /// Live catalog price. Falls back to the purchase price once the product leaves the catalog.
    pub price: Cents,
    pub in_catalog: bool,
    pub purchased: PriceSnapshot,
}

impl OrderedProduct {
    pub fn decorate(item: LineItem, current: Option<&CatalogProduct>) -> Self {
        let purchased = PriceSnapshot { name: item.name, description: item.description, unit_price: item.unit_price };
        match current {
            Some(product) => Self {
                product_id: item.product_id,
                quantity: item.quantity,
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price,
                in_catalog: true,
                purchased,
            },
            None => Self {
                product_id: item.product_id,
                quantity: item.quantity,
                name: purchased.name.clone(),
                description: purchased.description.clone(),
                price: purchased.unit_price,
                in_catalog: false,
                purchased,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub products: Vec<OrderedProduct>,
}
