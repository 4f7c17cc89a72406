use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{Cents, OrderWithItems};

pub const PRODUCT_CREATED: &str = "product_created";
pub const PRODUCT_UPDATED: &str = "product_updated";
pub const PRODUCT_DELETED: &str = "product_deleted";

/// Emitted once an order and its line items have been committed.
#[derive(Debug, Clone)]
pub struct OrderPlacedEvent {
    pub order: OrderWithItems,
}

impl OrderPlacedEvent {
    pub fn new(order: OrderWithItems) -> Self {
        Self { order }
    }
}

//--------------------------------------  Interaction events   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionEventType {
    Purchase,
    ProductRetrieved,
}

/// A user/product interaction, published to the `interaction_events` topic for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEvent {
    #[serde(rename = "type")]
    pub event_type: InteractionEventType,
    pub data: InteractionData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionData {
    pub user_id: i64,
    pub product_id: String,
}

impl InteractionEvent {
    pub fn purchase(user_id: i64, product_id: &str) -> Self {
        Self {
            event_type: InteractionEventType::Purchase,
            data: InteractionData { user_id, product_id: product_id.to_string() },
        }
    }

    /// One purchase event per line item of the order.
    pub fn purchases_for(order: &OrderWithItems) -> Vec<Self> {
        order.line_items.iter().map(|item| Self::purchase(order.order.account_id, &item.product_id)).collect()
    }
}

//--------------------------------------   Product events     ---------------------------------------------------------
/// The raw `product_events` message. Every data field is optional on the wire; which ones are required depends on
/// the event type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: ProductEventData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductEventData {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal amount in major units
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, rename = "accountID")]
    pub account_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEventError {
    #[error("Could not parse product event. {0}")]
    InvalidJson(String),
    #[error("'{event_type}' event is missing required field '{field}'")]
    MissingField { event_type: String, field: &'static str },
    #[error("Invalid price in product event. {0}")]
    InvalidPrice(String),
    #[error("Unknown product event type '{0}'")]
    UnknownType(String),
}

/// A validated product event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductLifecycleEvent {
    Created { product_id: String, name: String, description: Option<String>, price: Cents },
    Updated { product_id: String, name: Option<String>, price: Option<Cents> },
    Deleted { product_id: String },
}

impl ProductLifecycleEvent {
    pub fn product_id(&self) -> &str {
        match self {
            Self::Created { product_id, .. } | Self::Updated { product_id, .. } | Self::Deleted { product_id } => {
                product_id
            },
        }
    }

    pub fn from_json(payload: &[u8]) -> Result<Self, MalformedEventError> {
        let event = serde_json::from_slice::<ProductEvent>(payload)
            .map_err(|e| MalformedEventError::InvalidJson(e.to_string()))?;
        Self::try_from(event)
    }
}

fn to_cents(price: f64) -> Result<Cents, MalformedEventError> {
    if price < 0.0 {
        return Err(MalformedEventError::InvalidPrice(format!("{price} is negative")));
    }
    Cents::from_major_units(price).map_err(|e| MalformedEventError::InvalidPrice(e.to_string()))
}

impl TryFrom<ProductEvent> for ProductLifecycleEvent {
    type Error = MalformedEventError;

    fn try_from(event: ProductEvent) -> Result<Self, Self::Error> {
        let ProductEvent { event_type, data } = event;
        let missing = |field: &'static str| MalformedEventError::MissingField { event_type: event_type.clone(), field };
        let product_id = data.product_id.filter(|id| !id.is_empty());
        match event_type.as_str() {
            PRODUCT_CREATED => {
                let product_id = product_id.ok_or_else(|| missing("product_id"))?;
                let name = data.name.ok_or_else(|| missing("name"))?;
                let price = to_cents(data.price.ok_or_else(|| missing("price"))?)?;
                Ok(Self::Created { product_id, name, description: data.description, price })
            },
            PRODUCT_UPDATED => {
                let product_id = product_id.ok_or_else(|| missing("product_id"))?;
                let price = data.price.map(to_cents).transpose()?;
                Ok(Self::Updated { product_id, name: data.name, price })
            },
            PRODUCT_DELETED => {
                let product_id = product_id.ok_or_else(|| missing("product_id"))?;
                Ok(Self::Deleted { product_id })
            },
            _ => Err(MalformedEventError::UnknownType(event_type.clone())),
        }
    }
}
