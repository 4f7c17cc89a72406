use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use commerce_common::Cents;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}")]
pub struct StatusConversionError(pub String);

//--------------------------------------   TransactionStatus   -------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// No payment outcome is known yet.
    #[default]
    Pending,
    Success,
    Failed,
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been placed and no payment outcome has been reported.
    #[default]
    New,
    /// The payment provider reported a successful payment.
    Paid,
    /// The payment provider reported a failed payment.
    PaymentFailed,
}

impl From<TransactionStatus> for OrderStatusType {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Pending => Self::New,
            TransactionStatus::Success => Self::Paid,
            TransactionStatus::Failed => Self::PaymentFailed,
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "New"),
            OrderStatusType::Paid => write!(f, "Paid"),
            OrderStatusType::PaymentFailed => write!(f, "PaymentFailed"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(Self::New),
            "Paid" => Ok(Self::Paid),
            "PaymentFailed" => Ok(Self::PaymentFailed),
            _ => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub account_id: i64,
    /// Frozen at placement. Never recomputed from the catalog.
    pub total_price: Cents,
    pub status: OrderStatusType,
    pub payment_status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchased product, with the name, description and unit price it had when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: String,
    pub quantity: i64,
    pub name: String,
    pub description: String,
    pub unit_price: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: String,
    pub quantity: i64,
    pub name: String,
    pub description: String,
    pub unit_price: Cents,
}

impl NewLineItem {
    /// `None` when the subtotal does not fit in [`Cents`].
    pub fn subtotal(&self) -> Option<Cents> {
        self.unit_price.checked_mul(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub account_id: i64,
    pub total_price: Cents,
    pub line_items: Vec<NewLineItem>,
}

impl NewOrder {
    /// Builds an order whose total is the sum of its line item subtotals. Returns `None` if any subtotal, or the
    /// total, overflows.
    pub fn try_new(account_id: i64, line_items: Vec<NewLineItem>) -> Option<Self> {
        let total_price = line_items
            .iter()
            .try_fold(Cents::default(), |total, item| item.subtotal().and_then(|s| total.checked_add(s)))?;
        Some(Self { account_id, total_price, line_items })
    }
}

//--------------------------------------   PaymentCustomer     ---------------------------------------------------------
/// Links a local account to the payment provider's customer record. At most one per `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentCustomer {
    pub id: i64,
    pub user_id: i64,
    pub provider_customer_id: String,
    pub billing_email: String,
    pub billing_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentCustomer {
    pub user_id: i64,
    pub provider_customer_id: String,
    pub billing_email: String,
    pub billing_name: String,
}

//--------------------------------------   PaymentProduct      ---------------------------------------------------------
/// Links a catalog product to the payment provider's product record. At most one per `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentProduct {
    pub id: i64,
    pub product_id: String,
    pub provider_product_id: String,
    /// The name last sent to the provider
    pub name: String,
    pub price: Cents,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentProduct {
    pub product_id: String,
    pub provider_product_id: String,
    pub name: String,
    pub price: Cents,
    pub currency: String,
}

//--------------------------------------     Transaction       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub order_id: i64,
    pub user_id: i64,
    pub customer_id: String,
    /// The provider's payment id. Unique; the idempotency key for webhook deliveries.
    pub provider_payment_id: String,
    pub total_price: Cents,
    pub settled_price: Cents,
    pub currency: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub order_id: i64,
    pub user_id: i64,
    pub customer_id: String,
    pub provider_payment_id: String,
    pub total_price: Cents,
    pub settled_price: Cents,
    pub currency: String,
    /// `None` when the webhook carried no recognisable outcome. A stored status is then left untouched.
    pub status: Option<TransactionStatus>,
}
