use serde::{Deserialize, Serialize};

use crate::api::order_objects::CartEntry;

/// Outcome of applying a catalog change to the payment provider. Everything except `Registered`, `Updated` and
/// `Archived` is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSyncOutcome {
    Registered,
    AlreadyRegistered,
    Updated,
    Unchanged,
    Archived,
    NotTracked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub user_id: i64,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub billing: BillingDetails,
    pub order_id: i64,
    pub redirect_url: String,
    pub products: Vec<CartEntry>,
}
