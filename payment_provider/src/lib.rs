//! Thin client for the hosted payment provider.
//!
//! The provider keeps its own copy of every sellable product and every paying customer. This crate only speaks the
//! provider's REST dialect and validates the signed webhooks it sends back; mapping provider objects onto local
//! records is left to the caller.
mod api;
mod config;
mod error;

mod data_objects;
pub mod webhook;

pub use api::ProviderApi;
pub use config::{ProviderConfig, LIVE_API_URL, TEST_API_URL};
pub use data_objects::{
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
};
pub use error::ProviderApiError;
pub use webhook::{WebhookError, WebhookEventType, WebhookPayload};
