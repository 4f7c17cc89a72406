//! Contracts for the remote collaborators the engine calls out to.
//!
//! The engine never talks to the network directly. The servers supply implementations of these traits (HTTP clients,
//! the payment provider client), and tests supply in-memory ones.
mod catalog;
mod errors;
mod order_status;
mod payment_provider;

pub use catalog::{AccountDirectory, CatalogClient, CatalogProduct};
pub use errors::RemoteCallError;
pub use order_status::OrderStatusUpdater;
pub use payment_provider::{CheckoutLine, PaymentProvider, ProviderProductDetails};
