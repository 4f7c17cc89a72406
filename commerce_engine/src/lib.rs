//! Commerce Engine
//!
//! The core of the order and payment services. It places orders against a product catalog, keeps a local projection
//! of the hosted payment provider in step with the catalog, and records payment outcomes reported by the provider.
//! The engine knows nothing about HTTP; the servers in `commerce_server` wrap it.
//!
//! The library is divided into these sections:
//! 1. Database management ([`mod@db`]). SQLite is the supported backend. You should never need to access the database
//!    directly; use the public API instead. The data types stored in the database live in [`db_types`] and are
//!    public.
//! 2. The public API ([`mod@api`]). [`OrderFlowApi`] places and serves orders; [`PaymentApi`] talks to the payment
//!    provider and maintains the payment projection.
//! 3. Remote collaborators ([`traits`]). The catalog, the account directory, the payment provider and the order
//!    service are reached through these traits so that the engine can be tested without a network.
//! 4. Events ([`events`]). Order placement emits events to in-process hooks, interaction events are published to a
//!    message broker, and the [`events::CatalogEventConsumer`] applies catalog changes from the broker.
mod db;

pub mod api;
pub mod db_types;
pub mod events;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{
    errors::{OrderFlowError, PaymentApiError},
    order_flow_api::OrderFlowApi,
    order_objects,
    payment_api::PaymentApi,
    payment_objects,
};
#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase, SqliteDatabaseError};
pub use db::traits::{
    InsertOutcome,
    OrderManagement,
    OrderStoreError,
    PaymentProjection,
    ProjectionError,
    UpsertOutcome,
};
