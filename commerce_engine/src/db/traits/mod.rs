//! # Storage backends
//!
//! The traits in this module are what a database backend must provide to host the order store and the payment
//! projection.
//!
//! * [`OrderManagement`] persists orders and their frozen line items. An order and all of its line items are written
//!   atomically, or not at all.
//! * [`PaymentProjection`] keeps the local mirror of the payment provider: customers, products and transactions. Each
//!   table carries a uniqueness key (`user_id`, `product_id`, `provider_payment_id` respectively) so that replays and
//!   concurrent writers converge on a single row.
mod data_objects;
mod errors;
mod order_management;
mod payment_projection;

pub use data_objects::{InsertOutcome, UpsertOutcome};
pub use errors::{OrderStoreError, ProjectionError};
pub use order_management::OrderManagement;
pub use payment_projection::PaymentProjection;
