//! The engine's public API.
//!
//! * [`order_flow_api::OrderFlowApi`] places orders (the order aggregator) and serves the order store.
//! * [`payment_api::PaymentApi`] keeps the payment provider and the local payment projection in step, and records
//!   payment outcomes.
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_api;
pub mod payment_objects;
