//! # Commerce servers
//! This crate hosts the two HTTP services built on `commerce_engine`.
//!
//! The **order service** places orders for an account against the product catalog, serves them back decorated with
//! live catalog data, and accepts payment status updates. Every placed order emits one `purchase` interaction per
//! line item onto the message broker.
//!
//! The **payment service** opens hosted checkouts and customer portal sessions with the payment provider, mirrors
//! catalog product changes into the provider (see [`catalog_worker`]), and reconciles signed payment webhooks (see
//! [`webhook`]).
//!
//! ## Configuration
//! The services are configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! Order service:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /orders`: Place an order.
//! * `GET /orders/{order_id}`: Fetch an order and its line items.
//! * `GET /orders/account/{account_id}`: All of an account's orders, with current catalog details.
//! * `PUT /orders/{order_id}/status`: Record a payment outcome against an order.
//!
//! Payment service:
//! * `/health`
//! * `POST /checkout`: Open a hosted checkout for an order. Returns the URL to redirect to.
//! * `POST /customer_portal`: Open a customer portal session.
//! * `POST /webhook/payment`: Payment provider webhook.
pub mod catalog_worker;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod remote;
pub mod routes;
pub mod server;
pub mod webhook;

#[cfg(test)]
mod endpoint_tests;
