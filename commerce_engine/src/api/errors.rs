use thiserror::Error;

use crate::{
    db::traits::{OrderStoreError, ProjectionError},
    traits::RemoteCallError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Account #{0} does not exist")]
    AccountNotFound(i64),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Invalid request. {0}")]
    InvalidArgument(String),
    #[error("Not authorized. {0}")]
    Unauthorized(String),
    #[error("A dependent service is unavailable. {0}")]
    UpstreamUnavailable(String),
    #[error("Database error. {0}")]
    DatabaseError(String),
}

impl From<OrderStoreError> for OrderFlowError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::OrderNotFound(id) => Self::OrderNotFound(id),
            OrderStoreError::DatabaseError(s) => Self::DatabaseError(s),
        }
    }
}

impl From<RemoteCallError> for OrderFlowError {
    fn from(e: RemoteCallError) -> Self {
        match e {
            RemoteCallError::Unauthorized(s) => Self::Unauthorized(s),
            RemoteCallError::InvalidArgument(s) => Self::InvalidArgument(s),
            e => Self::UpstreamUnavailable(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentApiError {
    #[error("Product {0} is not registered with the payment provider")]
    ProductNotFound(String),
    #[error("Invalid request. {0}")]
    InvalidArgument(String),
    #[error("Not authorized. {0}")]
    Unauthorized(String),
    #[error("The payment provider is unavailable. {0}")]
    UpstreamUnavailable(String),
    #[error("Database error. {0}")]
    DatabaseError(String),
}

impl From<ProjectionError> for PaymentApiError {
    fn from(e: ProjectionError) -> Self {
        match e {
            ProjectionError::DatabaseError(s) => Self::DatabaseError(s),
        }
    }
}

impl From<RemoteCallError> for PaymentApiError {
    fn from(e: RemoteCallError) -> Self {
        match e {
            RemoteCallError::Unauthorized(s) => Self::Unauthorized(s),
            RemoteCallError::InvalidArgument(s) => Self::InvalidArgument(s),
            e => Self::UpstreamUnavailable(e.to_string()),
        }
    }
}
