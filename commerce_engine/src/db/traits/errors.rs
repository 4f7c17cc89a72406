use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
}

#[derive(Debug, Clone, Error)]
pub enum ProjectionError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(feature = "sqlite")]
impl From<crate::db::sqlite::SqliteDatabaseError> for OrderStoreError {
    fn from(e: crate::db::sqlite::SqliteDatabaseError) -> Self {
        use crate::db::sqlite::SqliteDatabaseError;
        match e {
            SqliteDatabaseError::OrderNotFound(id) => Self::OrderNotFound(id),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<crate::db::sqlite::SqliteDatabaseError> for ProjectionError {
    fn from(e: crate::db::sqlite::SqliteDatabaseError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
