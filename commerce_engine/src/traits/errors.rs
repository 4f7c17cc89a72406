use thiserror::Error;

/// Failure of a call to another service, classified by what the caller can do about it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteCallError {
    #[error("The remote resource was not found. {0}")]
    NotFound(String),
    #[error("The remote service refused the request. {0}")]
    Unauthorized(String),
    #[error("The remote service rejected the request. {0}")]
    InvalidArgument(String),
    #[error("The remote service is unavailable. {0}")]
    Unavailable(String),
    #[error("Could not decode the remote response. {0}")]
    Decode(String),
}

impl RemoteCallError {
    /// Maps an HTTP status from a remote service onto the error it represents.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            400 | 409 | 422 => Self::InvalidArgument(message),
            _ => Self::Unavailable(format!("HTTP {status}. {message}")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::RemoteCallError;

    #[test]
    fn http_status_classification() {
        assert!(matches!(RemoteCallError::from_status(403, "".into()), RemoteCallError::Unauthorized(_)));
        assert!(matches!(RemoteCallError::from_status(404, "".into()), RemoteCallError::NotFound(_)));
        assert!(matches!(RemoteCallError::from_status(422, "".into()), RemoteCallError::InvalidArgument(_)));
        assert!(matches!(RemoteCallError::from_status(503, "".into()), RemoteCallError::Unavailable(_)));
    }
}
