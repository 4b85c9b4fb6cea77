use thiserror::Error;

/// Errors raised while talking to the management plane or the login endpoint
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Credential acquisition failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Transport-level failure (connect, TLS, timeout, body read)
    #[error("Network error: {message}")]
    Network { message: String },

    /// The API answered with a non-success status
    #[error("ARM operation '{operation}' failed with status {status}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    /// The addressed resource does not exist
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Request or response body could not be (de)serialized
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A request URL could not be built from the endpoint and identifiers
    #[error("Invalid request URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Response parsed but did not have the expected shape
    #[error("Invalid response format: expected {expected}, got {got}")]
    InvalidResponse { expected: String, got: String },
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Serialization {
                message: err.to_string(),
            }
        } else {
            ClientError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
