//! Catalog error model.

use thiserror::Error;

/// Result type used across the catalog client.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure on the query/mutation path.
///
/// Fetch-path errors never escape the dispatcher; they are folded into the
/// result store as a display string (see [`CatalogError::display_message`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Transport failure (connection refused, reset, body decode).
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success response.
    #[error("service error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Service {
        status: Option<u16>,
        message: String,
    },

    /// A value failed validation (malformed descriptor, bad configuration).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl CatalogError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn service(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Message shown next to stale data after a failed refresh.
    ///
    /// Service errors surface the server's own message verbatim.
    pub fn display_message(&self) -> String {
        match self {
            CatalogError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
