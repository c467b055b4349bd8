use thiserror::Error;

use crate::client::Operation;

/// Errors returned by the remote agent client.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The agent answered with a non-2xx status.
    #[error("{operation} failed with HTTP {status}: {detail}")]
    Status {
        operation: Operation,
        status: u16,
        detail: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {operation}: {source}")]
    Deserialize {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
