//! Error types for the gateway REST client

use thiserror::Error;

/// Errors that can occur when interacting with the hosted gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required configuration value is missing
    #[error("Missing {0} environment variable")]
    MissingConfig(&'static str),

    /// HTTP request failed before a response was received
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Unauthorized - invalid API key or expired session
    #[error("Unauthorized - invalid API key or expired session")]
    Unauthorized,

    /// The requested row does not exist
    #[error("Not found")]
    NotFound,

    /// The gateway returned an error
    #[error("Gateway error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the gateway
        message: String,
    },
}
