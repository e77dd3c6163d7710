//! Error types for the JSON-RPC client

use thiserror::Error;

/// Errors that can occur during JSON-RPC communication
#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection, DNS or socket level failure
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success HTTP status
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// The server rejected the configured credentials (or none were sent)
    #[error("Unauthorized: server rejected the request credentials")]
    Unauthorized,

    /// The reply body was not a JSON-RPC envelope
    #[error("Parse error: {0}")]
    Parse(String),

    /// The envelope carried a non-null `error` member
    #[error("Remote error: {0}")]
    Remote(String),
}

impl From<ureq::Error> for RpcError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::Status(401, _) => RpcError::Unauthorized,
            ureq::Error::Status(status, response) => RpcError::Http {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => RpcError::Network(transport.to_string()),
        }
    }
}
