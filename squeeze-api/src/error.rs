use jsonrpc_client::RpcError;
use thiserror::Error;

/// High-level API errors for media server operations
///
/// Transport failures, argument validation failures and business-rule
/// failures reported by the server inside an otherwise successful reply
/// are kept apart so callers can tell them from each other.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection refused, DNS resolution failure or an unreachable server.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The server answered with a non-success HTTP status
    #[error("HTTP error {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The server rejected the configured credentials
    #[error("Unauthorized: check the configured username and password")]
    Unauthorized,

    /// Response parsing error
    ///
    /// The server answered, but the envelope or the nested result could not
    /// be reshaped into the expected schema.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The JSON-RPC envelope carried an error member
    #[error("Remote error: {0}")]
    RemoteError(String),

    /// Invalid or missing argument, raised before any request is sent
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A playlist with the requested name already exists
    #[error("A playlist named '{name}' already exists (id {existing_id})")]
    NameCollision { name: String, existing_id: String },

    /// Loading a stored playlist put no tracks in the queue
    #[error("Playlist {playlist_id} loaded no tracks")]
    NothingLoaded { playlist_id: String },

    /// Adding to the current playlist matched no tracks
    #[error("No tracks were added for {target}")]
    NothingAdded { target: String },

    /// The server did not return a usable id for a newly created playlist
    #[error("Could not create playlist '{name}': {reason}")]
    CreateFailed { name: String, reason: String },
}

impl ApiError {
    /// Whether this error was raised locally, before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::InvalidParameter(_))
    }

    /// Whether the request never produced a usable reply envelope
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::NetworkError(_)
                | ApiError::HttpError { .. }
                | ApiError::Unauthorized
                | ApiError::RemoteError(_)
        )
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<RpcError> for ApiError {
    fn from(error: RpcError) -> Self {
        match error {
            RpcError::Network(msg) => ApiError::NetworkError(msg),
            RpcError::Http { status, body } => ApiError::HttpError { status, body },
            RpcError::Unauthorized => ApiError::Unauthorized,
            RpcError::Parse(msg) => ApiError::ParseError(msg),
            RpcError::Remote(msg) => ApiError::RemoteError(msg),
        }
    }
}

impl From<crate::operation::ValidationError> for ApiError {
    fn from(validation_error: crate::operation::ValidationError) -> Self {
        match validation_error {
            crate::operation::ValidationError::MissingParameter { parameter } => {
                ApiError::InvalidParameter(format!("Required parameter '{}' is missing", parameter))
            }
            crate::operation::ValidationError::InvalidValue { parameter, value, reason } => {
                ApiError::InvalidParameter(format!(
                    "Invalid value '{}' for parameter '{}': {}",
                    value, parameter, reason
                ))
            }
            crate::operation::ValidationError::RangeError { parameter, value, min, max } => {
                ApiError::InvalidParameter(format!(
                    "Parameter '{}' value '{}' is out of range ({}..={})",
                    parameter, value, min, max
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ValidationError;

    #[test]
    fn test_rpc_error_conversion() {
        let api_error: ApiError = RpcError::Network("connection refused".to_string()).into();
        assert!(matches!(api_error, ApiError::NetworkError(_)));

        let api_error: ApiError = RpcError::Unauthorized.into();
        assert!(matches!(api_error, ApiError::Unauthorized));

        let api_error: ApiError = RpcError::Http { status: 500, body: String::new() }.into();
        assert!(matches!(api_error, ApiError::HttpError { status: 500, .. }));

        let api_error: ApiError = RpcError::Parse("eof".to_string()).into();
        assert!(matches!(api_error, ApiError::ParseError(_)));
    }

    #[test]
    fn test_validation_conversion() {
        let api_error: ApiError = ValidationError::missing("playlist_id").into();
        assert!(api_error.is_validation());
        assert!(format!("{}", api_error).contains("playlist_id"));
    }

    #[test]
    fn test_error_classification() {
        assert!(ApiError::Unauthorized.is_transport());
        assert!(!ApiError::NothingLoaded { playlist_id: "3".into() }.is_transport());
        assert!(!ApiError::NetworkError("x".into()).is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::NameCollision {
            name: "Party".to_string(),
            existing_id: "42".to_string(),
        };
        assert_eq!(format!("{}", err), "A playlist named 'Party' already exists (id 42)");

        let err = ApiError::ParseError("invalid JSON".to_string());
        assert_eq!(format!("{}", err), "Parse error: invalid JSON");
    }
}
