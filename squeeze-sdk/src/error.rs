use squeeze_api::ApiError;
use thiserror::Error;

use crate::logging::LoggingError;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("App not found: {0}")]
    AppNotFound(String),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

impl SdkError {
    /// The underlying API error, if this is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SdkError::Api(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
