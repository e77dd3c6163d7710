//! Operation framework
//!
//! Every remote command is a type implementing [`SqueezeOperation`]. The
//! request type carries the typed arguments, `build_command` turns them into
//! positional tokens (validating first so that bad input never reaches the
//! wire) and `parse_response` reshapes the nested result into the response
//! schema.

pub mod macros;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::command::Command;
use crate::device::DeviceId;
use crate::error::ApiError;

/// Where a command is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Server-wide; always sent to the broadcast device id
    Server,
    /// Sent to the player the caller names
    Player,
}

impl Scope {
    /// Resolve the device id a command with this scope goes to
    pub fn target(self, device: &DeviceId) -> DeviceId {
        match self {
            Scope::Server => DeviceId::broadcast(),
            Scope::Player => device.clone(),
        }
    }
}

/// Base trait for all media server operations
pub trait SqueezeOperation {
    /// The typed arguments of this operation
    type Request;

    /// The reshaped reply of this operation
    type Response;

    /// Device scope of the command
    const SCOPE: Scope;

    /// Leading command tokens, used for logging
    const COMMAND: &'static str;

    /// Build the positional command tokens from the request
    fn build_command(request: &Self::Request) -> Result<Command, ValidationError>;

    /// Reshape the nested result into the typed response
    ///
    /// The request is passed along because some replies only carry
    /// meaningful fields when the command was issued as a query.
    fn parse_response(request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError>;
}

/// Deserialize a reply into a response schema
pub fn parse_schema<T: DeserializeOwned>(result: &Value) -> Result<T, ApiError> {
    T::deserialize(result).map_err(|e| ApiError::ParseError(e.to_string()))
}

/// Validation error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Required parameter '{parameter}' is missing")]
    MissingParameter { parameter: String },

    #[error("Parameter '{parameter}' value '{value}' is invalid: {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Parameter '{parameter}' value '{value}' is out of range ({min}..={max})")]
    RangeError {
        parameter: String,
        value: String,
        min: String,
        max: String,
    },
}

impl ValidationError {
    pub fn missing(parameter: &str) -> Self {
        Self::MissingParameter {
            parameter: parameter.to_string(),
        }
    }

    pub fn invalid_value(parameter: &str, value: impl std::fmt::Display, reason: &str) -> Self {
        Self::InvalidValue {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn range_error(
        parameter: &str,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::RangeError {
            parameter: parameter.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

/// Trait for request types that check their arguments before sending
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Return `value` if it holds a non-blank string
pub fn require<'a>(parameter: &str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::missing(parameter)),
    }
}
