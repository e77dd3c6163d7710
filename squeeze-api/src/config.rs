//! Connection settings for a media server
//!
//! A [`ServerConfig`] names the server host, the HTTP port of its JSON-RPC
//! endpoint and optional Basic credentials. It is plain data and can be
//! loaded from any serde format.

use std::fmt;

use jsonrpc_client::JSONRPC_PATH;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Default HTTP port of the server's web interface
pub const DEFAULT_PORT: u16 = 9000;

/// Connection settings for one media server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host name or address, optionally with an `http://` or `https://` scheme
    pub address: String,

    /// Default: 9000
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ServerConfig {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Check that the settings describe a reachable endpoint
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(ApiError::InvalidParameter(
                "server address must not be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(ApiError::InvalidParameter(
                "server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Full URL of the JSON-RPC endpoint
    ///
    /// `http://` is assumed when the address carries no scheme.
    pub fn endpoint(&self) -> String {
        let address = self.address.trim().trim_end_matches('/');
        let base = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        };
        format!("{}:{}{}", base, self.port, JSONRPC_PATH)
    }

    /// Credentials to send, if both a username and a password are non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
