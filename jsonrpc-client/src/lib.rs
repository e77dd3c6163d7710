//! Private JSON-RPC client for media server communication
//!
//! This crate provides a minimal client for the JSON-RPC 1.0 dialect the
//! media server exposes at `/jsonrpc.js`. Every call goes through a single
//! remote method, `slim.request`, whose parameters are always a two element
//! array: the target device identifier and the list of command tokens.

mod error;

pub use error::RpcError;

use std::fmt;
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed endpoint path served by the media server
pub const JSONRPC_PATH: &str = "/jsonrpc.js";

/// The only remote method the server implements
pub const SLIM_REQUEST: &str = "slim.request";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    id: u64,
    method: &'a str,
    params: (&'a str, &'a [Value]),
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// A minimal JSON-RPC client bound to one server endpoint
///
/// The client is cheap to clone; clones share the HTTP agent and the request
/// id counter.
#[derive(Clone)]
pub struct JsonRpcClient {
    agent: ureq::Agent,
    url: String,
    authorization: Option<String>,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcClient {
    /// Create a client posting to `url` (the full endpoint, including `/jsonrpc.js`)
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            url: url.into(),
            authorization: None,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Attach HTTP Basic credentials to every request
    ///
    /// The header value is computed once here and reused for each call.
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.authorization = Some(basic_auth_header(username, password));
        self
    }

    /// The endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether requests carry an `Authorization` header
    pub fn has_credentials(&self) -> bool {
        self.authorization.is_some()
    }

    /// Issue `slim.request` for `device` with the given command tokens
    ///
    /// Returns the `result` member of the reply envelope. A reply without a
    /// result (or with a null one) yields an empty JSON object.
    pub fn call(&self, device: &str, tokens: &[Value]) -> Result<Value, RpcError> {
        let body = RpcRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: SLIM_REQUEST,
            params: (device, tokens),
        };

        let mut request = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json");
        if let Some(authorization) = &self.authorization {
            request = request.set("Authorization", authorization);
        }

        // full-library listings can exceed ureq's string body limit
        let response = request.send_json(&body)?;
        extract_result(response.into_reader())
    }
}

impl fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("url", &self.url)
            .field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Format the value of a Basic `Authorization` header
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

fn extract_result(body: impl Read) -> Result<Value, RpcError> {
    let reply: RpcResponse = serde_json::from_reader(body).map_err(|e| {
        if e.is_io() {
            RpcError::Network(e.to_string())
        } else {
            RpcError::Parse(e.to_string())
        }
    })?;

    if let Some(error) = reply.error.filter(|e| !e.is_null()) {
        return Err(RpcError::Remote(error.to_string()));
    }

    Ok(reply.result.unwrap_or_else(|| Value::Object(Map::new())))
}
