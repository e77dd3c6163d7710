use std::fmt;
use std::sync::Arc;

use jsonrpc_client::JsonRpcClient;
use serde_json::Value;

use crate::command::Command;
use crate::config::ServerConfig;
use crate::device::DeviceId;
use crate::error::Result;
use crate::operation::SqueezeOperation;
use crate::transport::Transport;

/// A client for executing operations against a media server
///
/// The client is cheap to clone. A server handle and every player handle
/// created from it share one client, so they share the same transport,
/// endpoint and credentials.
///
/// ```rust,no_run
/// use squeeze_api::{DeviceId, ServerConfig, SqueezeClient};
/// use squeeze_api::operations::playback::{PauseOperation, SwitchRequest};
///
/// let client = SqueezeClient::new(ServerConfig::new("192.168.1.10", 9000))?;
/// let player = DeviceId::new("aa:bb:cc:dd:ee:ff");
/// client.execute::<PauseOperation>(&player, &SwitchRequest { state: Some(true) })?;
/// # Ok::<(), squeeze_api::ApiError>(())
/// ```
#[derive(Clone)]
pub struct SqueezeClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
}

impl SqueezeClient {
    /// Create a client talking JSON-RPC to the configured server
    pub fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;

        let endpoint = config.endpoint();
        let mut rpc = JsonRpcClient::new(endpoint.clone());
        if let Some((username, password)) = config.credentials() {
            rpc = rpc.with_basic_auth(username, password);
        }

        Ok(Self {
            transport: Arc::new(rpc),
            endpoint,
        })
    }

    /// Create a client over a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            endpoint: String::from("custom"),
        }
    }

    /// The endpoint requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute an operation
    ///
    /// Server-scoped operations are always sent to the broadcast device id,
    /// whatever `device` is given. Arguments are validated before anything
    /// is sent.
    pub fn execute<Op: SqueezeOperation>(
        &self,
        device: &DeviceId,
        request: &Op::Request,
    ) -> Result<Op::Response> {
        let command = Op::build_command(request)?;
        let target = Op::SCOPE.target(device);

        tracing::debug!(
            device = %target,
            command = %command,
            "Executing {}",
            Op::COMMAND
        );

        let result = self.request(&target, &command)?;
        Op::parse_response(request, &result)
    }

    /// Send raw command tokens and return the unwrapped result
    pub fn request(&self, device: &DeviceId, command: &Command) -> Result<Value> {
        match self.transport.request(device, command) {
            Ok(result) => {
                tracing::trace!(device = %device, command = %command, result = %result, "Command completed");
                Ok(result)
            }
            Err(e) => {
                tracing::debug!(device = %device, command = %command, "Command failed: {}", e);
                Err(e)
            }
        }
    }
}

impl fmt::Debug for SqueezeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqueezeClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
