use jsonrpc_client::JsonRpcClient;
use serde_json::Value;

use crate::command::Command;
use crate::device::DeviceId;
use crate::error::Result;

/// Anything that can deliver a command to the server and return its result
///
/// The production implementation is [`JsonRpcClient`]; tests substitute a
/// recording stub.
pub trait Transport: Send + Sync {
    /// Send `command` to `device` and return the unwrapped result object
    fn request(&self, device: &DeviceId, command: &Command) -> Result<Value>;
}

impl Transport for JsonRpcClient {
    fn request(&self, device: &DeviceId, command: &Command) -> Result<Value> {
        Ok(self.call(device.as_str(), &command.to_values())?)
    }
}
