//! High-level command API for the media server
//!
//! This crate provides a type-safe, trait-based API for issuing commands to a
//! media server and the players attached to it. It uses the private
//! `jsonrpc-client` crate for the low-level JSON-RPC communication.
//!
//! Every remote command is modelled as a [`SqueezeOperation`]: a typed request
//! that builds the positional command tokens, and a typed response schema that
//! reshapes the nested reply into a stable set of fields.
//!
//! ```rust,no_run
//! use squeeze_api::{DeviceId, ServerConfig, SqueezeClient};
//! use squeeze_api::operations::server::{PlayerCountOperation, PlayerCountRequest};
//!
//! let client = SqueezeClient::new(ServerConfig::new("192.168.1.10", 9000))?;
//! let reply = client.execute::<PlayerCountOperation>(&DeviceId::broadcast(), &PlayerCountRequest {})?;
//! println!("{} players connected", reply.count);
//! # Ok::<(), squeeze_api::ApiError>(())
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod operation;
pub mod operations;
pub mod transport;

mod de;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::SqueezeClient;
pub use command::{Command, Param};
pub use config::ServerConfig;
pub use device::{DeviceId, ItemId};
pub use error::{ApiError, Result};
pub use operation::{Scope, SqueezeOperation, ValidationError};
pub use transport::Transport;
