//! # Squeeze SDK - player and library control for LMS-compatible servers
//!
//! Blocking, handle-based API over the server's JSON-RPC `slim.request`
//! endpoint:
//!
//! ```rust,no_run
//! use squeeze_sdk::{AfterLoad, SdkError, ServerConfig, SqueezeServer};
//!
//! fn main() -> Result<(), SdkError> {
//!     squeeze_sdk::logging::init_logging_from_env()?;
//!
//!     let server = SqueezeServer::new(
//!         ServerConfig::new("192.168.1.10", 9000).with_credentials("admin", "secret"),
//!     )?;
//!     server.register()?;
//!
//!     let kitchen = server
//!         .player_by_name("Kitchen")
//!         .ok_or_else(|| SdkError::PlayerNotFound("Kitchen".to_string()))?;
//!
//!     kitchen.set_volume(25)?;
//!     kitchen.load_playlist("42", AfterLoad::Play)?;
//!
//!     let totals = server.totals()?;
//!     println!("{} songs by {} artists", totals.songs, totals.artists);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! squeeze-sdk (SqueezeServer / SqueezePlayer / apps)
//!     ↓
//! squeeze-api (typed operations, command building, reply schemas)
//!     ↓
//! jsonrpc-client (HTTP POST to /jsonrpc.js)
//! ```
//!
//! Failures reported by the server inside an otherwise successful reply,
//! such as a playlist name collision or a load that put nothing in the
//! queue, surface as [`ApiError`] variants wrapped in [`SdkError::Api`].

pub mod apps;
pub mod logging;

mod error;
mod player;
mod server;

pub use apps::{App, AppContext, AppRegistry, BrowseApp};
pub use error::{Result, SdkError};
pub use player::{AfterLoad, SqueezePlayer};
pub use server::{SqueezeServer, Totals};

// Re-export commonly used types from squeeze-api
pub use squeeze_api::operations::playback::{PlayRequest, QueueEntry, RandomKind, StatusResponse};
pub use squeeze_api::operations::playlist::AddTarget;
pub use squeeze_api::operations::AlbumSelector;
pub use squeeze_api::{ApiError, DeviceId, ItemId, ServerConfig, SqueezeClient};
