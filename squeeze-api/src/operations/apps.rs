//! Commands understood by browsable server apps
//!
//! Apps answer to their own command name, so the first token of these
//! commands comes from the request rather than a constant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::command::Command;
use crate::de;
use crate::device::ItemId;
use crate::error::ApiError;
use crate::operation::{parse_schema, require, Scope, SqueezeOperation, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppItemsRequest {
    /// The app's command name
    pub cmd: String,
    pub skip: u32,
    pub take: u32,
    /// Menu node to open; the app's top level when absent
    pub item_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub isaudio: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub hasitems: Option<bool>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppItemsResponse {
    #[serde(default, deserialize_with = "de::count")]
    pub count: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "loop_loop", default)]
    pub items: Vec<AppItem>,
}

/// Browse one level of an app's menu
pub struct AppItemsOperation;

impl SqueezeOperation for AppItemsOperation {
    type Request = AppItemsRequest;
    type Response = AppItemsResponse;

    const SCOPE: Scope = Scope::Server;
    const COMMAND: &'static str = "items";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let cmd = require("cmd", Some(request.cmd.as_str()))?;
        Ok(Command::new(cmd)
            .arg("items")
            .arg(request.skip)
            .arg(request.take)
            .tagged_opt("item_id", request.item_id.as_deref().filter(|id| !id.is_empty())))
    }

    fn parse_response(_request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        parse_schema(result)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppPlayRequest {
    pub cmd: String,
    pub item_id: String,
}

/// Play an app menu item on a player
pub struct AppPlayOperation;

impl SqueezeOperation for AppPlayOperation {
    type Request = AppPlayRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "playlist play";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let cmd = require("cmd", Some(request.cmd.as_str()))?;
        let item_id = require("item_id", Some(request.item_id.as_str()))?;
        Ok(Command::from_tokens([cmd, "playlist", "play"]).tagged("item_id", item_id))
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}
