//! Server apps
//!
//! The server reports which apps it has installed (`apps`), each with a
//! display name and a command name. An [`AppRegistry`] maps command names to
//! factories; [`SqueezeServer::load_apps`](crate::SqueezeServer::load_apps)
//! instantiates one app for every installed app with a registered factory.

use std::collections::HashMap;
use std::fmt;

use squeeze_api::operations::apps::{
    AppItemsOperation, AppItemsRequest, AppItemsResponse, AppPlayOperation, AppPlayRequest,
};
use squeeze_api::{DeviceId, SqueezeClient};

use crate::error::Result;

/// Everything an app instance needs to talk to the server
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Always the broadcast id; apps are not bound to a player
    pub device: DeviceId,
    /// Display name reported by the server
    pub name: String,
    /// Command name the app answers to
    pub cmd: String,
    pub client: SqueezeClient,
}

/// A server app
///
/// The provided methods cover the browse-and-play menu protocol most apps
/// speak; apps with their own commands build on [`App::context`].
pub trait App: Send + Sync {
    fn context(&self) -> &AppContext;

    fn name(&self) -> &str {
        &self.context().name
    }

    fn cmd(&self) -> &str {
        &self.context().cmd
    }

    /// List one level of the app's menu
    fn items(&self, item_id: Option<&str>, skip: u32, take: u32) -> Result<AppItemsResponse> {
        let context = self.context();
        let request = AppItemsRequest {
            cmd: context.cmd.clone(),
            skip,
            take,
            item_id: item_id.map(str::to_string),
        };
        Ok(context
            .client
            .execute::<AppItemsOperation>(&context.device, &request)?)
    }

    /// Play a menu item on `player`
    fn play_item(&self, player: &DeviceId, item_id: &str) -> Result<()> {
        let context = self.context();
        let request = AppPlayRequest {
            cmd: context.cmd.clone(),
            item_id: item_id.to_string(),
        };
        Ok(context.client.execute::<AppPlayOperation>(player, &request)?)
    }
}

/// An app that only uses the generic menu protocol
#[derive(Debug, Clone)]
pub struct BrowseApp {
    context: AppContext,
}

impl BrowseApp {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }
}

impl App for BrowseApp {
    fn context(&self) -> &AppContext {
        &self.context
    }
}

type AppFactory = Box<dyn Fn(AppContext) -> Box<dyn App> + Send + Sync>;

/// Factories for the apps an application knows how to drive
#[derive(Default)]
pub struct AppRegistry {
    factories: HashMap<String, AppFactory>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for the app answering to `cmd`
    ///
    /// A later registration for the same command replaces the earlier one.
    pub fn register<F>(&mut self, cmd: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(AppContext) -> Box<dyn App> + Send + Sync + 'static,
    {
        self.factories.insert(cmd.into(), Box::new(factory));
        self
    }

    /// Register [`BrowseApp`] for the app answering to `cmd`
    pub fn register_browse(&mut self, cmd: impl Into<String>) -> &mut Self {
        self.register(cmd, |context| Box::new(BrowseApp::new(context)))
    }

    pub fn contains(&self, cmd: &str) -> bool {
        self.factories.contains_key(cmd)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate the app answering to `context.cmd`, if registered
    pub fn instantiate(&self, context: AppContext) -> Option<Box<dyn App>> {
        self.factories.get(&context.cmd).map(|factory| factory(context))
    }
}

impl fmt::Debug for AppRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands: Vec<&String> = self.factories.keys().collect();
        commands.sort();
        f.debug_struct("AppRegistry").field("commands", &commands).finish()
    }
}
