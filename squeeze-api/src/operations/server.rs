//! Server-wide operations
//!
//! Player enumeration, sync groups, installed apps and library totals. All
//! of these are addressed to the broadcast device id.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::command::Command;
use crate::de;
use crate::device::DeviceId;
use crate::error::ApiError;
use crate::operation::{Scope, SqueezeOperation, ValidationError};

/// Page size used to approximate "every player"
pub const PLAYERS_PAGE: u32 = 1000;

/// Page size used to approximate "every app"
pub const APPS_PAGE: u32 = 100;

crate::define_query_operation! {
    operation: PlayerCountOperation,
    command: "player count",
    scope: Server,
    request: PlayerCountRequest {},
    tokens: |_req| Command::from_tokens(["player", "count"]).query(),
    response: PlayerCountResponse {
        #[serde(rename = "_count", default, deserialize_with = "de::count")]
        count: u32,
    },
}

crate::define_query_operation! {
    operation: PlayerIdOperation,
    command: "player id",
    scope: Server,
    request: PlayerIdRequest {
        index: u32,
    },
    tokens: |req| Command::from_tokens(["player", "id"]).arg(req.index).query(),
    response: PlayerIdResponse {
        #[serde(rename = "_id", default, deserialize_with = "de::opt_string")]
        id: Option<String>,
    },
}

crate::define_query_operation! {
    operation: PlayerIpOperation,
    command: "player ip",
    scope: Server,
    request: PlayerIpRequest {
        player: DeviceId,
    },
    tokens: |req| Command::from_tokens(["player", "ip"]).arg(req.player.as_str()).query(),
    response: PlayerIpResponse {
        #[serde(rename = "_ip", default, deserialize_with = "de::opt_string")]
        ip: Option<String>,
    },
}

crate::define_query_operation! {
    operation: PlayerNameOperation,
    command: "player name",
    scope: Server,
    request: PlayerNameRequest {
        player: DeviceId,
    },
    tokens: |req| Command::from_tokens(["player", "name"]).arg(req.player.as_str()).query(),
    response: PlayerNameResponse {
        #[serde(rename = "_name", default, deserialize_with = "de::opt_string")]
        name: Option<String>,
    },
}

/// One group of players playing in sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncGroup {
    /// Comma-separated player ids
    #[serde(default)]
    pub sync_members: String,

    /// Comma-separated player names, in the same order as the ids
    #[serde(default)]
    pub sync_member_names: String,
}

impl SyncGroup {
    pub fn members(&self) -> Vec<DeviceId> {
        split_list(&self.sync_members).map(DeviceId::from).collect()
    }

    pub fn member_names(&self) -> Vec<String> {
        split_list(&self.sync_member_names).map(str::to_string).collect()
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

crate::define_query_operation! {
    operation: SyncGroupsOperation,
    command: "syncgroups",
    scope: Server,
    request: SyncGroupsRequest {},
    tokens: |_req| Command::new("syncgroups").query(),
    response: SyncGroupsResponse {
        #[serde(rename = "syncgroups_loop", default)]
        groups: Vec<SyncGroup>,
    },
}

/// A player record as reported by the `players` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(rename = "playerid")]
    pub id: DeviceId,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub name: Option<String>,

    /// Address and port, e.g. `192.168.1.20:41256`
    #[serde(default, deserialize_with = "de::opt_string")]
    pub ip: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub model: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub modelname: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string")]
    pub uuid: Option<String>,

    #[serde(default, deserialize_with = "de::opt_bool")]
    pub connected: Option<bool>,

    #[serde(default, deserialize_with = "de::opt_bool")]
    pub power: Option<bool>,

    #[serde(default, deserialize_with = "de::opt_bool")]
    pub isplaying: Option<bool>,

    #[serde(default, deserialize_with = "de::opt_bool")]
    pub isplayer: Option<bool>,

    #[serde(default, deserialize_with = "de::opt_bool")]
    pub canpoweroff: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

crate::define_query_operation! {
    operation: PlayersOperation,
    command: "players",
    scope: Server,
    request: PlayersRequest {},
    tokens: |_req| Command::new("players").arg(0u32).arg(PLAYERS_PAGE),
    response: PlayersResponse {
        #[serde(default, deserialize_with = "de::count")]
        count: u32,
        /// Rows without a `playerid` are dropped
        #[serde(rename = "players_loop", default, deserialize_with = "de::skip_malformed")]
        players: Vec<PlayerInfo>,
    },
}

/// An app descriptor as reported by the `apps` command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppDescriptor {
    #[serde(default)]
    pub name: String,

    /// Command name the app answers to, e.g. `spotty`
    #[serde(default)]
    pub cmd: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "de::opt_i64", skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

crate::define_query_operation! {
    operation: AppsOperation,
    command: "apps",
    scope: Server,
    request: AppsRequest {},
    tokens: |_req| Command::new("apps").arg(0u32).arg(APPS_PAGE),
    response: AppsResponse {
        #[serde(default, deserialize_with = "de::count")]
        count: u32,
        // the server really does spell the loop this way
        #[serde(rename = "appss_loop", default)]
        apps: Vec<AppDescriptor>,
    },
}

/// Library statistic reported by `info total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TotalKind {
    Artists,
    Albums,
    Songs,
    Genres,
}

impl TotalKind {
    pub const ALL: [TotalKind; 4] = [
        TotalKind::Artists,
        TotalKind::Albums,
        TotalKind::Songs,
        TotalKind::Genres,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TotalKind::Artists => "artists",
            TotalKind::Albums => "albums",
            TotalKind::Songs => "songs",
            TotalKind::Genres => "genres",
        }
    }
}

impl fmt::Display for TotalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalRequest {
    pub kind: TotalKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalResponse {
    pub count: u32,
}

pub struct TotalOperation;

impl SqueezeOperation for TotalOperation {
    type Request = TotalRequest;
    type Response = TotalResponse;

    const SCOPE: Scope = Scope::Server;
    const COMMAND: &'static str = "info total";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        Ok(Command::from_tokens(["info", "total", request.kind.as_str()]).query())
    }

    fn parse_response(request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        let field = format!("_{}", request.kind);
        let count = result
            .get(&field)
            .and_then(de::as_i64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| ApiError::ParseError(format!("reply has no numeric '{}' field", field)))?;
        Ok(TotalResponse { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_count() {
        let command = PlayerCountOperation::build_command(&player_count_operation()).unwrap();
        assert_eq!(command.to_values(), vec![json!("player"), json!("count"), json!("?")]);

        let reply = PlayerCountOperation::parse_response(&PlayerCountRequest {}, &json!({"_count": "3"})).unwrap();
        assert_eq!(reply.count, 3);
    }

    #[test]
    fn test_player_lookups() {
        let command = PlayerIdOperation::build_command(&player_id_operation(2)).unwrap();
        assert_eq!(command.to_string(), "player id 2 ?");

        let request = player_ip_operation(DeviceId::new("aa:bb"));
        assert_eq!(PlayerIpOperation::build_command(&request).unwrap().to_string(), "player ip aa:bb ?");

        let reply = PlayerNameOperation::parse_response(
            &player_name_operation(DeviceId::new("aa:bb")),
            &json!({"_name": "Kitchen"}),
        )
        .unwrap();
        assert_eq!(reply.name.as_deref(), Some("Kitchen"));
    }

    #[test]
    fn test_sync_groups() {
        let reply = SyncGroupsOperation::parse_response(
            &SyncGroupsRequest {},
            &json!({"syncgroups_loop": [
                {"sync_members": "aa:aa,bb:bb", "sync_member_names": "Kitchen,Den"}
            ]}),
        )
        .unwrap();
        assert_eq!(reply.groups.len(), 1);
        assert_eq!(reply.groups[0].members(), vec![DeviceId::new("aa:aa"), DeviceId::new("bb:bb")]);
        assert_eq!(reply.groups[0].member_names(), vec!["Kitchen", "Den"]);

        let reply = SyncGroupsOperation::parse_response(&SyncGroupsRequest {}, &json!({})).unwrap();
        assert!(reply.groups.is_empty());
    }

    #[test]
    fn test_players() {
        let command = PlayersOperation::build_command(&PlayersRequest {}).unwrap();
        assert_eq!(command.to_values(), vec![json!("players"), json!(0), json!(1000)]);

        let reply = PlayersOperation::parse_response(&PlayersRequest {}, &json!({
            "count": 1,
            "players_loop": [{
                "playerid": "aa:bb:cc:dd:ee:ff",
                "name": "Kitchen",
                "ip": "192.168.1.20:41256",
                "model": "squeezelite",
                "connected": 1,
                "power": "0",
                "seq_no": 0
            }]
        }))
        .unwrap();

        assert_eq!(reply.count, 1);
        let player = &reply.players[0];
        assert_eq!(player.id, DeviceId::new("aa:bb:cc:dd:ee:ff"));
        assert_eq!(player.connected, Some(true));
        assert_eq!(player.power, Some(false));
        assert_eq!(player.extra.get("seq_no"), Some(&json!(0)));
    }

    #[test]
    fn test_players_skips_rows_without_id() {
        let reply = PlayersOperation::parse_response(&PlayersRequest {}, &json!({
            "count": 3,
            "players_loop": [
                {"playerid": "aa:01", "name": "Kitchen"},
                {"name": "Ghost"},
                {"playerid": "aa:02", "name": "Den"}
            ]
        }))
        .unwrap();

        let ids: Vec<&str> = reply.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["aa:01", "aa:02"]);
        assert_eq!(reply.count, 3);
    }

    #[test]
    fn test_apps_reads_misspelled_loop() {
        let reply = AppsOperation::parse_response(
            &AppsRequest {},
            &json!({"count": 2, "appss_loop": [
                {"name": "Spotty", "cmd": "spotty", "type": "xmlbrowser"},
                {"name": "Radio", "cmd": "radio", "weight": "10"}
            ]}),
        )
        .unwrap();
        assert_eq!(reply.apps.len(), 2);
        assert_eq!(reply.apps[0].kind.as_deref(), Some("xmlbrowser"));
        assert_eq!(reply.apps[1].weight, Some(10));
    }

    #[test]
    fn test_totals() {
        let request = TotalRequest { kind: TotalKind::Songs };
        assert_eq!(TotalOperation::build_command(&request).unwrap().to_string(), "info total songs ?");

        let reply = TotalOperation::parse_response(&request, &json!({"_songs": 1234})).unwrap();
        assert_eq!(reply.count, 1234);

        assert!(matches!(
            TotalOperation::parse_response(&request, &json!({"_albums": 3})),
            Err(ApiError::ParseError(_))
        ));
    }
}
