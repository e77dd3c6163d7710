//! Transport control and status of a single player

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::command::Command;
use crate::de;
use crate::device::{DeviceId, ItemId};
use crate::error::ApiError;
use crate::operation::{parse_schema, require, Scope, SqueezeOperation, Validate, ValidationError};
use crate::operations::AlbumSelector;

crate::define_command_operation! {
    operation: ResumeOperation,
    command: "play",
    scope: Player,
    request: ResumeRequest {},
    tokens: |_req| Command::new("play"),
}

/// Start playback of a url, or of everything matching a name triple
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayRequest {
    pub url: Option<String>,
    pub selector: AlbumSelector,
}

impl PlayRequest {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            selector: AlbumSelector::default(),
        }
    }

    pub fn selector(selector: AlbumSelector) -> Self {
        Self { url: None, selector }
    }

    fn concrete_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty() && *u != crate::operations::WILDCARD)
    }
}

pub struct PlayOperation;

impl SqueezeOperation for PlayOperation {
    type Request = PlayRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "playlist play";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        match request.concrete_url() {
            Some(url) => Ok(Command::from_tokens(["playlist", "play", url])),
            None => request
                .selector
                .command(["playlist", "loadalbum"], "url, genre, artist or album"),
        }
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

/// Set a two-state switch, or query it when `state` is `None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchRequest {
    pub state: Option<bool>,
}

impl SwitchRequest {
    pub fn query() -> Self {
        Self { state: None }
    }

    pub fn set(state: bool) -> Self {
        Self { state: Some(state) }
    }
}

/// Reply to a switch command
///
/// `state` is only populated when the command was a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchResponse {
    pub state: Option<bool>,
}

macro_rules! define_switch_operation {
    ($op:ident, $command:literal, [$($token:literal),+], $field:literal) => {
        pub struct $op;

        impl SqueezeOperation for $op {
            type Request = SwitchRequest;
            type Response = SwitchResponse;

            const SCOPE: Scope = Scope::Player;
            const COMMAND: &'static str = $command;

            fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
                Ok(Command::from_tokens([$($token),+]).arg_or_query(request.state))
            }

            fn parse_response(request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
                if request.state.is_some() {
                    return Ok(SwitchResponse::default());
                }
                Ok(SwitchResponse {
                    state: result.get($field).and_then(de::as_bool),
                })
            }
        }
    };
}

define_switch_operation!(PauseOperation, "pause", ["pause"], "_pause");
define_switch_operation!(StopOperation, "stop", ["stop"], "_stop");
define_switch_operation!(PowerOperation, "power", ["power"], "_power");
define_switch_operation!(MuteOperation, "mixer muting", ["mixer", "muting"], "_muting");

crate::define_command_operation! {
    operation: StopPlaybackOperation,
    command: "stop",
    scope: Player,
    request: StopPlaybackRequest {},
    tokens: |_req| Command::new("stop"),
}

/// Seek to an offset in seconds, or query the position when `seconds` is `None`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeekRequest {
    pub seconds: Option<f64>,
}

impl Validate for SeekRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.seconds {
            Some(s) if !s.is_finite() || s < 0.0 => {
                Err(ValidationError::invalid_value("seconds", s, "must be a non-negative number"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeekResponse {
    pub seconds: Option<f64>,
}

pub struct SeekOperation;

impl SqueezeOperation for SeekOperation {
    type Request = SeekRequest;
    type Response = SeekResponse;

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "time";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        request.validate()?;
        Ok(Command::new("time").arg_or_query(request.seconds))
    }

    fn parse_response(request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        if request.seconds.is_some() {
            return Ok(SeekResponse::default());
        }
        Ok(SeekResponse {
            seconds: result.get("_time").and_then(de::as_f64),
        })
    }
}

/// Set the volume (0-100), or query it when `volume` is `None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumeRequest {
    pub volume: Option<u8>,
}

impl Validate for VolumeRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.volume {
            Some(v) if v > 100 => Err(ValidationError::range_error("volume", 0, 100, v)),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeResponse {
    /// Negative while the player is muted
    pub volume: Option<i64>,
}

pub struct VolumeOperation;

impl SqueezeOperation for VolumeOperation {
    type Request = VolumeRequest;
    type Response = VolumeResponse;

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "mixer volume";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        request.validate()?;
        Ok(Command::from_tokens(["mixer", "volume"]).arg_or_query(request.volume))
    }

    fn parse_response(request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        if request.volume.is_some() {
            return Ok(VolumeResponse::default());
        }
        Ok(VolumeResponse {
            volume: result.get("_volume").and_then(de::as_i64),
        })
    }
}

crate::define_command_operation! {
    operation: PreviousOperation,
    command: "button jump_rew",
    scope: Player,
    request: PreviousRequest {},
    tokens: |_req| Command::from_tokens(["button", "jump_rew"]),
}

crate::define_command_operation! {
    operation: NextOperation,
    command: "button jump_fwd",
    scope: Player,
    request: NextRequest {},
    tokens: |_req| Command::from_tokens(["button", "jump_fwd"]),
}

crate::define_command_operation! {
    operation: PlayIndexOperation,
    command: "playlist index",
    scope: Player,
    request: PlayIndexRequest {
        index: u32,
    },
    tokens: |req| Command::from_tokens(["playlist", "index"]).arg(req.index),
}

crate::define_query_operation! {
    operation: ModeOperation,
    command: "mode",
    scope: Player,
    request: ModeRequest {},
    tokens: |_req| Command::new("mode").query(),
    response: ModeResponse {
        /// `play`, `pause` or `stop`
        #[serde(rename = "_mode", default, deserialize_with = "de::opt_string")]
        mode: Option<String>,
    },
}

crate::define_query_operation! {
    operation: NameOperation,
    command: "name",
    scope: Player,
    request: NameRequest {},
    tokens: |_req| Command::new("name").query(),
    response: NameResponse {
        #[serde(rename = "_value", default, deserialize_with = "de::opt_string")]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetNameRequest {
    pub name: String,
}

pub struct SetNameOperation;

impl SqueezeOperation for SetNameOperation {
    type Request = SetNameRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "name";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let name = require("name", Some(request.name.as_str()))?;
        Ok(Command::new("name").arg(name))
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

crate::define_query_operation! {
    operation: CurrentTitleOperation,
    command: "current_title",
    scope: Player,
    request: CurrentTitleRequest {},
    tokens: |_req| Command::new("current_title").query(),
    response: CurrentTitleResponse {
        #[serde(rename = "_current_title", default, deserialize_with = "de::opt_string")]
        title: Option<String>,
    },
}

crate::define_query_operation! {
    operation: CurrentArtistOperation,
    command: "artist",
    scope: Player,
    request: CurrentArtistRequest {},
    tokens: |_req| Command::new("artist").query(),
    response: CurrentArtistResponse {
        #[serde(rename = "_artist", default, deserialize_with = "de::opt_string")]
        artist: Option<String>,
    },
}

crate::define_query_operation! {
    operation: CurrentAlbumOperation,
    command: "album",
    scope: Player,
    request: CurrentAlbumRequest {},
    tokens: |_req| Command::new("album").query(),
    response: CurrentAlbumResponse {
        #[serde(rename = "_album", default, deserialize_with = "de::opt_string")]
        album: Option<String>,
    },
}

/// One row of the current play queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    #[serde(rename = "playlist index", default, deserialize_with = "de::opt_u32")]
    pub index: Option<u32>,
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub album: Option<String>,
    /// Whether the server resolved the entry to a real track
    #[serde(default)]
    pub exists: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Minimum number of populated fields a resolved queue entry carries
pub const MIN_POPULATED_FIELDS: usize = 3;

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Whether a raw queue row refers to a track the server could resolve
///
/// Stale references to moved or deleted files come back with only an index
/// and an id, or with an empty title.
pub fn entry_exists(row: &Map<String, Value>) -> bool {
    let has_title = row.get("title").map(is_populated).unwrap_or(false);
    has_title && row.values().filter(|v| is_populated(v)).count() >= MIN_POPULATED_FIELDS
}

fn annotated_entries<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<QueueEntry>, D::Error> {
    let rows = Option::<Vec<Map<String, Value>>>::deserialize(deserializer)?.unwrap_or_default();
    rows.into_iter()
        .map(|mut row| {
            let exists = entry_exists(&row);
            row.insert("exists".to_string(), Value::Bool(exists));
            QueueEntry::deserialize(Value::Object(row)).map_err(serde::de::Error::custom)
        })
        .collect()
}

/// Player status as reported by the `status` command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub player_connected: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub player_ip: Option<String>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub power: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub time: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub can_seek: Option<bool>,
    #[serde(rename = "mixer volume", default, deserialize_with = "de::opt_i64")]
    pub volume: Option<i64>,
    #[serde(rename = "playlist repeat", default, deserialize_with = "de::opt_i64")]
    pub repeat: Option<i64>,
    #[serde(rename = "playlist shuffle", default, deserialize_with = "de::opt_i64")]
    pub shuffle: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_u32")]
    pub playlist_cur_index: Option<u32>,
    #[serde(default, deserialize_with = "de::count")]
    pub playlist_tracks: u32,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub sync_master: Option<String>,
    /// Comma-separated ids of the players following `sync_master`
    #[serde(default, deserialize_with = "de::opt_string")]
    pub sync_slaves: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub current_title: Option<String>,
    /// Metadata of the stream currently playing
    #[serde(rename = "remoteMeta", default, skip_serializing_if = "Option::is_none")]
    pub remote_meta: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "annotated_entries")]
    pub playlist_loop: Vec<QueueEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `status`, optionally with a window of the play queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRequest {
    /// `(start, count)` of the queue rows to include
    pub window: Option<(u32, u32)>,
    /// Extra per-row metadata tags; only sent with a window
    pub tags: Option<String>,
}

impl StatusRequest {
    pub fn window(start: u32, count: u32) -> Self {
        Self {
            window: Some((start, count)),
            tags: None,
        }
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }
}

pub struct StatusOperation;

impl SqueezeOperation for StatusOperation {
    type Request = StatusRequest;
    type Response = StatusResponse;

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "status";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let command = Command::new("status");
        Ok(match request.window {
            Some((start, count)) => command
                .arg(start)
                .arg(count)
                .tagged_opt("tags", request.tags.as_deref().filter(|t| !t.is_empty())),
            None => command,
        })
    }

    fn parse_response(_request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        parse_schema(result)
    }
}

crate::define_command_operation! {
    operation: SyncOperation,
    command: "sync",
    scope: Player,
    request: SyncRequest {
        target: DeviceId,
    },
    tokens: |req| Command::new("sync").arg(req.target.as_str()),
}

crate::define_command_operation! {
    operation: UnsyncOperation,
    command: "sync",
    scope: Player,
    request: UnsyncRequest {},
    tokens: |_req| Command::from_tokens(["sync", "-"]),
}

/// What random play mixes together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RandomKind {
    Tracks,
    Albums,
    Contributors,
    Year,
}

impl RandomKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RandomKind::Tracks => "tracks",
            RandomKind::Albums => "albums",
            RandomKind::Contributors => "contributors",
            RandomKind::Year => "year",
        }
    }
}

impl fmt::Display for RandomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

crate::define_command_operation! {
    operation: RandomPlayOperation,
    command: "randomplay",
    scope: Player,
    request: RandomPlayRequest {
        kind: RandomKind,
    },
    tokens: |req| Command::new("randomplay").arg(req.kind.as_str()),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_pause_query_and_command() {
        let query = SwitchRequest::query();
        assert_eq!(
            PauseOperation::build_command(&query).unwrap().to_values(),
            vec![json!("pause"), json!("?")]
        );
        let reply = PauseOperation::parse_response(&query, &json!({"_pause": "1"})).unwrap();
        assert_eq!(reply.state, Some(true));

        let set = SwitchRequest::set(true);
        assert_eq!(
            PauseOperation::build_command(&set).unwrap().to_values(),
            vec![json!("pause"), json!(1)]
        );
        let reply = PauseOperation::parse_response(&set, &json!({"_pause": "1"})).unwrap();
        assert_eq!(reply.state, None);
    }

    #[test]
    fn test_mute_tokens() {
        let command = MuteOperation::build_command(&SwitchRequest::set(false)).unwrap();
        assert_eq!(command.to_values(), vec![json!("mixer"), json!("muting"), json!(0)]);
        assert_eq!(MuteOperation::COMMAND, "mixer muting");
    }

    #[test]
    fn test_power_query_reads_state() {
        let reply = PowerOperation::parse_response(&SwitchRequest::query(), &json!({"_power": 0})).unwrap();
        assert_eq!(reply.state, Some(false));
    }

    #[test]
    fn test_seek() {
        let command = SeekOperation::build_command(&SeekRequest { seconds: Some(90.0) }).unwrap();
        assert_eq!(command.to_values(), vec![json!("time"), json!(90)]);

        let reply = SeekOperation::parse_response(&SeekRequest::default(), &json!({"_time": "12.5"})).unwrap();
        assert_eq!(reply.seconds, Some(12.5));

        assert!(SeekOperation::build_command(&SeekRequest { seconds: Some(-1.0) }).is_err());
    }

    #[test]
    fn test_volume() {
        let command = VolumeOperation::build_command(&VolumeRequest { volume: Some(35) }).unwrap();
        assert_eq!(command.to_string(), "mixer volume 35");

        let reply = VolumeOperation::parse_response(&VolumeRequest::default(), &json!({"_volume": "-40"})).unwrap();
        assert_eq!(reply.volume, Some(-40));

        assert_eq!(
            VolumeOperation::build_command(&VolumeRequest { volume: Some(101) }),
            Err(ValidationError::range_error("volume", 0, 100, 101))
        );
    }

    #[test]
    fn test_play_prefers_url() {
        let request = PlayRequest {
            url: Some("http://radio.example/stream".to_string()),
            selector: AlbumSelector::new().artist("ignored"),
        };
        assert_eq!(
            PlayOperation::build_command(&request).unwrap().to_values(),
            vec![json!("playlist"), json!("play"), json!("http://radio.example/stream")]
        );
    }

    #[test]
    fn test_play_by_names() {
        let request = PlayRequest::selector(AlbumSelector::new().genre("Jazz").album("Kind of Blue"));
        assert_eq!(
            PlayOperation::build_command(&request).unwrap().to_string(),
            "playlist loadalbum Jazz * Kind of Blue"
        );
    }

    #[test]
    fn test_play_rejects_nothing() {
        let request = PlayRequest {
            url: Some("*".to_string()),
            selector: AlbumSelector::default(),
        };
        assert!(matches!(
            PlayOperation::build_command(&request),
            Err(ValidationError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_navigation_tokens() {
        assert_eq!(PreviousOperation::build_command(&previous_operation()).unwrap().to_string(), "button jump_rew");
        assert_eq!(NextOperation::build_command(&next_operation()).unwrap().to_string(), "button jump_fwd");
        assert_eq!(PlayIndexOperation::build_command(&play_index_operation(4)).unwrap().to_values(), vec![json!("playlist"), json!("index"), json!(4)]);
    }

    #[test]
    fn test_name_queries() {
        let reply = NameOperation::parse_response(&NameRequest {}, &json!({"_value": "Kitchen"})).unwrap();
        assert_eq!(reply.name.as_deref(), Some("Kitchen"));

        let reply = CurrentTitleOperation::parse_response(&CurrentTitleRequest {}, &json!({})).unwrap();
        assert_eq!(reply.title, None);

        assert!(SetNameOperation::build_command(&SetNameRequest::default()).is_err());
    }

    #[test]
    fn test_status_window() {
        let request = StatusRequest::window(0, 10).with_tags("al");
        assert_eq!(StatusOperation::build_command(&request).unwrap().to_string(), "status 0 10 tags:al");
        assert_eq!(StatusOperation::build_command(&StatusRequest::default()).unwrap().to_string(), "status");
    }

    #[test]
    fn test_parse_status() {
        let reply = StatusOperation::parse_response(
            &StatusRequest::default(),
            &json!({
                "player_name": "Kitchen",
                "player_connected": 1,
                "power": 1,
                "mode": "play",
                "time": 42.7,
                "mixer volume": "35",
                "playlist_tracks": 2,
                "remoteMeta": {"title": "Live stream"},
                "playlist_loop": [
                    {"playlist index": 0, "id": 10, "title": "So What", "url": "file:///a.flac"},
                    {"playlist index": 1, "id": -3, "title": ""}
                ],
                "signalstrength": 0
            }),
        )
        .unwrap();

        assert_eq!(reply.volume, Some(35));
        assert_eq!(reply.time, Some(42.7));
        assert_eq!(reply.playlist_tracks, 2);
        assert_eq!(reply.remote_meta.unwrap().get("title"), Some(&json!("Live stream")));
        assert!(reply.playlist_loop[0].exists);
        assert!(!reply.playlist_loop[1].exists);
        assert_eq!(reply.extra.get("signalstrength"), Some(&json!(0)));
    }

    #[test]
    fn test_entry_exists_heuristic() {
        let row = |v: Value| v.as_object().cloned().unwrap();
        assert!(entry_exists(&row(json!({"playlist index": 0, "id": 1, "title": "A"}))));
        assert!(!entry_exists(&row(json!({"playlist index": 0, "title": "A"}))));
        assert!(!entry_exists(&row(json!({"playlist index": 0, "id": 1, "url": "x", "title": null}))));
        assert!(!entry_exists(&row(json!({"playlist index": 0, "url": "", "title": "A"}))));
    }

    #[test]
    fn test_sync_and_random() {
        let request = sync_operation(DeviceId::new("bb:bb"));
        assert_eq!(SyncOperation::build_command(&request).unwrap().to_string(), "sync bb:bb");
        assert_eq!(UnsyncOperation::build_command(&UnsyncRequest {}).unwrap().to_string(), "sync -");
        let request = random_play_operation(RandomKind::Contributors);
        assert_eq!(RandomPlayOperation::build_command(&request).unwrap().to_string(), "randomplay contributors");
    }

    proptest! {
        #[test]
        fn switch_reply_only_populated_for_queries(state in proptest::option::of(any::<bool>()), reported in any::<bool>()) {
            let request = SwitchRequest { state };
            let reply = StopOperation::parse_response(&request, &json!({"_stop": reported})).unwrap();
            match state {
                None => prop_assert_eq!(reply.state, Some(reported)),
                Some(_) => prop_assert_eq!(reply.state, None),
            }
        }
    }
}
