//! Stored playlists and the current play queue
//!
//! Stored playlists live on the server and are addressed by id through the
//! broadcast device. The current queue ("current playlist") belongs to one
//! player.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::command::Command;
use crate::de;
use crate::device::ItemId;
use crate::error::ApiError;
use crate::operation::{parse_schema, require, Scope, SqueezeOperation, ValidationError};
use crate::operations::playback::QueueEntry;
use crate::operations::{AlbumSelector, PageDefaults};

/// Tags selecting the url of each stored playlist track
pub const PLAYLIST_TRACK_TAGS: &str = "u";

/// Reply fields shared by the commands that can collide with an existing name
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct NameCheck {
    #[serde(default)]
    playlist_id: Option<ItemId>,
    #[serde(default)]
    overwritten_playlist_id: Option<ItemId>,
}

fn check_name(name: &str, result: &Value) -> Result<NameCheck, ApiError> {
    let check: NameCheck = parse_schema(result)?;
    match &check.overwritten_playlist_id {
        Some(existing) => {
            tracing::warn!(playlist_name = name, existing_id = %existing, "Playlist name already in use");
            Err(ApiError::NameCollision {
                name: name.to_string(),
                existing_id: existing.to_string(),
            })
        }
        None => Ok(check),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePlaylistRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    /// Id of the new playlist; absent when the server created nothing
    pub playlist_id: Option<ItemId>,
}

/// Create an empty stored playlist
pub struct CreatePlaylistOperation;

impl SqueezeOperation for CreatePlaylistOperation {
    type Request = CreatePlaylistRequest;
    type Response = CreatePlaylistResponse;

    const SCOPE: Scope = Scope::Server;
    const COMMAND: &'static str = "playlists new";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let name = require("name", Some(request.name.as_str()))?;
        Ok(Command::from_tokens(["playlists", "new"]).tagged("name", name))
    }

    fn parse_response(request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        let check = check_name(&request.name, result)?;
        Ok(CreatePlaylistResponse {
            playlist_id: check.playlist_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlaylistRequest {
    pub playlist_id: String,
    pub new_name: String,
    /// Only check whether the rename would succeed
    pub dry_run: bool,
}

impl RenamePlaylistRequest {
    /// A rename request that only validates, leaving the playlist untouched
    pub fn new(playlist_id: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            new_name: new_name.into(),
            dry_run: true,
        }
    }

    pub fn commit(mut self) -> Self {
        self.dry_run = false;
        self
    }
}

/// Rename a stored playlist
///
/// A name collision fails the operation whether or not it was a dry run.
pub struct RenamePlaylistOperation;

impl SqueezeOperation for RenamePlaylistOperation {
    type Request = RenamePlaylistRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Server;
    const COMMAND: &'static str = "playlists rename";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let id = require("playlist_id", Some(request.playlist_id.as_str()))?;
        let name = require("new_name", Some(request.new_name.as_str()))?;
        Ok(Command::from_tokens(["playlists", "rename"])
            .tagged("playlist_id", id)
            .tagged("newname", name)
            .tagged("dry_run", u8::from(request.dry_run)))
    }

    fn parse_response(request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        check_name(&request.new_name, result).map(|_| ())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletePlaylistRequest {
    pub playlist_id: String,
}

pub struct DeletePlaylistOperation;

impl SqueezeOperation for DeletePlaylistOperation {
    type Request = DeletePlaylistRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Server;
    const COMMAND: &'static str = "playlists delete";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let id = require("playlist_id", Some(request.playlist_id.as_str()))?;
        Ok(Command::from_tokens(["playlists", "delete"]).tagged("playlist_id", id))
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddTrackToPlaylistRequest {
    pub playlist_id: String,
    pub url: String,
}

/// Append a track to a stored playlist
pub struct AddTrackToPlaylistOperation;

impl SqueezeOperation for AddTrackToPlaylistOperation {
    type Request = AddTrackToPlaylistRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Server;
    const COMMAND: &'static str = "playlists edit";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let id = require("playlist_id", Some(request.playlist_id.as_str()))?;
        let url = require("url", Some(request.url.as_str()))?;
        Ok(Command::from_tokens(["playlists", "edit"])
            .tagged("cmd", "add")
            .tagged("playlist_id", id)
            .tagged("url", url))
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveTrackFromPlaylistRequest {
    pub playlist_id: String,
    pub index: u32,
}

/// Remove the track at `index` from a stored playlist
pub struct RemoveTrackFromPlaylistOperation;

impl SqueezeOperation for RemoveTrackFromPlaylistOperation {
    type Request = RemoveTrackFromPlaylistRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Server;
    const COMMAND: &'static str = "playlists edit";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let id = require("playlist_id", Some(request.playlist_id.as_str()))?;
        Ok(Command::from_tokens(["playlists", "edit"])
            .tagged("cmd", "delete")
            .tagged("playlist_id", id)
            .tagged("index", request.index))
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistTracksRequest {
    pub playlist_id: String,
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    #[serde(rename = "playlist index", default, deserialize_with = "de::opt_u32")]
    pub index: Option<u32>,
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTracksResponse {
    #[serde(default, deserialize_with = "de::count")]
    pub count: u32,
    #[serde(rename = "playlisttracks_loop", default)]
    pub tracks: Vec<PlaylistTrack>,
}

/// List the tracks of a stored playlist
pub struct PlaylistTracksOperation;

impl PlaylistTracksOperation {
    pub const DEFAULTS: PageDefaults = PageDefaults::numbers(0, 100000);
}

impl SqueezeOperation for PlaylistTracksOperation {
    type Request = PlaylistTracksRequest;
    type Response = PlaylistTracksResponse;

    const SCOPE: Scope = Scope::Server;
    const COMMAND: &'static str = "playlists tracks";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let id = require("playlist_id", Some(request.playlist_id.as_str()))?;
        Ok(Self::DEFAULTS
            .apply(Command::from_tokens(["playlists", "tracks"]), request.skip, request.take)
            .tagged("playlist_id", id)
            .tagged("tags", PLAYLIST_TRACK_TAGS))
    }

    fn parse_response(_request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        parse_schema(result)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlRequest {
    pub url: String,
}

/// Append a url to the current queue
pub struct AddUrlOperation;

impl SqueezeOperation for AddUrlOperation {
    type Request = UrlRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "playlist add";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let url = require("url", Some(request.url.as_str()))?;
        Ok(Command::from_tokens(["playlist", "add", url]))
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

/// Library items `playlistcontrol cmd:add` can append to the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddTarget {
    Tracks(Vec<String>),
    Artist(String),
    Album(String),
    Genre(String),
    Playlist(String),
}

impl AddTarget {
    fn key(&self) -> &'static str {
        match self {
            AddTarget::Tracks(_) => "track_id",
            AddTarget::Artist(_) => "artist_id",
            AddTarget::Album(_) => "album_id",
            AddTarget::Genre(_) => "genre_id",
            AddTarget::Playlist(_) => "playlist_id",
        }
    }

    /// The id value, with several track ids joined by commas
    fn value(&self) -> Result<String, ValidationError> {
        match self {
            AddTarget::Tracks(ids) => {
                let ids: Vec<&str> = ids.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
                if ids.is_empty() {
                    return Err(ValidationError::missing("track_id"));
                }
                Ok(ids.join(","))
            }
            AddTarget::Artist(id) | AddTarget::Album(id) | AddTarget::Genre(id) | AddTarget::Playlist(id) => {
                require(self.key(), Some(id.as_str())).map(str::to_string)
            }
        }
    }
}

impl fmt::Display for AddTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddTarget::Tracks(ids) => write!(f, "{}:{}", self.key(), ids.join(",")),
            AddTarget::Artist(id) | AddTarget::Album(id) | AddTarget::Genre(id) | AddTarget::Playlist(id) => {
                write!(f, "{}:{}", self.key(), id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItemsRequest {
    pub target: AddTarget,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemsResponse {
    /// Number of tracks appended
    pub count: u32,
}

/// Append library items to the current queue
///
/// Fails with [`ApiError::NothingAdded`] when the server matched no tracks.
pub struct AddItemsOperation;

impl SqueezeOperation for AddItemsOperation {
    type Request = AddItemsRequest;
    type Response = AddItemsResponse;

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "playlistcontrol cmd:add";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let value = request.target.value()?;
        Ok(Command::new("playlistcontrol")
            .tagged("cmd", "add")
            .tagged(request.target.key(), value))
    }

    fn parse_response(request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        let count = reported_count(result);
        if count == 0 {
            tracing::warn!(items = %request.target, "No tracks were added to the current playlist");
            return Err(ApiError::NothingAdded {
                target: request.target.to_string(),
            });
        }
        Ok(AddItemsResponse { count })
    }
}

fn reported_count(result: &Value) -> u32 {
    result
        .get("count")
        .and_then(de::as_i64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorRequest {
    pub selector: AlbumSelector,
}

/// Append every track matching a name triple to the current queue
pub struct AddAlbumOperation;

impl SqueezeOperation for AddAlbumOperation {
    type Request = SelectorRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "playlist addalbum";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        request.selector.command(["playlist", "addalbum"], "genre, artist or album")
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

/// Remove every track matching a name triple from the current queue
pub struct DeleteAlbumOperation;

impl SqueezeOperation for DeleteAlbumOperation {
    type Request = SelectorRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "playlist deletealbum";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        request.selector.command(["playlist", "deletealbum"], "genre, artist or album")
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

crate::define_command_operation! {
    operation: DeleteIndexOperation,
    command: "playlist delete",
    scope: Player,
    request: DeleteIndexRequest {
        index: u32,
    },
    tokens: |req| Command::from_tokens(["playlist", "delete"]).arg(req.index),
}

/// Remove the entry with the given url from the current queue
pub struct DeleteItemOperation;

impl SqueezeOperation for DeleteItemOperation {
    type Request = UrlRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "playlist deleteitem";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let url = require("url", Some(request.url.as_str()))?;
        Ok(Command::from_tokens(["playlist", "deleteitem", url]))
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

crate::define_command_operation! {
    operation: MoveOperation,
    command: "playlist move",
    scope: Player,
    request: MoveRequest {
        from: u32,
        to: u32,
    },
    tokens: |req| Command::from_tokens(["playlist", "move"]).arg(req.from).arg(req.to),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPlaylistRequest {
    pub playlist_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadPlaylistResponse {
    /// Number of tracks now in the queue
    pub count: u32,
}

/// Replace the current queue with a stored playlist and start playing it
///
/// Fails with [`ApiError::NothingLoaded`] when the playlist put no tracks
/// in the queue.
pub struct LoadPlaylistOperation;

impl SqueezeOperation for LoadPlaylistOperation {
    type Request = LoadPlaylistRequest;
    type Response = LoadPlaylistResponse;

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "playlistcontrol cmd:load";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let id = require("playlist_id", Some(request.playlist_id.as_str()))?;
        Ok(Command::new("playlistcontrol")
            .tagged("cmd", "load")
            .tagged("playlist_id", id))
    }

    fn parse_response(request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        let count = reported_count(result);
        if count == 0 {
            tracing::warn!(playlist_id = %request.playlist_id, "Loaded playlist is empty");
            return Err(ApiError::NothingLoaded {
                playlist_id: request.playlist_id.clone(),
            });
        }
        Ok(LoadPlaylistResponse { count })
    }
}

crate::define_query_operation! {
    operation: CurrentPlaylistLengthOperation,
    command: "playlist tracks",
    scope: Player,
    request: CurrentPlaylistLengthRequest {},
    tokens: |_req| Command::from_tokens(["playlist", "tracks"]).query(),
    response: CurrentPlaylistLengthResponse {
        #[serde(rename = "_tracks", default, deserialize_with = "de::count")]
        tracks: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentPlaylistRequest {
    pub skip: Option<u32>,
    pub take: Option<u32>,
    /// Extra per-track metadata tags, e.g. `al` for artist and album
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentPlaylistResponse {
    /// Length of the whole queue
    #[serde(rename = "playlist_tracks", default, deserialize_with = "de::count")]
    pub count: u32,
    #[serde(rename = "playlist_loop", default)]
    pub tracks: Vec<QueueEntry>,
}

/// Read a window of the current queue, flagging unresolved entries
pub struct CurrentPlaylistOperation;

impl CurrentPlaylistOperation {
    pub const DEFAULTS: PageDefaults = PageDefaults::numbers(0, 100000);
}

impl SqueezeOperation for CurrentPlaylistOperation {
    type Request = CurrentPlaylistRequest;
    type Response = CurrentPlaylistResponse;

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "status";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        Ok(Self::DEFAULTS
            .apply(Command::new("status"), request.skip, request.take)
            .tagged_opt("tags", request.tags.as_deref().filter(|t| !t.is_empty())))
    }

    fn parse_response(_request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        let status: crate::operations::playback::StatusResponse = parse_schema(result)?;
        Ok(CurrentPlaylistResponse {
            count: status.playlist_tracks,
            tracks: status.playlist_loop,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavePlaylistRequest {
    pub name: String,
}

/// Save the current queue as a stored playlist
pub struct SavePlaylistOperation;

impl SqueezeOperation for SavePlaylistOperation {
    type Request = SavePlaylistRequest;
    type Response = ();

    const SCOPE: Scope = Scope::Player;
    const COMMAND: &'static str = "playlist save";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let name = require("name", Some(request.name.as_str()))?;
        Ok(Command::from_tokens(["playlist", "save", name]))
    }

    fn parse_response(_request: &Self::Request, _result: &Value) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}

crate::define_command_operation! {
    operation: ClearPlaylistOperation,
    command: "playlist clear",
    scope: Player,
    request: ClearPlaylistRequest {},
    tokens: |_req| Command::from_tokens(["playlist", "clear"]),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_create_playlist() {
        let request = CreatePlaylistRequest { name: "Party".to_string() };
        assert_eq!(
            CreatePlaylistOperation::build_command(&request).unwrap().to_values(),
            vec![json!("playlists"), json!("new"), json!("name:Party")]
        );

        let reply = CreatePlaylistOperation::parse_response(&request, &json!({"playlist_id": 42})).unwrap();
        assert_eq!(reply.playlist_id, Some(ItemId::new("42")));

        let reply = CreatePlaylistOperation::parse_response(&request, &json!({})).unwrap();
        assert_eq!(reply.playlist_id, None);
    }

    #[test]
    fn test_create_playlist_collision() {
        let request = CreatePlaylistRequest { name: "Party".to_string() };
        match CreatePlaylistOperation::parse_response(&request, &json!({"overwritten_playlist_id": 7})) {
            Err(ApiError::NameCollision { name, existing_id }) => {
                assert_eq!(name, "Party");
                assert_eq!(existing_id, "7");
            }
            other => panic!("Expected NameCollision, got {:?}", other),
        }
    }

    #[test]
    fn test_rename_defaults_to_dry_run() {
        let request = RenamePlaylistRequest::new("12", "Road Trip");
        assert_eq!(
            RenamePlaylistOperation::build_command(&request).unwrap().to_string(),
            "playlists rename playlist_id:12 newname:Road Trip dry_run:1"
        );
        let request = request.commit();
        assert_eq!(
            RenamePlaylistOperation::build_command(&request).unwrap().to_values()[4],
            json!("dry_run:0")
        );
    }

    #[test]
    fn test_rename_collision_regardless_of_dry_run() {
        for dry_run in [true, false] {
            let request = RenamePlaylistRequest {
                playlist_id: "12".to_string(),
                new_name: "Road Trip".to_string(),
                dry_run,
            };
            let result = RenamePlaylistOperation::parse_response(&request, &json!({"overwritten_playlist_id": "31"}));
            assert!(matches!(
                result,
                Err(ApiError::NameCollision { ref existing_id, .. }) if existing_id == "31"
            ));
        }
    }

    #[test]
    fn test_stored_playlist_edits() {
        let request = AddTrackToPlaylistRequest {
            playlist_id: "5".to_string(),
            url: "file:///a.flac".to_string(),
        };
        assert_eq!(
            AddTrackToPlaylistOperation::build_command(&request).unwrap().to_string(),
            "playlists edit cmd:add playlist_id:5 url:file:///a.flac"
        );

        let request = RemoveTrackFromPlaylistRequest { playlist_id: "5".to_string(), index: 2 };
        assert_eq!(
            RemoveTrackFromPlaylistOperation::build_command(&request).unwrap().to_string(),
            "playlists edit cmd:delete playlist_id:5 index:2"
        );

        let request = DeletePlaylistRequest { playlist_id: String::new() };
        assert_eq!(
            DeletePlaylistOperation::build_command(&request),
            Err(ValidationError::missing("playlist_id"))
        );
    }

    #[test]
    fn test_playlist_tracks() {
        let request = PlaylistTracksRequest { playlist_id: "5".to_string(), ..Default::default() };
        assert_eq!(
            PlaylistTracksOperation::build_command(&request).unwrap().to_values(),
            vec![
                json!("playlists"),
                json!("tracks"),
                json!(0),
                json!(100000),
                json!("playlist_id:5"),
                json!("tags:u"),
            ]
        );

        let reply = PlaylistTracksOperation::parse_response(
            &request,
            &json!({"count": 1, "playlisttracks_loop": [
                {"playlist index": 0, "id": 9, "title": "A", "url": "file:///a.flac"}
            ]}),
        )
        .unwrap();
        assert_eq!(reply.tracks[0].index, Some(0));
        assert_eq!(reply.tracks[0].url.as_deref(), Some("file:///a.flac"));
    }

    #[test]
    fn test_track_ids_are_joined() {
        let request = AddItemsRequest {
            target: AddTarget::Tracks(vec!["1".into(), "2".into(), "3".into()]),
        };
        assert_eq!(
            AddItemsOperation::build_command(&request).unwrap().to_values(),
            vec![json!("playlistcontrol"), json!("cmd:add"), json!("track_id:1,2,3")]
        );
    }

    #[test]
    fn test_add_items_requires_ids() {
        let request = AddItemsRequest { target: AddTarget::Tracks(vec![]) };
        assert_eq!(AddItemsOperation::build_command(&request), Err(ValidationError::missing("track_id")));

        let request = AddItemsRequest { target: AddTarget::Genre(" ".into()) };
        assert_eq!(AddItemsOperation::build_command(&request), Err(ValidationError::missing("genre_id")));
    }

    #[test]
    fn test_add_items_nothing_added() {
        let request = AddItemsRequest { target: AddTarget::Album("77".into()) };
        assert_eq!(AddItemsOperation::build_command(&request).unwrap().to_string(), "playlistcontrol cmd:add album_id:77");

        match AddItemsOperation::parse_response(&request, &json!({"count": 0})) {
            Err(ApiError::NothingAdded { target }) => assert_eq!(target, "album_id:77"),
            other => panic!("Expected NothingAdded, got {:?}", other),
        }
        assert!(AddItemsOperation::parse_response(&request, &json!({})).is_err());

        let reply = AddItemsOperation::parse_response(&request, &json!({"count": "12"})).unwrap();
        assert_eq!(reply.count, 12);
    }

    #[test]
    fn test_queue_edits() {
        let request = SelectorRequest { selector: AlbumSelector::new().artist("Nina Simone") };
        assert_eq!(AddAlbumOperation::build_command(&request).unwrap().to_string(), "playlist addalbum * Nina Simone *");
        assert_eq!(DeleteAlbumOperation::build_command(&request).unwrap().to_string(), "playlist deletealbum * Nina Simone *");
        assert!(DeleteAlbumOperation::build_command(&SelectorRequest::default()).is_err());

        assert_eq!(DeleteIndexOperation::build_command(&delete_index_operation(3)).unwrap().to_values(), vec![json!("playlist"), json!("delete"), json!(3)]);
        assert_eq!(MoveOperation::build_command(&move_operation(0, 4)).unwrap().to_values(), vec![json!("playlist"), json!("move"), json!(0), json!(4)]);

        let request = UrlRequest { url: "file:///b.flac".to_string() };
        assert_eq!(DeleteItemOperation::build_command(&request).unwrap().to_string(), "playlist deleteitem file:///b.flac");
        assert_eq!(AddUrlOperation::build_command(&request).unwrap().to_string(), "playlist add file:///b.flac");
        assert!(AddUrlOperation::build_command(&UrlRequest::default()).is_err());
    }

    #[test]
    fn test_load_playlist() {
        let request = LoadPlaylistRequest { playlist_id: "5".to_string() };
        assert_eq!(LoadPlaylistOperation::build_command(&request).unwrap().to_string(), "playlistcontrol cmd:load playlist_id:5");

        let reply = LoadPlaylistOperation::parse_response(&request, &json!({"count": 8})).unwrap();
        assert_eq!(reply.count, 8);

        assert!(matches!(
            LoadPlaylistOperation::parse_response(&request, &json!({"count": 0})),
            Err(ApiError::NothingLoaded { ref playlist_id }) if playlist_id == "5"
        ));
    }

    #[test]
    fn test_current_playlist() {
        assert_eq!(
            CurrentPlaylistLengthOperation::build_command(&CurrentPlaylistLengthRequest {}).unwrap().to_string(),
            "playlist tracks ?"
        );
        let reply = CurrentPlaylistLengthOperation::parse_response(&CurrentPlaylistLengthRequest {}, &json!({"_tracks": "4"})).unwrap();
        assert_eq!(reply.tracks, 4);

        let request = CurrentPlaylistRequest { tags: Some("al".to_string()), ..Default::default() };
        assert_eq!(CurrentPlaylistOperation::build_command(&request).unwrap().to_string(), "status 0 100000 tags:al");

        let reply = CurrentPlaylistOperation::parse_response(
            &request,
            &json!({
                "playlist_tracks": 2,
                "playlist_loop": [
                    {"playlist index": 0, "id": 3, "title": "So What", "artist": "Miles Davis"},
                    {"playlist index": 1, "id": "-9"}
                ]
            }),
        )
        .unwrap();
        assert_eq!(reply.count, 2);
        assert!(reply.tracks[0].exists);
        assert!(!reply.tracks[1].exists);
    }

    #[test]
    fn test_save_and_clear() {
        let request = SavePlaylistRequest { name: "Later".to_string() };
        assert_eq!(SavePlaylistOperation::build_command(&request).unwrap().to_string(), "playlist save Later");
        assert_eq!(ClearPlaylistOperation::build_command(&ClearPlaylistRequest {}).unwrap().to_string(), "playlist clear");
    }

    proptest! {
        #[test]
        fn track_ids_always_one_token(ids in proptest::collection::vec("[0-9]{1,5}", 1..10)) {
            let request = AddItemsRequest { target: AddTarget::Tracks(ids.clone()) };
            let command = AddItemsOperation::build_command(&request).unwrap();
            prop_assert_eq!(command.len(), 3);
            prop_assert_eq!(command.tokens()[2].to_string(), format!("track_id:{}", ids.join(",")));
        }
    }
}
