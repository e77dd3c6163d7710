//! Player handle
//!
//! A [`SqueezePlayer`] is bound to one device id and shares the server's
//! client. Playback commands go to the player itself; stored playlist
//! commands go to the server through the broadcast id.

use serde_json::{Map, Value};

use squeeze_api::operations::playback::{
    CurrentAlbumOperation, CurrentAlbumRequest, CurrentArtistOperation, CurrentArtistRequest,
    CurrentTitleOperation, CurrentTitleRequest, ModeOperation, ModeRequest, MuteOperation,
    NameOperation, NameRequest, NextOperation, NextRequest, PauseOperation, PlayIndexOperation,
    PlayIndexRequest, PlayOperation, PlayRequest, PowerOperation, PreviousOperation,
    PreviousRequest, QueueEntry, RandomKind, RandomPlayOperation, RandomPlayRequest,
    ResumeOperation, ResumeRequest, SeekOperation, SeekRequest, SetNameOperation, SetNameRequest,
    StatusOperation, StatusRequest, StatusResponse, StopOperation, StopPlaybackOperation,
    StopPlaybackRequest, SwitchRequest, SyncOperation, SyncRequest, UnsyncOperation,
    UnsyncRequest, VolumeOperation, VolumeRequest,
};
use squeeze_api::operations::playlist::{
    AddAlbumOperation, AddItemsOperation, AddItemsRequest, AddTarget, AddTrackToPlaylistOperation,
    AddTrackToPlaylistRequest, AddUrlOperation, ClearPlaylistOperation, ClearPlaylistRequest,
    CreatePlaylistOperation, CreatePlaylistRequest, CurrentPlaylistLengthOperation,
    CurrentPlaylistLengthRequest, CurrentPlaylistOperation, CurrentPlaylistRequest,
    CurrentPlaylistResponse, DeleteAlbumOperation, DeleteIndexOperation, DeleteIndexRequest,
    DeleteItemOperation, DeletePlaylistOperation, DeletePlaylistRequest, LoadPlaylistOperation,
    LoadPlaylistRequest, MoveOperation, MoveRequest, PlaylistTracksOperation,
    PlaylistTracksRequest, PlaylistTracksResponse, RemoveTrackFromPlaylistOperation,
    RemoveTrackFromPlaylistRequest, RenamePlaylistOperation, RenamePlaylistRequest,
    SavePlaylistOperation, SavePlaylistRequest, SelectorRequest, UrlRequest,
};
use squeeze_api::operations::AlbumSelector;
use squeeze_api::{ApiError, DeviceId, ItemId, SqueezeClient, SqueezeOperation};

use crate::error::Result;

/// What happens right after a stored playlist is loaded into the queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AfterLoad {
    /// Leave it playing
    #[default]
    Play,
    /// Stop playback, keeping the queue
    Stop,
    /// Clear the queue again
    Clear,
}

/// Handle to one player
///
/// Cheap to clone. Handles obtained before a re-registration keep working
/// against the same device id but are no longer the ones held by the server.
///
/// # Example
///
/// ```rust,ignore
/// let player = server.player_by_name("Kitchen").ok_or_else(|| SdkError::PlayerNotFound("Kitchen".into()))?;
///
/// player.set_volume(30)?;
/// if player.pause(None)? == Some(true) {
///     player.pause(Some(false))?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SqueezePlayer {
    pub id: DeviceId,
    /// Name reported when the player was registered
    pub name: Option<String>,
    client: SqueezeClient,
}

impl SqueezePlayer {
    pub fn new(id: DeviceId, name: Option<String>, client: SqueezeClient) -> Self {
        Self { id, name, client }
    }

    pub fn client(&self) -> &SqueezeClient {
        &self.client
    }

    fn execute<Op: SqueezeOperation>(&self, request: &Op::Request) -> Result<Op::Response> {
        Ok(self.client.execute::<Op>(&self.id, request)?)
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Resume whatever is in the queue
    pub fn resume(&self) -> Result<()> {
        self.execute::<ResumeOperation>(&ResumeRequest {})
    }

    /// Play a url, or everything matching a genre/artist/album triple
    ///
    /// A concrete url wins over the triple. Fails without sending anything
    /// when neither a url nor any name is given.
    pub fn play(&self, request: &PlayRequest) -> Result<()> {
        self.execute::<PlayOperation>(request)
    }

    pub fn play_url(&self, url: &str) -> Result<()> {
        self.play(&PlayRequest::url(url))
    }

    pub fn play_album(&self, selector: AlbumSelector) -> Result<()> {
        self.play(&PlayRequest::selector(selector))
    }

    /// Pause (`Some(true)`), unpause (`Some(false)`) or query (`None`)
    ///
    /// Returns the paused state only when queried.
    pub fn pause(&self, state: Option<bool>) -> Result<Option<bool>> {
        Ok(self.execute::<PauseOperation>(&SwitchRequest { state })?.state)
    }

    pub fn stop(&self, state: Option<bool>) -> Result<Option<bool>> {
        Ok(self.execute::<StopOperation>(&SwitchRequest { state })?.state)
    }

    pub fn power(&self, state: Option<bool>) -> Result<Option<bool>> {
        Ok(self.execute::<PowerOperation>(&SwitchRequest { state })?.state)
    }

    pub fn mute(&self, state: Option<bool>) -> Result<Option<bool>> {
        Ok(self.execute::<MuteOperation>(&SwitchRequest { state })?.state)
    }

    /// Seek to `seconds`, or query the position when `None`
    pub fn seek(&self, seconds: Option<f64>) -> Result<Option<f64>> {
        Ok(self.execute::<SeekOperation>(&SeekRequest { seconds })?.seconds)
    }

    pub fn set_volume(&self, volume: u8) -> Result<()> {
        self.execute::<VolumeOperation>(&VolumeRequest { volume: Some(volume) })
            .map(|_| ())
    }

    /// Current volume; negative while muted
    pub fn volume(&self) -> Result<Option<i64>> {
        Ok(self.execute::<VolumeOperation>(&VolumeRequest { volume: None })?.volume)
    }

    pub fn previous(&self) -> Result<()> {
        self.execute::<PreviousOperation>(&PreviousRequest {})
    }

    pub fn next(&self) -> Result<()> {
        self.execute::<NextOperation>(&NextRequest {})
    }

    /// Jump to a 0-based position in the queue
    pub fn play_index(&self, index: u32) -> Result<()> {
        self.execute::<PlayIndexOperation>(&PlayIndexRequest { index })
    }

    pub fn random_play(&self, kind: RandomKind) -> Result<()> {
        self.execute::<RandomPlayOperation>(&RandomPlayRequest { kind })
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// `play`, `pause` or `stop`
    pub fn mode(&self) -> Result<Option<String>> {
        Ok(self.execute::<ModeOperation>(&ModeRequest {})?.mode)
    }

    /// The name the server currently knows the player by
    pub fn fetch_name(&self) -> Result<Option<String>> {
        Ok(self.execute::<NameOperation>(&NameRequest {})?.name)
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        self.execute::<SetNameOperation>(&SetNameRequest { name: name.to_string() })
    }

    pub fn current_title(&self) -> Result<Option<String>> {
        Ok(self.execute::<CurrentTitleOperation>(&CurrentTitleRequest {})?.title)
    }

    pub fn current_artist(&self) -> Result<Option<String>> {
        Ok(self.execute::<CurrentArtistOperation>(&CurrentArtistRequest {})?.artist)
    }

    pub fn current_album(&self) -> Result<Option<String>> {
        Ok(self.execute::<CurrentAlbumOperation>(&CurrentAlbumRequest {})?.album)
    }

    pub fn status(&self) -> Result<StatusResponse> {
        self.execute::<StatusOperation>(&StatusRequest::default())
    }

    /// Status including `count` queue rows starting at `start`
    pub fn status_window(&self, start: u32, count: u32) -> Result<StatusResponse> {
        self.execute::<StatusOperation>(&StatusRequest::window(start, count))
    }

    /// Just the queue rows of [`status_window`](Self::status_window)
    pub fn playlist_window(&self, start: u32, count: u32) -> Result<Vec<QueueEntry>> {
        Ok(self.status_window(start, count)?.playlist_loop)
    }

    /// Metadata of the stream currently playing
    pub fn remote_meta(&self) -> Result<Option<Map<String, Value>>> {
        Ok(self.status()?.remote_meta)
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Make this player follow `target`
    pub fn sync(&self, target: &DeviceId) -> Result<()> {
        self.execute::<SyncOperation>(&SyncRequest { target: target.clone() })
    }

    pub fn unsync(&self) -> Result<()> {
        self.execute::<UnsyncOperation>(&UnsyncRequest {})
    }

    // ========================================================================
    // Stored playlists
    // ========================================================================

    /// Create an empty stored playlist and return its id
    ///
    /// Fails with [`ApiError::NameCollision`] when the name is taken and
    /// with [`ApiError::CreateFailed`] when the server returns no id.
    pub fn create_playlist(&self, name: &str) -> Result<ItemId> {
        let reply = self.execute::<CreatePlaylistOperation>(&CreatePlaylistRequest {
            name: name.to_string(),
        })?;

        match reply.playlist_id {
            Some(id) => {
                tracing::debug!(playlist_id = %id, "Created playlist '{}'", name);
                Ok(id)
            }
            None => Err(ApiError::CreateFailed {
                name: name.to_string(),
                reason: "the server returned no playlist id".to_string(),
            }
            .into()),
        }
    }

    /// Create a stored playlist and add `urls` to it in order
    ///
    /// A failure while adding leaves the playlist in place with the tracks
    /// added so far.
    pub fn create_playlist_with_tracks<S: AsRef<str>>(&self, name: &str, urls: &[S]) -> Result<ItemId> {
        let id = self.create_playlist(name)?;

        for (added, url) in urls.iter().enumerate() {
            if let Err(e) = self.add_track_to_playlist(id.as_str(), url.as_ref()) {
                tracing::warn!(
                    playlist_id = %id,
                    added,
                    "Adding tracks to new playlist '{}' failed: {}",
                    name,
                    e
                );
                return Err(e);
            }
        }

        Ok(id)
    }

    /// Rename a stored playlist
    ///
    /// Unless `dry_run` is `Some(false)` the server only checks the new name
    /// and leaves the playlist untouched. A name collision is an error either way.
    pub fn rename_playlist(&self, playlist_id: &str, new_name: &str, dry_run: Option<bool>) -> Result<()> {
        let mut request = RenamePlaylistRequest::new(playlist_id, new_name);
        if dry_run == Some(false) {
            request = request.commit();
        }
        self.execute::<RenamePlaylistOperation>(&request)
    }

    pub fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        self.execute::<DeletePlaylistOperation>(&DeletePlaylistRequest {
            playlist_id: playlist_id.to_string(),
        })
    }

    pub fn add_track_to_playlist(&self, playlist_id: &str, url: &str) -> Result<()> {
        self.execute::<AddTrackToPlaylistOperation>(&AddTrackToPlaylistRequest {
            playlist_id: playlist_id.to_string(),
            url: url.to_string(),
        })
    }

    pub fn remove_track_from_playlist(&self, playlist_id: &str, index: u32) -> Result<()> {
        self.execute::<RemoveTrackFromPlaylistOperation>(&RemoveTrackFromPlaylistRequest {
            playlist_id: playlist_id.to_string(),
            index,
        })
    }

    /// Tracks of a stored playlist (defaults: skip 0, take 100000)
    pub fn playlist_tracks(
        &self,
        playlist_id: &str,
        skip: Option<u32>,
        take: Option<u32>,
    ) -> Result<PlaylistTracksResponse> {
        self.execute::<PlaylistTracksOperation>(&PlaylistTracksRequest {
            playlist_id: playlist_id.to_string(),
            skip,
            take,
        })
    }

    // ========================================================================
    // Current playlist
    // ========================================================================

    pub fn add_url_to_current_playlist(&self, url: &str) -> Result<()> {
        self.execute::<AddUrlOperation>(&UrlRequest { url: url.to_string() })
    }

    /// Append tracks by id in a single command; returns the number added
    pub fn add_tracks_to_current_playlist<S: AsRef<str>>(&self, track_ids: &[S]) -> Result<u32> {
        let ids = track_ids.iter().map(|id| id.as_ref().to_string()).collect();
        self.add_items_to_current_playlist(AddTarget::Tracks(ids))
    }

    pub fn add_artist_to_current_playlist(&self, artist_id: &str) -> Result<u32> {
        self.add_items_to_current_playlist(AddTarget::Artist(artist_id.to_string()))
    }

    pub fn add_album_to_current_playlist(&self, album_id: &str) -> Result<u32> {
        self.add_items_to_current_playlist(AddTarget::Album(album_id.to_string()))
    }

    pub fn add_genre_to_current_playlist(&self, genre_id: &str) -> Result<u32> {
        self.add_items_to_current_playlist(AddTarget::Genre(genre_id.to_string()))
    }

    pub fn add_playlist_to_current_playlist(&self, playlist_id: &str) -> Result<u32> {
        self.add_items_to_current_playlist(AddTarget::Playlist(playlist_id.to_string()))
    }

    /// Fails with [`ApiError::NothingAdded`] when nothing matched
    pub fn add_items_to_current_playlist(&self, target: AddTarget) -> Result<u32> {
        Ok(self.execute::<AddItemsOperation>(&AddItemsRequest { target })?.count)
    }

    /// Append everything matching a genre/artist/album triple
    pub fn add_selection_to_current_playlist(&self, selector: AlbumSelector) -> Result<()> {
        self.execute::<AddAlbumOperation>(&SelectorRequest { selector })
    }

    pub fn remove_from_current_playlist(&self, index: u32) -> Result<()> {
        self.execute::<DeleteIndexOperation>(&DeleteIndexRequest { index })
    }

    pub fn remove_url_from_current_playlist(&self, url: &str) -> Result<()> {
        self.execute::<DeleteItemOperation>(&UrlRequest { url: url.to_string() })
    }

    pub fn remove_selection_from_current_playlist(&self, selector: AlbumSelector) -> Result<()> {
        self.execute::<DeleteAlbumOperation>(&SelectorRequest { selector })
    }

    pub fn move_in_current_playlist(&self, from: u32, to: u32) -> Result<()> {
        self.execute::<MoveOperation>(&MoveRequest { from, to })
    }

    /// Replace the queue with a stored playlist; returns the number of tracks loaded
    ///
    /// Loading starts playback. `after` can stop it again or clear the queue.
    /// Fails with [`ApiError::NothingLoaded`] when the playlist is empty.
    pub fn load_playlist(&self, playlist_id: &str, after: AfterLoad) -> Result<u32> {
        let loaded = self
            .execute::<LoadPlaylistOperation>(&LoadPlaylistRequest {
                playlist_id: playlist_id.to_string(),
            })?
            .count;

        match after {
            AfterLoad::Play => {}
            AfterLoad::Stop => self.execute::<StopPlaybackOperation>(&StopPlaybackRequest {})?,
            AfterLoad::Clear => self.clear_current_playlist()?,
        }

        Ok(loaded)
    }

    pub fn current_playlist_length(&self) -> Result<u32> {
        Ok(self
            .execute::<CurrentPlaylistLengthOperation>(&CurrentPlaylistLengthRequest {})?
            .tracks)
    }

    /// Rows of the queue, each flagged with whether the server resolved it
    /// (defaults: skip 0, take 100000)
    pub fn current_playlist(
        &self,
        skip: Option<u32>,
        take: Option<u32>,
        tags: Option<&str>,
    ) -> Result<CurrentPlaylistResponse> {
        self.execute::<CurrentPlaylistOperation>(&CurrentPlaylistRequest {
            skip,
            take,
            tags: tags.map(str::to_string),
        })
    }

    pub fn save_current_playlist(&self, name: &str) -> Result<()> {
        self.execute::<SavePlaylistOperation>(&SavePlaylistRequest { name: name.to_string() })
    }

    pub fn clear_current_playlist(&self) -> Result<()> {
        self.execute::<ClearPlaylistOperation>(&ClearPlaylistRequest {})
    }
}
