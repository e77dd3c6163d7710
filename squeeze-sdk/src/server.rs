//! Server handle
//!
//! [`SqueezeServer`] owns the client, the registry of known players and the
//! loaded apps. Catalog and discovery commands are sent to the broadcast id.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::thread;

use squeeze_api::operations::library::{
    AlbumsByArtistOperation, AlbumsOperation, AlbumsResponse, ArtistsOperation, ArtistsResponse,
    GenresOperation, GenresResponse, ListRequest, PlaylistsOperation, PlaylistsResponse,
    SearchOperation, SearchRequest, SearchResponse, TracksByAlbumOperation,
    TracksByArtistOperation, TracksByGenreOperation, TracksOperation, TracksResponse,
};
use squeeze_api::operations::server::{
    AppsOperation, AppsRequest, AppsResponse, PlayerCountOperation, PlayerCountRequest,
    PlayerIdOperation, PlayerIdRequest, PlayerIpOperation, PlayerIpRequest, PlayerNameOperation,
    PlayerNameRequest, PlayersOperation, PlayersRequest, PlayersResponse, SyncGroup,
    SyncGroupsOperation, SyncGroupsRequest, TotalKind, TotalOperation, TotalRequest,
};
use squeeze_api::{DeviceId, ServerConfig, SqueezeClient, SqueezeOperation};
use tracing::{debug, info, warn};

use crate::apps::{App, AppContext, AppRegistry};
use crate::error::{Result, SdkError};
use crate::player::SqueezePlayer;

/// Library statistics from [`SqueezeServer::totals`]
///
/// Only the artist count decides success; any other count whose query
/// failed is reported as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub artists: u32,
    pub albums: u32,
    pub songs: u32,
    pub genres: u32,
}

/// Handle to a media server
///
/// # Example
///
/// ```rust,no_run
/// use squeeze_sdk::{ServerConfig, SqueezeServer};
///
/// let server = SqueezeServer::new(ServerConfig::new("192.168.1.10", 9000))?;
/// server.register()?;
///
/// for player in server.registered_players() {
///     println!("{} {:?}", player.id, player.name);
/// }
/// # Ok::<(), squeeze_sdk::SdkError>(())
/// ```
pub struct SqueezeServer {
    client: SqueezeClient,
    players: RwLock<HashMap<DeviceId, SqueezePlayer>>,
    apps: RwLock<HashMap<String, Arc<dyn App>>>,
}

impl SqueezeServer {
    pub fn new(config: ServerConfig) -> Result<Self> {
        Ok(Self::with_client(SqueezeClient::new(config)?))
    }

    pub fn with_client(client: SqueezeClient) -> Self {
        Self {
            client,
            players: RwLock::new(HashMap::new()),
            apps: RwLock::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &SqueezeClient {
        &self.client
    }

    fn execute<Op: SqueezeOperation>(&self, request: &Op::Request) -> Result<Op::Response> {
        Ok(self.client.execute::<Op>(&DeviceId::broadcast(), request)?)
    }

    // ========================================================================
    // Players
    // ========================================================================

    /// Number of players known to the server (they must be powered on)
    pub fn player_count(&self) -> Result<u32> {
        Ok(self.execute::<PlayerCountOperation>(&PlayerCountRequest {})?.count)
    }

    pub fn player_id(&self, index: u32) -> Result<Option<String>> {
        Ok(self.execute::<PlayerIdOperation>(&PlayerIdRequest { index })?.id)
    }

    pub fn player_ip(&self, player: &DeviceId) -> Result<Option<String>> {
        Ok(self
            .execute::<PlayerIpOperation>(&PlayerIpRequest { player: player.clone() })?
            .ip)
    }

    pub fn player_name(&self, player: &DeviceId) -> Result<Option<String>> {
        Ok(self
            .execute::<PlayerNameOperation>(&PlayerNameRequest { player: player.clone() })?
            .name)
    }

    pub fn sync_groups(&self) -> Result<Vec<SyncGroup>> {
        Ok(self.execute::<SyncGroupsOperation>(&SyncGroupsRequest {})?.groups)
    }

    pub fn players(&self) -> Result<PlayersResponse> {
        self.execute::<PlayersOperation>(&PlayersRequest {})
    }

    /// Refresh the player registry from the server
    ///
    /// The registry is replaced in full, one player per distinct id. When
    /// the fetch fails the previous registry is kept.
    pub fn register(&self) -> Result<usize> {
        let reply = self.players()?;

        let mut registry = HashMap::with_capacity(reply.players.len());
        for info in reply.players {
            if registry.contains_key(&info.id) {
                debug!(player_id = %info.id, "Skipping duplicate player record");
                continue;
            }
            let player = SqueezePlayer::new(info.id.clone(), info.name, self.client.clone());
            registry.insert(info.id, player);
        }

        let count = registry.len();
        match self.players.write() {
            Ok(mut players) => *players = registry,
            Err(poisoned) => *poisoned.into_inner() = registry,
        }

        info!(players = count, "Registered players");
        Ok(count)
    }

    pub fn player(&self, id: &DeviceId) -> Option<SqueezePlayer> {
        self.players.read().ok()?.get(id).cloned()
    }

    /// First registered player whose reported name matches exactly
    pub fn player_by_name(&self, name: &str) -> Option<SqueezePlayer> {
        self.players
            .read()
            .ok()?
            .values()
            .find(|p| p.name.as_deref() == Some(name))
            .cloned()
    }

    /// Like [`player`](Self::player), failing with [`SdkError::PlayerNotFound`]
    pub fn require_player(&self, id: &DeviceId) -> Result<SqueezePlayer> {
        self.player(id)
            .ok_or_else(|| SdkError::PlayerNotFound(id.to_string()))
    }

    /// Registered players ordered by id
    pub fn registered_players(&self) -> Vec<SqueezePlayer> {
        let mut players: Vec<SqueezePlayer> = self
            .players
            .read()
            .map(|p| p.values().cloned().collect())
            .unwrap_or_default();
        players.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        players
    }

    // ========================================================================
    // Library
    // ========================================================================

    /// Artist, album, song and genre counts, queried concurrently
    ///
    /// Fails only when the artist query fails.
    pub fn totals(&self) -> Result<Totals> {
        let [artists, albums, songs, genres] = thread::scope(|scope| {
            let handles = TotalKind::ALL.map(|kind| {
                let client = &self.client;
                scope.spawn(move || {
                    client
                        .execute::<TotalOperation>(&DeviceId::broadcast(), &TotalRequest { kind })
                        .map(|r| r.count)
                })
            });
            handles.map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(squeeze_api::ApiError::NetworkError(
                        "total query thread panicked".to_string(),
                    ))
                })
            })
        });

        let or_zero = |kind: TotalKind, outcome: squeeze_api::Result<u32>| match outcome {
            Ok(count) => count,
            Err(e) => {
                warn!(kind = %kind, "Total query failed: {}", e);
                0
            }
        };

        Ok(Totals {
            artists: artists?,
            albums: or_zero(TotalKind::Albums, albums),
            songs: or_zero(TotalKind::Songs, songs),
            genres: or_zero(TotalKind::Genres, genres),
        })
    }

    /// Artists whose name matches `filter`, or all artists
    pub fn artists(&self, filter: Option<&str>, skip: Option<u32>, take: Option<u32>) -> Result<ArtistsResponse> {
        self.execute::<ArtistsOperation>(&list_request(filter, skip, take))
    }

    pub fn albums(&self, filter: Option<&str>, skip: Option<u32>, take: Option<u32>) -> Result<AlbumsResponse> {
        self.execute::<AlbumsOperation>(&list_request(filter, skip, take))
    }

    pub fn tracks(&self, filter: Option<&str>, skip: Option<u32>, take: Option<u32>) -> Result<TracksResponse> {
        self.execute::<TracksOperation>(&list_request(filter, skip, take))
    }

    pub fn genres(&self, filter: Option<&str>, skip: Option<u32>, take: Option<u32>) -> Result<GenresResponse> {
        self.execute::<GenresOperation>(&list_request(filter, skip, take))
    }

    pub fn playlists(&self, filter: Option<&str>, skip: Option<u32>, take: Option<u32>) -> Result<PlaylistsResponse> {
        self.execute::<PlaylistsOperation>(&list_request(filter, skip, take))
    }

    pub fn albums_by_artist_id(&self, artist_id: &str, skip: Option<u32>, take: Option<u32>) -> Result<AlbumsResponse> {
        self.execute::<AlbumsByArtistOperation>(&list_request(Some(artist_id), skip, take))
    }

    pub fn tracks_by_album_id(&self, album_id: &str, skip: Option<u32>, take: Option<u32>) -> Result<TracksResponse> {
        self.execute::<TracksByAlbumOperation>(&list_request(Some(album_id), skip, take))
    }

    pub fn tracks_by_artist_id(&self, artist_id: &str, skip: Option<u32>, take: Option<u32>) -> Result<TracksResponse> {
        self.execute::<TracksByArtistOperation>(&list_request(Some(artist_id), skip, take))
    }

    pub fn tracks_by_genre_id(&self, genre_id: &str, skip: Option<u32>, take: Option<u32>) -> Result<TracksResponse> {
        self.execute::<TracksByGenreOperation>(&list_request(Some(genre_id), skip, take))
    }

    /// Search tracks, albums and contributors (defaults: skip "0", take "5")
    pub fn search(&self, term: &str, skip: Option<u32>, take: Option<u32>) -> Result<SearchResponse> {
        self.execute::<SearchOperation>(&SearchRequest {
            term: term.to_string(),
            skip,
            take,
        })
    }

    // ========================================================================
    // Apps
    // ========================================================================

    pub fn apps(&self) -> Result<AppsResponse> {
        self.execute::<AppsOperation>(&AppsRequest {})
    }

    /// Instantiate every installed app that `registry` has a factory for
    ///
    /// Replaces previously loaded apps. Returns the number loaded.
    pub fn load_apps(&self, registry: &AppRegistry) -> Result<usize> {
        let reply = self.apps()?;

        let mut loaded: HashMap<String, Arc<dyn App>> = HashMap::new();
        for descriptor in reply.apps {
            let context = AppContext {
                device: DeviceId::broadcast(),
                name: descriptor.name,
                cmd: descriptor.cmd,
                client: self.client.clone(),
            };
            let cmd = context.cmd.clone();
            match registry.instantiate(context) {
                Some(app) => {
                    loaded.insert(cmd, Arc::from(app));
                }
                None => debug!(app = %cmd, "No factory registered for app"),
            }
        }

        let count = loaded.len();
        match self.apps.write() {
            Ok(mut apps) => *apps = loaded,
            Err(poisoned) => *poisoned.into_inner() = loaded,
        }

        info!(apps = count, "Loaded apps");
        Ok(count)
    }

    /// The loaded app answering to `cmd`
    pub fn app(&self, cmd: &str) -> Result<Arc<dyn App>> {
        self.apps
            .read()
            .ok()
            .and_then(|apps| apps.get(cmd).cloned())
            .ok_or_else(|| SdkError::AppNotFound(cmd.to_string()))
    }

    /// Commands of the loaded apps, sorted
    pub fn app_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .apps
            .read()
            .map(|apps| apps.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

fn list_request(filter: Option<&str>, skip: Option<u32>, take: Option<u32>) -> ListRequest {
    ListRequest {
        filter: filter.map(str::to_string),
        skip,
        take,
    }
}
