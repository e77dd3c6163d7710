//! Catalog listing and search
//!
//! Each listing command takes a skip and a take token followed by optional
//! keyed tokens. The defaults differ per command and are part of the wire
//! contract, so every operation carries its own [`PageDefaults`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::command::Command;
use crate::de;
use crate::device::ItemId;
use crate::error::ApiError;
use crate::operation::{parse_schema, require, Scope, SqueezeOperation, ValidationError};
use crate::operations::PageDefaults;

/// Tags selecting album title and artist ids
pub const ALBUM_TAGS: &str = "tSS";

/// Tags selecting artist, album, url, contributor and genre ids of a track
pub const TRACK_TAGS: &str = "seuSp";

/// Tags selecting the url of a playlist
pub const PLAYLIST_TAGS: &str = "u";

/// Arguments shared by every listing command
///
/// For text-filtered listings `filter` is an optional search string. For the
/// by-id listings it holds the required id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub filter: Option<String>,
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

impl ListRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Self::default()
        }
    }

    pub fn page(mut self, skip: u32, take: u32) -> Self {
        self.skip = Some(skip);
        self.take = Some(take);
        self
    }
}

/// How the `filter` of a [`ListRequest`] is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Optional `search:<text>`; omitted entirely when there is no filter
    Search,
    /// Required `<key>:<id>`
    Equals(&'static str),
}

/// Build a listing command from its parts
pub fn list_command(
    entity: &str,
    defaults: PageDefaults,
    tags: Option<&str>,
    filter: Filter,
    request: &ListRequest,
) -> Result<Command, ValidationError> {
    let mut command = defaults
        .apply(Command::new(entity), request.skip, request.take)
        .tagged_opt("tags", tags);

    command = match filter {
        Filter::Search => command.tagged_opt(
            "search",
            request.filter.as_deref().filter(|f| !f.is_empty()),
        ),
        Filter::Equals(key) => command.tagged(key, require(key, request.filter.as_deref())?),
    };

    Ok(command)
}

macro_rules! define_list_operation {
    (
        operation: $op:ident,
        entity: $entity:literal,
        defaults: $defaults:expr,
        tags: $tags:expr,
        filter: $filter:expr,
        response: $response:ty $(,)?
    ) => {
        pub struct $op;

        impl SqueezeOperation for $op {
            type Request = ListRequest;
            type Response = $response;

            const SCOPE: Scope = Scope::Server;
            const COMMAND: &'static str = $entity;

            fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
                list_command($entity, $defaults, $tags, $filter, request)
            }

            fn parse_response(_request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
                parse_schema(result)
            }
        }

        impl $op {
            pub const DEFAULTS: PageDefaults = $defaults;
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ItemId,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub artist: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: ItemId,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub album: Option<String>,
    #[serde(default)]
    pub artist_id: Option<ItemId>,
    /// Comma-separated ids of every contributing artist
    #[serde(default, deserialize_with = "de::opt_string")]
    pub artist_ids: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: ItemId,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub title: Option<String>,
    #[serde(default)]
    pub artist_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub artist_ids: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub band_ids: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub composer_ids: Option<String>,
    #[serde(default)]
    pub album_id: Option<ItemId>,
    #[serde(default)]
    pub genre_id: Option<ItemId>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: ItemId,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub genre: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: ItemId,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub playlist: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistsResponse {
    #[serde(default, deserialize_with = "de::count")]
    pub count: u32,
    #[serde(rename = "artists_loop", default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumsResponse {
    #[serde(default, deserialize_with = "de::count")]
    pub count: u32,
    #[serde(rename = "albums_loop", default)]
    pub albums: Vec<Album>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracksResponse {
    #[serde(default, deserialize_with = "de::count")]
    pub count: u32,
    #[serde(rename = "titles_loop", default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenresResponse {
    #[serde(default, deserialize_with = "de::count")]
    pub count: u32,
    #[serde(rename = "genres_loop", default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistsResponse {
    #[serde(default, deserialize_with = "de::count")]
    pub count: u32,
    #[serde(rename = "playlists_loop", default)]
    pub playlists: Vec<Playlist>,
}

define_list_operation! {
    operation: ArtistsOperation,
    entity: "artists",
    defaults: PageDefaults::sentinel("-"),
    tags: None,
    filter: Filter::Search,
    response: ArtistsResponse,
}

define_list_operation! {
    operation: AlbumsOperation,
    entity: "albums",
    defaults: PageDefaults::sentinel("-"),
    tags: Some(ALBUM_TAGS),
    filter: Filter::Search,
    response: AlbumsResponse,
}

define_list_operation! {
    operation: TracksOperation,
    entity: "tracks",
    defaults: PageDefaults::sentinel("-"),
    tags: Some(TRACK_TAGS),
    filter: Filter::Search,
    response: TracksResponse,
}

define_list_operation! {
    operation: GenresOperation,
    entity: "genres",
    defaults: PageDefaults::sentinel("_"),
    tags: None,
    filter: Filter::Search,
    response: GenresResponse,
}

define_list_operation! {
    operation: PlaylistsOperation,
    entity: "playlists",
    defaults: PageDefaults::numbers(0, 100000),
    tags: Some(PLAYLIST_TAGS),
    filter: Filter::Search,
    response: PlaylistsResponse,
}

define_list_operation! {
    operation: AlbumsByArtistOperation,
    entity: "albums",
    defaults: PageDefaults::sentinel("-"),
    tags: Some(ALBUM_TAGS),
    filter: Filter::Equals("artist_id"),
    response: AlbumsResponse,
}

define_list_operation! {
    operation: TracksByAlbumOperation,
    entity: "tracks",
    defaults: PageDefaults::sentinel("-"),
    tags: Some(TRACK_TAGS),
    filter: Filter::Equals("album_id"),
    response: TracksResponse,
}

define_list_operation! {
    operation: TracksByArtistOperation,
    entity: "tracks",
    defaults: PageDefaults::sentinel("-"),
    tags: Some(TRACK_TAGS),
    filter: Filter::Equals("artist_id"),
    response: TracksResponse,
}

define_list_operation! {
    operation: TracksByGenreOperation,
    entity: "tracks",
    defaults: PageDefaults::sentinel("-"),
    tags: Some(TRACK_TAGS),
    filter: Filter::Equals("genre_id"),
    response: TracksResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackHit {
    #[serde(default)]
    pub track_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub track: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumHit {
    #[serde(default)]
    pub album_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub album: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorHit {
    #[serde(default)]
    pub contributor_id: Option<ItemId>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub contributor: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "de::count")]
    pub count: u32,
    #[serde(rename = "tracks_loop", default)]
    pub tracks: Vec<TrackHit>,
    #[serde(rename = "albums_loop", default)]
    pub albums: Vec<AlbumHit>,
    #[serde(rename = "contributors_loop", default)]
    pub contributors: Vec<ContributorHit>,
}

/// Search tracks, albums and contributors at once
pub struct SearchOperation;

impl SearchOperation {
    /// Sent as strings, not numbers
    pub const DEFAULTS: PageDefaults = PageDefaults {
        skip: crate::operations::Bound::Sentinel("0"),
        take: crate::operations::Bound::Sentinel("5"),
    };
}

impl SqueezeOperation for SearchOperation {
    type Request = SearchRequest;
    type Response = SearchResponse;

    const SCOPE: Scope = Scope::Server;
    const COMMAND: &'static str = "search";

    fn build_command(request: &Self::Request) -> Result<Command, ValidationError> {
        let term = require("term", Some(request.term.as_str()))?;
        Ok(Self::DEFAULTS
            .apply(Command::new("search"), request.skip, request.take)
            .tagged("extended", 1)
            .tagged("term", term))
    }

    fn parse_response(_request: &Self::Request, result: &Value) -> Result<Self::Response, ApiError> {
        parse_schema(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn line<Op: SqueezeOperation<Request = ListRequest>>(request: &ListRequest) -> String {
        Op::build_command(request).unwrap().to_string()
    }

    #[rstest]
    #[case(line::<ArtistsOperation>(&ListRequest::all()), "artists - -")]
    #[case(line::<AlbumsOperation>(&ListRequest::all()), "albums - - tags:tSS")]
    #[case(line::<TracksOperation>(&ListRequest::all()), "tracks - - tags:seuSp")]
    #[case(line::<GenresOperation>(&ListRequest::all()), "genres _ _")]
    #[case(line::<PlaylistsOperation>(&ListRequest::all()), "playlists 0 100000 tags:u")]
    #[case(line::<AlbumsByArtistOperation>(&ListRequest::matching("7")), "albums - - tags:tSS artist_id:7")]
    #[case(line::<TracksByAlbumOperation>(&ListRequest::matching("8")), "tracks - - tags:seuSp album_id:8")]
    #[case(line::<TracksByArtistOperation>(&ListRequest::matching("9")), "tracks - - tags:seuSp artist_id:9")]
    #[case(line::<TracksByGenreOperation>(&ListRequest::matching("3")), "tracks - - tags:seuSp genre_id:3")]
    fn test_default_pagination(#[case] actual: String, #[case] expected: &str) {
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_defaults_are_sent_as_typed() {
        let command = PlaylistsOperation::build_command(&ListRequest::all()).unwrap();
        assert_eq!(command.to_values()[1..3], [json!(0), json!(100000)]);

        let command = ArtistsOperation::build_command(&ListRequest::all()).unwrap();
        assert_eq!(command.to_values()[1..3], [json!("-"), json!("-")]);
    }

    #[test]
    fn test_caller_pagination_replaces_defaults() {
        let request = ListRequest::matching("beat").page(20, 10);
        assert_eq!(line::<ArtistsOperation>(&request), "artists 20 10 search:beat");
        assert_eq!(line::<GenresOperation>(&ListRequest::all().page(0, 50)), "genres 0 50");
    }

    #[test]
    fn test_empty_filter_is_omitted() {
        assert_eq!(line::<AlbumsOperation>(&ListRequest::matching("")), "albums - - tags:tSS");
    }

    #[test]
    fn test_by_id_requires_id() {
        for request in [ListRequest::all(), ListRequest::matching(" ")] {
            assert_eq!(
                TracksByAlbumOperation::build_command(&request),
                Err(ValidationError::missing("album_id"))
            );
        }
    }

    #[test]
    fn test_search_defaults_are_strings() {
        let request = SearchRequest {
            term: "blue".to_string(),
            ..Default::default()
        };
        let command = SearchOperation::build_command(&request).unwrap();
        assert_eq!(
            command.to_values(),
            vec![json!("search"), json!("0"), json!("5"), json!("extended:1"), json!("term:blue")]
        );

        let request = SearchRequest {
            term: "blue".to_string(),
            skip: Some(5),
            take: Some(25),
        };
        assert_eq!(SearchOperation::build_command(&request).unwrap().to_string(), "search 5 25 extended:1 term:blue");
    }

    #[test]
    fn test_search_requires_term() {
        assert_eq!(
            SearchOperation::build_command(&SearchRequest::default()),
            Err(ValidationError::missing("term"))
        );
    }

    #[test]
    fn test_parse_tracks() {
        let reply = TracksOperation::parse_response(
            &ListRequest::all(),
            &json!({
                "count": 1,
                "titles_loop": [{
                    "id": 101,
                    "title": "So What",
                    "artist_id": 7,
                    "album_id": "12",
                    "genre_id": 3,
                    "url": "file:///music/so_what.flac",
                    "artist_ids": "7, 9"
                }]
            }),
        )
        .unwrap();

        assert_eq!(reply.count, 1);
        let track = &reply.tracks[0];
        assert_eq!(track.id, ItemId::new("101"));
        assert_eq!(track.album_id, Some(ItemId::new("12")));
        assert_eq!(track.artist_ids.as_deref(), Some("7, 9"));
        assert!(track.extra.is_empty());
    }

    #[test]
    fn test_parse_numeric_names() {
        let artists = ArtistsOperation::parse_response(
            &ListRequest::all(),
            &json!({"count": 1, "artists_loop": [{"id": 4, "artist": 1349}]}),
        )
        .unwrap();
        assert_eq!(artists.artists[0].artist.as_deref(), Some("1349"));

        let genres = GenresOperation::parse_response(
            &ListRequest::all(),
            &json!({"count": 1, "genres_loop": [{"id": 2, "genre": 80}]}),
        )
        .unwrap();
        assert_eq!(genres.genres[0].genre.as_deref(), Some("80"));
    }

    #[test]
    fn test_parse_empty_listing() {
        let reply = GenresOperation::parse_response(&ListRequest::all(), &json!({"count": 0})).unwrap();
        assert_eq!(reply, GenresResponse::default());
    }

    #[test]
    fn test_parse_search() {
        let reply = SearchOperation::parse_response(
            &SearchRequest::default(),
            &json!({
                "count": 3,
                "tracks_loop": [{"track_id": 1, "track": "Blue in Green"}],
                "albums_loop": [{"album_id": 2, "album": "Kind of Blue"}],
                "contributors_loop": [{"contributor_id": 3, "contributor": "Miles Davis"}]
            }),
        )
        .unwrap();
        assert_eq!(reply.count, 3);
        assert_eq!(reply.tracks[0].track.as_deref(), Some("Blue in Green"));
        assert_eq!(reply.albums[0].album_id, Some(ItemId::new("2")));
        assert_eq!(reply.contributors[0].contributor.as_deref(), Some("Miles Davis"));
    }

    proptest! {
        #[test]
        fn search_token_present_only_with_filter(filter in proptest::option::of("[a-z]{0,8}")) {
            let request = ListRequest { filter: filter.clone(), ..Default::default() };
            let command = ArtistsOperation::build_command(&request).unwrap();
            let has_search = command.tokens().iter().any(|t| t.to_string().starts_with("search:"));
            let expected = filter.map(|f| !f.is_empty()).unwrap_or(false);
            prop_assert_eq!(has_search, expected);
        }
    }
}
