//! Operation definitions grouped by command family
//!
//! - [`server`]: player enumeration, sync groups, apps and library totals
//! - [`library`]: catalog listing and search
//! - [`playback`]: transport control and status of a single player
//! - [`playlist`]: stored playlists and the current play queue
//! - [`apps`]: browsing and playing from server apps

pub mod apps;
pub mod library;
pub mod playback;
pub mod playlist;
pub mod server;

use std::fmt;

use crate::command::{Command, Param};
use crate::operation::ValidationError;

/// Token standing for "any value" in genre/artist/album triples
pub const WILDCARD: &str = "*";

/// Default value for a skip or take token
///
/// Some commands use sentinel strings (`-`, `_`) rather than numbers; they
/// are sent exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Sentinel(&'static str),
    Number(u32),
}

impl From<Bound> for Param {
    fn from(bound: Bound) -> Self {
        match bound {
            Bound::Sentinel(s) => Param::text(s),
            Bound::Number(n) => Param::from(n),
        }
    }
}

/// Per-command pagination defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    pub skip: Bound,
    pub take: Bound,
}

impl PageDefaults {
    pub const fn sentinel(token: &'static str) -> Self {
        Self {
            skip: Bound::Sentinel(token),
            take: Bound::Sentinel(token),
        }
    }

    pub const fn numbers(skip: u32, take: u32) -> Self {
        Self {
            skip: Bound::Number(skip),
            take: Bound::Number(take),
        }
    }

    /// Append skip and take, letting caller values replace the defaults
    pub fn apply(&self, command: Command, skip: Option<u32>, take: Option<u32>) -> Command {
        command
            .arg(skip.map(Param::from).unwrap_or_else(|| self.skip.into()))
            .arg(take.map(Param::from).unwrap_or_else(|| self.take.into()))
    }
}

/// A genre/artist/album triple selecting tracks by name
///
/// Unset or blank fields are sent as the `*` wildcard. A selector whose
/// three fields are all wildcards selects nothing and is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumSelector {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

fn concrete(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != WILDCARD)
}

impl AlbumSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Whether every field is unset or a wildcard
    pub fn is_wildcard(&self) -> bool {
        concrete(&self.genre).is_none()
            && concrete(&self.artist).is_none()
            && concrete(&self.album).is_none()
    }

    /// The three positional tokens, with wildcards filled in
    pub fn tokens(&self) -> [String; 3] {
        [&self.genre, &self.artist, &self.album]
            .map(|field| concrete(field).unwrap_or(WILDCARD).to_string())
    }

    /// Append `prefix` followed by the triple, rejecting an all-wildcard selector
    pub fn command(&self, prefix: [&str; 2], parameter: &str) -> Result<Command, ValidationError> {
        if self.is_wildcard() {
            return Err(ValidationError::missing(parameter));
        }
        let [genre, artist, album] = self.tokens();
        Ok(Command::from_tokens(prefix).arg(genre).arg(artist).arg(album))
    }
}

impl fmt::Display for AlbumSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [genre, artist, album] = self.tokens();
        write!(f, "genre={} artist={} album={}", genre, artist, album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_page_defaults_and_overrides() {
        let defaults = PageDefaults::sentinel("-");
        let command = defaults.apply(Command::new("artists"), None, None);
        assert_eq!(command.to_values(), vec![json!("artists"), json!("-"), json!("-")]);

        let command = defaults.apply(Command::new("artists"), Some(10), None);
        assert_eq!(command.to_values(), vec![json!("artists"), json!(10), json!("-")]);

        let command = PageDefaults::numbers(0, 100000).apply(Command::new("playlists"), None, Some(0));
        assert_eq!(command.to_values(), vec![json!("playlists"), json!(0), json!(0)]);
    }

    #[test]
    fn test_selector_fills_wildcards() {
        let selector = AlbumSelector::new().artist("Miles Davis");
        assert_eq!(selector.tokens(), ["*".to_string(), "Miles Davis".to_string(), "*".to_string()]);
        assert!(!selector.is_wildcard());
    }

    #[test]
    fn test_selector_rejects_all_wildcards() {
        let selector = AlbumSelector::new().genre("*").album("  ");
        assert!(selector.is_wildcard());
        assert_eq!(
            selector.command(["playlist", "loadalbum"], "album"),
            Err(ValidationError::missing("album"))
        );
    }

    fn field() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some(String::new())),
            Just(Some("*".to_string())),
            "[A-Za-z][A-Za-z ]{0,12}".prop_map(Some),
        ]
    }

    proptest! {
        #[test]
        fn selector_command_has_five_tokens_or_is_rejected(genre in field(), artist in field(), album in field()) {
            let selector = AlbumSelector { genre, artist, album };
            match selector.command(["playlist", "addalbum"], "album") {
                Ok(command) => {
                    prop_assert!(!selector.is_wildcard());
                    prop_assert_eq!(command.len(), 5);
                    prop_assert!(command.tokens()[2..].iter().all(|t| !t.to_string().is_empty()));
                }
                Err(_) => prop_assert!(selector.is_wildcard()),
            }
        }
    }
}
