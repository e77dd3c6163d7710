//! Identity types for players and library items

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Macro to generate common ID type implementations
macro_rules! impl_id_type {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Identifier of a player attached to the server
///
/// Usually the player's MAC address in `aa:bb:cc:dd:ee:ff` form.
/// Server-wide commands are addressed to [`DeviceId::BROADCAST`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Target used for commands that are not scoped to a player
    pub const BROADCAST: &'static str = "00:00:00:00:00:00";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn broadcast() -> Self {
        Self(Self::BROADCAST.to_string())
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == Self::BROADCAST
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_id_type!(DeviceId);

/// Identifier of a library item (track, album, artist, playlist, ...)
///
/// The server sends these as JSON numbers in some replies and as strings in
/// others; both forms deserialize into the same textual id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl_id_type!(ItemId);

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(ItemId(s)),
            Value::Number(n) => Ok(ItemId(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected a string or number id, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_id() {
        let id = DeviceId::broadcast();
        assert_eq!(id.as_str(), "00:00:00:00:00:00");
        assert!(id.is_broadcast());
        assert!(!DeviceId::new("aa:bb:cc:dd:ee:ff").is_broadcast());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DeviceId::new("aa:bb:cc:dd:ee:ff")), "aa:bb:cc:dd:ee:ff");
        assert_eq!(format!("{}", ItemId::new("42")), "42");
    }

    #[test]
    fn test_item_id_accepts_numbers_and_strings() {
        let ids: Vec<ItemId> = serde_json::from_str(r#"[12, "34", 5.5]"#).unwrap();
        assert_eq!(ids, vec![ItemId::new("12"), ItemId::new("34"), ItemId::new("5.5")]);

        assert!(serde_json::from_str::<ItemId>("null").is_err());
    }

    #[test]
    fn test_device_id_is_transparent() {
        let id: DeviceId = serde_json::from_str(r#""aa:bb""#).unwrap();
        assert_eq!(id, DeviceId::from("aa:bb"));
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""aa:bb""#);
    }
}
