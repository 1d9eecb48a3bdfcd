//! Game server summaries and cached profiles.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;

/// Backend-assigned server identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::invalid_id("server id cannot be empty"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ServerId {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Operational state reported by the fleet backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Active,
    Starting,
    Stopping,
    Stopped,
    Unresponsive,
}

impl ServerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ServerStatus::Active => "active",
            ServerStatus::Starting => "starting",
            ServerStatus::Stopping => "stopping",
            ServerStatus::Stopped => "stopped",
            ServerStatus::Unresponsive => "unresponsive",
        }
    }
}

/// Live summary of one server.
///
/// `profile_time` is bumped by the backend every time the server's profile is
/// edited; it is compared against [`ServerProfile::edit_time`] to detect stale
/// cache entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSummary {
    pub id: ServerId,
    pub status: ServerStatus,
    pub max_players: u32,
    pub player_count: u32,
    #[serde(default)]
    pub players: Vec<String>,
    pub profile_time: i64,
}

/// Descriptive metadata for a server, cached client side.
///
/// Fields the client does not model are kept in `extra` so a persisted copy
/// serializes back to what the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerProfile {
    pub server_id: ServerId,
    pub edit_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerProfile {
    pub fn new(server_id: ServerId, edit_time: i64) -> Self {
        Self {
            server_id,
            edit_time,
            name: None,
            name_en: None,
            game_version: None,
            server_version: None,
            announcement: None,
            extra: Map::new(),
        }
    }

    /// A cached profile is usable for `summary` unless the backend has edited
    /// it since this copy was taken.
    pub fn is_fresh_for(&self, summary: &ServerSummary) -> bool {
        self.edit_time >= summary.profile_time
    }

    /// Name to show in listings, falling back to the server id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.name_en.as_deref())
            .unwrap_or(self.server_id.as_str())
    }
}
