//! Authenticated player identity.

use serde::{Deserialize, Serialize};

/// Identity of the logged-in panel user.
///
/// The backend calls the external account id `qq_id` and the permission level
/// `permission`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthedPlayer {
    pub player_id: String,
    pub uuid: String,
    #[serde(rename = "qq_id")]
    pub external_id: String,
    #[serde(rename = "permission", default)]
    pub permission_level: u32,
}

impl AuthedPlayer {
    /// Placeholder written on logout: empty identity, permission 0.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.player_id.is_empty()
            && self.uuid.is_empty()
            && self.external_id.is_empty()
            && self.permission_level == 0
    }
}

/// Payload returned by the login endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<AuthedPlayer>,
}
