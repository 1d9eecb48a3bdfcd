//! Values persisted with an expiry horizon.
//!
//! Session fields are stored as `{"value": ..., "expires_at": ...}`. An entry
//! past its horizon, or one that no longer parses, is deleted on read.

use arucraftr_player_ports::outbound::StorageProvider;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Session token and user survive 25 hours from the last write.
pub fn session_max_age() -> TimeDelta {
    TimeDelta::hours(24) + TimeDelta::hours(1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expiring<T> {
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> Expiring<T> {
    pub fn new(value: T, written_at: DateTime<Utc>, max_age: TimeDelta) -> Self {
        Self {
            value,
            expires_at: written_at + max_age,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub fn save_expiring<T: Serialize>(
    storage: &dyn StorageProvider,
    key: &str,
    value: T,
    now: DateTime<Utc>,
) {
    let entry = Expiring::new(value, now, session_max_age());
    match serde_json::to_string(&entry) {
        Ok(json) => storage.save(key, &json),
        Err(e) => tracing::error!(key, error = %e, "Failed to serialize persisted entry"),
    }
}

pub fn load_fresh<T: DeserializeOwned>(
    storage: &dyn StorageProvider,
    key: &str,
    now: DateTime<Utc>,
) -> Option<T> {
    let raw = storage.load(key)?;
    match serde_json::from_str::<Expiring<T>>(&raw) {
        Ok(entry) if entry.is_expired(now) => {
            tracing::debug!(key, expires_at = %entry.expires_at, "Dropping expired entry");
            storage.remove(key);
            None
        }
        Ok(entry) => Some(entry.value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Dropping unreadable entry");
            storage.remove(key);
            None
        }
    }
}
