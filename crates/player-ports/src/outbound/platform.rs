//! Platform abstraction ports
//!
//! Persistent storage and wall-clock time are platform concerns: the desktop
//! build keeps a JSON file and reads the system clock, tests swap in
//! in-memory fakes.

use chrono::{DateTime, Utc};

/// Persistent key-value storage (string keys, string values)
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait StorageProvider: Send + Sync {
    /// Save a string value with the given key
    fn save(&self, key: &str, value: &str);

    /// Load a string value by key, returns None if not found
    fn load(&self, key: &str) -> Option<String>;

    /// Remove a value by key
    fn remove(&self, key: &str);
}

/// Wall-clock time, injectable for expiry tests
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Storage key constants
///
/// These are kept in the ports layer as they define the contract for
/// what keys are used across the application.
pub mod storage_keys {
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const AUTH_USER: &str = "auth_user";
    pub const SERVER_PROFILES: &str = "data_server_profiles";
}
