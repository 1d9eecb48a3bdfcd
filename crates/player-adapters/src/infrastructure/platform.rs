//! Desktop platform implementations
//!
//! File-backed key-value storage and the system clock.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;

use arucraftr_player_ports::outbound::{ClockPort, StorageProvider};

/// Storage provider with file-based persistence
///
/// Stores key-value pairs in a JSON file at:
/// - Linux: ~/.config/panel/storage.json
/// - macOS: ~/Library/Application Support/org.arucraftr.panel/storage.json
/// - Windows: C:\Users\<User>\AppData\Roaming\arucraftr\panel\config\storage.json
#[derive(Clone)]
pub struct FileStorageProvider {
    storage_path: PathBuf,
    /// In-memory copy of the file; every write goes through to disk
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl Default for FileStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStorageProvider {
    /// Open the storage file in the platform config directory.
    pub fn new() -> Self {
        let storage_path = match ProjectDirs::from("org", "arucraftr", "panel") {
            Some(dirs) => dirs.config_dir().join("storage.json"),
            None => PathBuf::from("arucraftr_panel_storage.json"),
        };
        Self::with_path(storage_path)
    }

    /// Open (or create on first write) the storage file at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let storage_path = path.into();
        let cache = load_file(&storage_path);

        tracing::debug!(path = ?storage_path, entries = cache.len(), "File storage initialized");

        Self {
            storage_path,
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    fn persist(&self, cache: &HashMap<String, String>) {
        if let Some(parent) = self.storage_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::error!(error = %e, "Failed to create storage directory");
                return;
            }
        }

        match serde_json::to_string_pretty(cache) {
            Ok(data) => {
                if let Err(e) = fs::write(&self.storage_path, data) {
                    tracing::error!(error = %e, "Failed to write storage file");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize storage data"),
        }
    }
}

fn load_file(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse storage file");
                HashMap::new()
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read storage file");
            HashMap::new()
        }
    }
}

impl StorageProvider for FileStorageProvider {
    fn save(&self, key: &str, value: &str) {
        match self.cache.write() {
            Ok(mut guard) => {
                guard.insert(key.to_string(), value.to_string());
                self.persist(&guard);
            }
            Err(e) => tracing::error!(key, error = %e, "Failed to acquire storage lock"),
        }
    }

    fn load(&self, key: &str) -> Option<String> {
        match self.cache.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(e) => {
                tracing::error!(key, error = %e, "Failed to acquire storage lock");
                None
            }
        }
    }

    fn remove(&self, key: &str) {
        match self.cache.write() {
            Ok(mut guard) => {
                if guard.remove(key).is_some() {
                    self.persist(&guard);
                }
            }
            Err(e) => tracing::error!(key, error = %e, "Failed to acquire storage lock"),
        }
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
