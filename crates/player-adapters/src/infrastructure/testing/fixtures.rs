//! Simple fakes used across unit tests.
//!
//! Every fake is a cheap `Clone` over shared state: hand one clone to the code
//! under test and keep another to drive or inspect it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};

use arucraftr_player_ports::outbound::{
    ClockPort, NavigationPort, Notification, NotificationPort, Route, StorageProvider,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Storage that lives only as long as its clones
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStorage {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.entries).keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl StorageProvider for InMemoryStorage {
    fn save(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }

    fn load(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn remove(&self, key: &str) {
        lock(&self.entries).remove(key);
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Default for FixedClock {
    /// 2025-01-01T00:00:00Z
    fn default() -> Self {
        Self::new(DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

/// Collects every notification in order
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.sent).clone()
    }
}

impl NotificationPort for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        lock(&self.sent).push(notification);
    }
}

/// Collects every navigation request in order
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    pub fn history(&self) -> Vec<Route> {
        lock(&self.routes).clone()
    }

    pub fn last(&self) -> Option<Route> {
        lock(&self.routes).last().copied()
    }
}

impl NavigationPort for RecordingNavigator {
    fn navigate_to(&self, route: Route) {
        lock(&self.routes).push(route);
    }
}
