//! Server profile cache
//!
//! Profiles are persisted locally and keyed by server id. Each reconcile pass
//! compares them against the live summaries, evicts stale copies, fetches
//! everything missing in a single batched call and hides servers whose
//! profile could not be obtained. A hidden server is not requested again
//! until its summary's `profile_time` moves past the one it was hidden at.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arucraftr_domain::{ServerId, ServerProfile, ServerSummary};
use arucraftr_player_ports::outbound::{storage_keys, StorageProvider};
use tokio::sync::Mutex;

use crate::application::api::ApiGateway;

pub const GET_PROFILES_PATH: &str = "/server/get_profiles";

#[derive(Debug, Default)]
struct CacheState {
    profiles: BTreeMap<ServerId, ServerProfile>,
    /// Hidden ids with the `profile_time` they were last hidden at
    hidden: BTreeMap<ServerId, i64>,
}

pub struct ProfileCache {
    gateway: ApiGateway,
    storage: Arc<dyn StorageProvider>,
    state: RwLock<CacheState>,
    /// Serializes reconcile passes; held across the batched fetch
    reconcile_lock: Mutex<()>,
}

impl ProfileCache {
    /// Create the cache, loading any persisted profiles.
    pub fn new(gateway: ApiGateway, storage: Arc<dyn StorageProvider>) -> Self {
        let profiles = restore(storage.as_ref());
        tracing::debug!(count = profiles.len(), "Loaded cached server profiles");

        Self {
            gateway,
            storage,
            state: RwLock::new(CacheState {
                profiles,
                hidden: BTreeMap::new(),
            }),
            reconcile_lock: Mutex::new(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bring the cache up to date with `summaries` and return, in input order,
    /// the summaries that have a usable profile.
    ///
    /// Issues at most one network call.
    pub async fn reconcile(&self, summaries: &[ServerSummary]) -> Vec<ServerSummary> {
        let _pass = self.reconcile_lock.lock().await;

        let missing = self.evict_stale_and_collect_missing(summaries);

        if !missing.is_empty() {
            tracing::debug!(count = missing.len(), "Fetching missing server profiles");
            match self
                .gateway
                .post::<Vec<ServerProfile>, _>(GET_PROFILES_PATH, &missing)
                .await
            {
                Ok(envelope) => {
                    if let Some(profiles) = envelope.into_data() {
                        self.merge(profiles);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Profile fetch failed; nothing merged");
                }
            }
        }

        self.filter_and_update_hidden(summaries)
    }

    fn evict_stale_and_collect_missing(&self, summaries: &[ServerSummary]) -> Vec<ServerId> {
        let mut state = self.write();
        let mut evicted = false;
        let mut missing: Vec<ServerId> = Vec::new();

        for summary in summaries {
            if let Some(profile) = state.profiles.get(&summary.id) {
                if profile.is_fresh_for(summary) {
                    continue;
                }
                tracing::debug!(
                    server_id = %summary.id,
                    cached = profile.edit_time,
                    current = summary.profile_time,
                    "Evicting stale profile"
                );
                state.profiles.remove(&summary.id);
                evicted = true;
            }

            if missing.contains(&summary.id) {
                continue;
            }
            if let Some(&hidden_at) = state.hidden.get(&summary.id) {
                if summary.profile_time <= hidden_at {
                    continue;
                }
                tracing::debug!(
                    server_id = %summary.id,
                    hidden_at,
                    current = summary.profile_time,
                    "Retrying hidden server after profile update"
                );
            }
            missing.push(summary.id.clone());
        }

        if evicted {
            self.persist(&state);
        }
        missing
    }

    fn merge(&self, profiles: Vec<ServerProfile>) {
        let mut state = self.write();
        for profile in profiles {
            // Keyed by the id the backend put in the record, not request order.
            state.profiles.insert(profile.server_id.clone(), profile);
        }
        self.persist(&state);
    }

    fn filter_and_update_hidden(&self, summaries: &[ServerSummary]) -> Vec<ServerSummary> {
        let mut state = self.write();
        let mut visible = Vec::with_capacity(summaries.len());

        for summary in summaries {
            if state.profiles.contains_key(&summary.id) {
                state.hidden.remove(&summary.id);
                visible.push(summary.clone());
            } else if state
                .hidden
                .insert(summary.id.clone(), summary.profile_time)
                .is_none()
            {
                tracing::debug!(server_id = %summary.id, "Hiding server without profile");
            }
        }
        visible
    }

    fn persist(&self, state: &CacheState) {
        match serde_json::to_string(&state.profiles) {
            Ok(json) => self.storage.save(storage_keys::SERVER_PROFILES, &json),
            Err(e) => tracing::error!(error = %e, "Failed to serialize server profiles"),
        }
    }

    pub fn profile(&self, id: &ServerId) -> Option<ServerProfile> {
        self.read().profiles.get(id).cloned()
    }

    pub fn profiles(&self) -> Vec<ServerProfile> {
        self.read().profiles.values().cloned().collect()
    }

    pub fn is_hidden(&self, id: &ServerId) -> bool {
        self.read().hidden.contains_key(id)
    }

    pub fn hidden(&self) -> BTreeSet<ServerId> {
        self.read().hidden.keys().cloned().collect()
    }

    /// Forget hidden servers so the next pass requests them again.
    pub fn reset_hidden(&self) {
        self.write().hidden.clear();
    }
}

fn restore(storage: &dyn StorageProvider) -> BTreeMap<ServerId, ServerProfile> {
    let Some(raw) = storage.load(storage_keys::SERVER_PROFILES) else {
        return BTreeMap::new();
    };

    match serde_json::from_str(&raw) {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable profile cache");
            storage.remove(storage_keys::SERVER_PROFILES);
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arucraftr_domain::ServerStatus;
    use arucraftr_player_adapters::infrastructure::testing::{
        FixedClock, InMemoryStorage, ManualScheduler, RecordingNavigator, RecordingNotifier,
    };
    use arucraftr_player_ports::outbound::{
        HttpMethod, HttpResponse, MockHttpTransportPort, TransportError,
    };
    use serde_json::json;

    use crate::application::config::PanelConfig;
    use crate::application::session::SessionStore;

    fn sid(id: &str) -> ServerId {
        ServerId::new(id).unwrap()
    }

    fn summary(id: &str, profile_time: i64) -> ServerSummary {
        ServerSummary {
            id: sid(id),
            status: ServerStatus::Active,
            max_players: 20,
            player_count: 1,
            players: vec!["steve".into()],
            profile_time,
        }
    }

    fn profile(id: &str, edit_time: i64) -> ServerProfile {
        ServerProfile::new(sid(id), edit_time)
    }

    fn seed(storage: &InMemoryStorage, profiles: &[ServerProfile]) {
        let map: BTreeMap<ServerId, ServerProfile> = profiles
            .iter()
            .map(|p| (p.server_id.clone(), p.clone()))
            .collect();
        storage.save(
            storage_keys::SERVER_PROFILES,
            &serde_json::to_string(&map).unwrap(),
        );
    }

    fn cache(transport: MockHttpTransportPort, storage: &InMemoryStorage) -> ProfileCache {
        let session = SessionStore::new(
            Arc::new(storage.clone()),
            Arc::new(FixedClock::default()),
            Arc::new(RecordingNavigator::default()),
            Arc::new(ManualScheduler::default()),
        );
        let gateway = ApiGateway::new(
            Arc::new(transport),
            session,
            Arc::new(RecordingNotifier::default()),
            PanelConfig::new("https://panel.test"),
        );
        ProfileCache::new(gateway, Arc::new(storage.clone()))
    }

    fn ok_profiles(profiles: Vec<ServerProfile>) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(
            200,
            Some(json!({"code": 200, "msg": "", "data": profiles})),
        ))
    }

    fn ids(summaries: &[ServerSummary]) -> Vec<&str> {
        summaries.iter().map(|s| s.id.as_str()).collect()
    }

    #[tokio::test]
    async fn fresh_cache_hit_makes_no_call() {
        let storage = InMemoryStorage::default();
        seed(&storage, &[profile("s1", 5)]);
        // No expectation: a send would fail the test.
        let cache = cache(MockHttpTransportPort::new(), &storage);

        let visible = cache.reconcile(&[summary("s1", 5)]).await;

        assert_eq!(ids(&visible), vec!["s1"]);
        assert!(!cache.is_hidden(&sid("s1")));
    }

    #[tokio::test]
    async fn stale_profile_is_evicted_and_replaced() {
        let storage = InMemoryStorage::default();
        seed(&storage, &[profile("s2", 3)]);

        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.path == GET_PROFILES_PATH
                    && req.body == Some(json!(["s2"]))
            })
            .times(1)
            .returning(|_| {
                let mut fresh = profile("s2", 9);
                fresh.name = Some("Survival".into());
                ok_profiles(vec![fresh])
            });
        let cache = cache(transport, &storage);

        let visible = cache.reconcile(&[summary("s2", 9)]).await;

        assert_eq!(ids(&visible), vec!["s2"]);
        let cached = cache.profile(&sid("s2")).unwrap();
        assert_eq!(cached.edit_time, 9);
        assert_eq!(cached.name.as_deref(), Some("Survival"));
        assert!(!cache.is_hidden(&sid("s2")));

        // The replacement is what got persisted.
        let persisted = storage.load(storage_keys::SERVER_PROFILES).unwrap();
        assert!(persisted.contains("Survival"));
    }

    #[tokio::test]
    async fn omitted_server_is_hidden_and_skipped_next_pass() {
        let storage = InMemoryStorage::default();
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| ok_profiles(vec![]));
        let cache = cache(transport, &storage);

        let visible = cache.reconcile(&[summary("s3", 1)]).await;
        assert!(visible.is_empty());
        assert!(cache.is_hidden(&sid("s3")));

        // Second pass: hidden, so no call (times(1) above enforces it).
        let visible = cache.reconcile(&[summary("s3", 1)]).await;
        assert!(visible.is_empty());
    }

    #[tokio::test]
    async fn hidden_server_recovers_when_profile_time_advances() {
        let storage = InMemoryStorage::default();
        let mut transport = MockHttpTransportPort::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ok_profiles(vec![]));
        transport
            .expect_send()
            .withf(|req| req.body == Some(json!(["s3"])))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ok_profiles(vec![profile("s3", 7)]));
        let cache = cache(transport, &storage);

        assert!(cache.reconcile(&[summary("s3", 1)]).await.is_empty());
        assert!(cache.is_hidden(&sid("s3")));

        let visible = cache.reconcile(&[summary("s3", 7)]).await;

        assert_eq!(ids(&visible), vec!["s3"]);
        assert!(!cache.is_hidden(&sid("s3")));
        assert_eq!(cache.profile(&sid("s3")).unwrap().edit_time, 7);
    }

    #[tokio::test]
    async fn hidden_server_retried_and_still_missing_stays_hidden() {
        let storage = InMemoryStorage::default();
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .times(2)
            .returning(|_| ok_profiles(vec![]));
        let cache = cache(transport, &storage);

        cache.reconcile(&[summary("gone", 1)]).await;
        cache.reconcile(&[summary("gone", 2)]).await;
        // Same timestamp as the last hide: no third call.
        let visible = cache.reconcile(&[summary("gone", 2)]).await;

        assert!(visible.is_empty());
        assert!(cache.is_hidden(&sid("gone")));
    }

    #[tokio::test]
    async fn one_batched_call_for_many_missing() {
        let storage = InMemoryStorage::default();
        seed(&storage, &[profile("a", 1), profile("b", 1)]);

        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .withf(|req| req.body == Some(json!(["b", "c", "d"])))
            .times(1)
            // Response order differs from request order.
            .returning(|_| ok_profiles(vec![profile("d", 4), profile("b", 2), profile("c", 3)]));
        let cache = cache(transport, &storage);

        let input = [summary("d", 4), summary("a", 1), summary("c", 3), summary("b", 2)];
        let visible = cache.reconcile(&input).await;

        assert_eq!(ids(&visible), vec!["d", "a", "c", "b"]);
        assert_eq!(cache.profile(&sid("b")).unwrap().edit_time, 2);
        assert!(cache.hidden().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_are_requested_once() {
        let storage = InMemoryStorage::default();
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .withf(|req| req.body == Some(json!(["x"])))
            .times(1)
            .returning(|_| ok_profiles(vec![profile("x", 1)]));
        let cache = cache(transport, &storage);

        let visible = cache.reconcile(&[summary("x", 1), summary("x", 1)]).await;
        assert_eq!(visible.len(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_merges_nothing_and_hides() {
        let storage = InMemoryStorage::default();
        seed(&storage, &[profile("s1", 1)]);

        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError::new("ConnectError", "connection refused")));
        let cache = cache(transport, &storage);

        let visible = cache.reconcile(&[summary("s1", 2), summary("s9", 1)]).await;

        assert!(visible.is_empty());
        // The stale copy was evicted before the fetch, and stays evicted.
        assert!(cache.profile(&sid("s1")).is_none());
        assert!(cache.is_hidden(&sid("s1")));
        assert!(cache.is_hidden(&sid("s9")));
    }

    #[tokio::test]
    async fn business_failure_with_data_still_merges() {
        let storage = InMemoryStorage::default();
        let mut transport = MockHttpTransportPort::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse::new(
                200,
                Some(json!({"code": 206, "msg": "partial", "data": [profile("p1", 1)]})),
            ))
        });
        let cache = cache(transport, &storage);

        let visible = cache.reconcile(&[summary("p1", 1), summary("p2", 1)]).await;

        assert_eq!(ids(&visible), vec!["p1"]);
        assert!(cache.is_hidden(&sid("p2")));
    }

    #[tokio::test]
    async fn reset_hidden_allows_retry() {
        let storage = InMemoryStorage::default();
        let mut transport = MockHttpTransportPort::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ok_profiles(vec![]));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ok_profiles(vec![profile("late", 1)]));
        let cache = cache(transport, &storage);

        assert!(cache.reconcile(&[summary("late", 1)]).await.is_empty());
        cache.reset_hidden();

        let visible = cache.reconcile(&[summary("late", 1)]).await;
        assert_eq!(ids(&visible), vec!["late"]);
        assert!(!cache.is_hidden(&sid("late")));
    }

    #[tokio::test]
    async fn fresh_profile_is_never_evicted() {
        let storage = InMemoryStorage::default();
        seed(&storage, &[profile("s1", 10)]);
        let cache = cache(MockHttpTransportPort::new(), &storage);

        for profile_time in [1, 5, 10] {
            let visible = cache.reconcile(&[summary("s1", profile_time)]).await;
            assert_eq!(ids(&visible), vec!["s1"]);
        }
        assert_eq!(cache.profile(&sid("s1")).unwrap().edit_time, 10);
    }

    #[test]
    fn unreadable_persisted_cache_is_discarded() {
        let storage = InMemoryStorage::default();
        storage.save(storage_keys::SERVER_PROFILES, "{broken");

        let cache = cache(MockHttpTransportPort::new(), &storage);

        assert!(cache.profiles().is_empty());
        assert!(storage.load(storage_keys::SERVER_PROFILES).is_none());
    }
}
