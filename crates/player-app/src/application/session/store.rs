//! Session store
//!
//! Owns the bearer token, the authenticated player and the verification-code
//! cooldown. The store is a cheap `Clone` over shared state: the gateway reads
//! the token from the same instance the login flow writes to, so every
//! dispatch sees the latest session.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arucraftr_domain::AuthedPlayer;
use arucraftr_player_ports::outbound::{
    storage_keys, ClockPort, NavigationPort, Route, StorageProvider, TickSchedulerPort,
};

use super::cooldown::CooldownTimer;
use super::persisted::{load_fresh, save_expiring};
use super::route_guard::guard_route;
use crate::application::error::SessionError;

#[derive(Debug, Clone, Default)]
struct SessionState {
    token: Option<String>,
    /// Anonymous placeholder whenever `token` is `None`
    user: AuthedPlayer,
}

struct SessionInner {
    state: RwLock<SessionState>,
    storage: Arc<dyn StorageProvider>,
    clock: Arc<dyn ClockPort>,
    navigation: Arc<dyn NavigationPort>,
    cooldown: CooldownTimer,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    /// Create the store, restoring any unexpired session from storage.
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        clock: Arc<dyn ClockPort>,
        navigation: Arc<dyn NavigationPort>,
        scheduler: Arc<dyn TickSchedulerPort>,
    ) -> Self {
        let state = restore(storage.as_ref(), clock.as_ref());
        if state.token.is_some() {
            tracing::info!(player_id = %state.user.player_id, "Restored persisted session");
        }

        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(state),
                storage,
                clock,
                navigation,
                cooldown: CooldownTimer::new(scheduler),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// The logged-in player, or `None` without a session
    pub fn current_user(&self) -> Option<AuthedPlayer> {
        let state = self.read();
        match state.token {
            Some(_) if !state.user.is_anonymous() => Some(state.user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    /// Install a new session and navigate home.
    ///
    /// A login without user details leaves the anonymous placeholder in place
    /// rather than keeping a previous player's record.
    pub fn begin_session(
        &self,
        token: impl Into<String>,
        user: Option<AuthedPlayer>,
    ) -> Result<(), SessionError> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let user = user.unwrap_or_else(AuthedPlayer::anonymous);

        {
            let mut state = self.write();
            state.token = Some(token.clone());
            state.user = user.clone();
        }

        let now = self.inner.clock.now();
        save_expiring(self.inner.storage.as_ref(), storage_keys::AUTH_TOKEN, &token, now);
        save_expiring(self.inner.storage.as_ref(), storage_keys::AUTH_USER, &user, now);

        tracing::info!(player_id = %user.player_id, "Session started");
        self.inner.navigation.navigate_to(Route::Home);
        Ok(())
    }

    /// Clear the session locally and navigate to the login page.
    ///
    /// Idempotent; never touches the network.
    pub fn end_session(&self) {
        let had_token = {
            let mut state = self.write();
            let had_token = state.token.take().is_some();
            state.user = AuthedPlayer::anonymous();
            had_token
        };

        self.inner.storage.remove(storage_keys::AUTH_TOKEN);
        save_expiring(
            self.inner.storage.as_ref(),
            storage_keys::AUTH_USER,
            AuthedPlayer::anonymous(),
            self.inner.clock.now(),
        );

        if had_token {
            tracing::info!("Session ended");
        }
        self.inner.navigation.navigate_to(Route::Login);
    }

    /// Redirect required before showing `path`, given the current session.
    pub fn guard(&self, path: &str) -> Option<Route> {
        guard_route(path, self.is_authenticated())
    }

    pub fn cooldown(&self) -> &CooldownTimer {
        &self.inner.cooldown
    }

    /// Arm the verification-code cooldown. No-op while it is running.
    pub fn start_cooldown(&self) -> bool {
        self.inner.cooldown.start()
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.inner.cooldown.remaining()
    }
}

fn restore(storage: &dyn StorageProvider, clock: &dyn ClockPort) -> SessionState {
    let now = clock.now();
    let token = load_fresh::<String>(storage, storage_keys::AUTH_TOKEN, now);
    let user = load_fresh::<AuthedPlayer>(storage, storage_keys::AUTH_USER, now);

    match token {
        Some(token) if !token.is_empty() => SessionState {
            token: Some(token),
            user: user.unwrap_or_default(),
        },
        _ => SessionState::default(),
    }
}
