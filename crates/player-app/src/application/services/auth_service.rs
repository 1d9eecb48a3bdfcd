//! Login and logout flows
//!
//! Ties the session store to the gateway for the one transition that needs
//! both: a user-initiated logout also tells the backend, but never waits on
//! it to clear local state.

use std::sync::Arc;

use arucraftr_domain::LoginResponse;
use arucraftr_player_ports::outbound::{HttpMethod, Notification, NotificationPort, Severity};
use serde_json::Value;

use crate::application::api::{ApiGateway, RequestOptions};
use crate::application::error::SessionError;
use crate::application::session::SessionStore;

pub const LOGOUT_PATH: &str = "/player/logout";

pub const LOGGED_OUT_TITLE: &str = "Logged out";

#[derive(Clone)]
pub struct AuthService {
    session: SessionStore,
    gateway: ApiGateway,
    notifier: Arc<dyn NotificationPort>,
}

impl AuthService {
    pub fn new(gateway: ApiGateway, notifier: Arc<dyn NotificationPort>) -> Self {
        Self {
            session: gateway.session().clone(),
            gateway,
            notifier,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Install the session carried by a successful login response.
    pub fn complete_login(&self, login: LoginResponse) -> Result<(), SessionError> {
        self.session.begin_session(login.token, login.user)
    }

    /// End the session.
    ///
    /// Local state is cleared first and unconditionally. With `notify`, the
    /// backend is then told via `GET /player/logout` using the token captured
    /// before clearing; a confirmation toast is shown only when that call
    /// returns business success with no payload. Returns whether the backend
    /// confirmed.
    pub async fn end_session(&self, notify: bool) -> bool {
        let bearer = self.session.current_token();
        self.session.end_session();

        if !notify {
            return false;
        }

        let result = self
            .gateway
            .dispatch_with_bearer::<Value>(
                HttpMethod::Get,
                LOGOUT_PATH,
                None,
                RequestOptions::default(),
                bearer,
            )
            .await;

        match result {
            Ok(envelope) if envelope.is_success() && envelope.data.is_none() => {
                self.notifier
                    .notify(Notification::new(LOGGED_OUT_TITLE, Severity::Success));
                true
            }
            Ok(envelope) => {
                tracing::debug!(code = envelope.code, "Logout not confirmed by backend");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote logout failed; local session already cleared");
                false
            }
        }
    }

    /// Arm the verification-code cooldown. No-op while it is running.
    pub fn start_cooldown(&self) -> bool {
        self.session.start_cooldown()
    }
}
