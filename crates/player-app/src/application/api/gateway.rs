//! API gateway
//!
//! Every panel call goes through [`ApiGateway::dispatch`]: the current bearer
//! token is attached, the exchange is classified, the resulting notification
//! is raised and a 401 ends the local session. Callers still receive the
//! outcome so they can react in their own terms.

use std::sync::Arc;
use std::time::Duration;

use arucraftr_domain::ApiEnvelope;
use arucraftr_player_ports::outbound::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransportPort, Notification, NotificationPort,
    TransportError,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::classify::{
    classify_external, classify_panel, external_reaction, panel_reaction, Outcome, Reaction,
    MALFORMED_RESPONSE, PANEL_API_TITLE,
};
use crate::application::config::PanelConfig;
use crate::application::error::GatewayError;
use crate::application::session::SessionStore;

/// Per-call overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Replaces the configured request timeout
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone)]
pub struct ApiGateway {
    transport: Arc<dyn HttpTransportPort>,
    session: SessionStore,
    notifier: Arc<dyn NotificationPort>,
    config: Arc<PanelConfig>,
}

impl ApiGateway {
    pub fn new(
        transport: Arc<dyn HttpTransportPort>,
        session: SessionStore,
        notifier: Arc<dyn NotificationPort>,
        config: PanelConfig,
    ) -> Self {
        Self {
            transport,
            session,
            notifier,
            config: Arc::new(config),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Dispatch a panel API call with the current session's bearer token.
    ///
    /// Business failures come back as `Ok(envelope)` with a non-200 `code`.
    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        let bearer = self.session.current_token();
        self.dispatch_with_bearer(method, path, body, options, bearer)
            .await
    }

    /// Same as [`dispatch`](Self::dispatch) with an explicit bearer, for calls
    /// that must outlive the local session (logout).
    pub(crate) async fn dispatch_with_bearer<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
        bearer: Option<String>,
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        let request = self.build_request(
            &self.config.api_base,
            method,
            path,
            body,
            bearer.as_deref(),
            options,
        );
        tracing::debug!(method = method.as_str(), path, "Dispatching panel request");

        let result = self.transport.send(request).await;
        let outcome = classify_panel(&result);
        self.apply(panel_reaction(&outcome));

        match outcome {
            Outcome::Success => {
                serde_json::from_value::<ApiEnvelope<T>>(body_of(result)).map_err(|e| {
                    tracing::warn!(path, error = %e, "Panel envelope did not match expected type");
                    self.notifier
                        .notify(Notification::error(PANEL_API_TITLE, MALFORMED_RESPONSE));
                    GatewayError::Decode(e.to_string())
                })
            }
            // The failure was already reported; a payload of the wrong shape
            // is dropped so the caller still gets the code and message.
            Outcome::BusinessFailure { code, message, .. } => {
                match serde_json::from_value::<ApiEnvelope<T>>(body_of(result)) {
                    Ok(envelope) => Ok(envelope),
                    Err(e) => {
                        tracing::debug!(path, code, error = %e, "Dropping undecodable failure payload");
                        Ok(ApiEnvelope::failure(code, message))
                    }
                }
            }
            other => Err(failure(other, path)),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>, GatewayError> {
        self.dispatch(HttpMethod::Get, path, None, RequestOptions::default())
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        let body_value =
            serde_json::to_value(body).map_err(|e| GatewayError::Serialize(e.to_string()))?;
        self.dispatch(HttpMethod::Post, path, Some(body_value), RequestOptions::default())
            .await
    }

    /// Call a service outside the panel backend.
    ///
    /// Only transport and HTTP failures are classified; the body is decoded
    /// as-is and the local session is never touched.
    pub async fn dispatch_external<T: DeserializeOwned>(
        &self,
        base_url: &str,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        bearer: Option<&str>,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        let request = self.build_request(base_url, method, path, body, bearer, options);
        tracing::debug!(method = method.as_str(), base_url, path, "Dispatching external request");

        let result = self.transport.send(request).await;
        let outcome = classify_external(&result);
        self.apply(external_reaction(&outcome, base_url));

        match outcome {
            Outcome::Success => serde_json::from_value(body_of(result))
                .map_err(|e| GatewayError::Decode(e.to_string())),
            other => Err(failure(other, path)),
        }
    }

    fn build_request(
        &self,
        base_url: &str,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        bearer: Option<&str>,
        options: RequestOptions,
    ) -> HttpRequest {
        let mut request = HttpRequest::new(method, base_url, path);
        if let Some(token) = bearer.filter(|t| !t.is_empty()) {
            request
                .headers
                .push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        request.headers.extend(options.headers);
        request.query = options.query;
        request.body = body;
        request.timeout = Some(options.timeout.unwrap_or(self.config.request_timeout));
        request
    }

    fn apply(&self, reaction: Reaction) {
        if let Some(notification) = reaction.notification {
            self.notifier.notify(notification);
        }
        if reaction.end_session {
            self.session.end_session();
        }
    }
}

fn body_of(result: Result<HttpResponse, TransportError>) -> Value {
    result.ok().and_then(|r| r.body).unwrap_or(Value::Null)
}

fn failure(outcome: Outcome, path: &str) -> GatewayError {
    match outcome {
        Outcome::TransportFailure(e) => {
            tracing::warn!(path, error = %e, "Request did not complete");
            GatewayError::Transport(e)
        }
        Outcome::HttpFailure { status } => {
            tracing::warn!(path, status, "Request failed with HTTP status");
            GatewayError::Http { status }
        }
        Outcome::Malformed { reason } => {
            tracing::warn!(path, %reason, "Malformed response");
            GatewayError::Decode(reason)
        }
        Outcome::Success | Outcome::BusinessFailure { .. } => {
            GatewayError::Decode("unexpected successful outcome".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arucraftr_domain::AuthedPlayer;
    use arucraftr_player_adapters::infrastructure::testing::{
        FixedClock, InMemoryStorage, ManualScheduler, RecordingNavigator, RecordingNotifier,
    };
    use arucraftr_player_ports::outbound::{MockHttpTransportPort, Route, Severity};
    use serde_json::json;

    use crate::application::api::classify::{
        BUSINESS_SESSION_EXPIRED, HTTP_SESSION_INVALID, NETWORK_ERROR_TITLE,
    };

    struct Harness {
        gateway: ApiGateway,
        notifier: RecordingNotifier,
        navigator: RecordingNavigator,
    }

    fn harness(transport: MockHttpTransportPort, token: Option<&str>) -> Harness {
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::default();
        let session = SessionStore::new(
            Arc::new(InMemoryStorage::default()),
            Arc::new(FixedClock::default()),
            Arc::new(navigator.clone()),
            Arc::new(ManualScheduler::default()),
        );
        if let Some(token) = token {
            session
                .begin_session(token, Some(AuthedPlayer::default()))
                .unwrap();
        }
        let gateway = ApiGateway::new(
            Arc::new(transport),
            session,
            Arc::new(notifier.clone()),
            PanelConfig::new("https://panel.test"),
        );
        Harness {
            gateway,
            notifier,
            navigator,
        }
    }

    #[tokio::test]
    async fn attaches_bearer_when_logged_in() {
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .withf(|req| {
                req.header("Authorization") == Some("Bearer tok-1")
                    && req.url() == "https://panel.test/server/list"
                    && req.timeout == Some(Duration::from_millis(120_000))
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Some(json!({"code": 200, "msg": "", "data": [1, 2]})))));

        let h = harness(transport, Some("tok-1"));
        let env: ApiEnvelope<Vec<u32>> = h.gateway.get("/server/list").await.unwrap();

        assert_eq!(env.data, Some(vec![1, 2]));
        assert!(h.notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn omits_authorization_without_session() {
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .withf(|req| req.header("Authorization").is_none())
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Some(json!({"code": 200, "data": null})))));

        let h = harness(transport, None);
        let env: ApiEnvelope<Value> = h.gateway.get("/player/info").await.unwrap();
        assert!(env.data.is_none());
    }

    #[tokio::test]
    async fn options_override_timeout_and_add_query() {
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .withf(|req| {
                req.timeout == Some(Duration::from_secs(5))
                    && req.query == vec![("page".to_string(), "2".to_string())]
                    && req.header("X-Trace") == Some("abc")
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Some(json!({"code": 200})))));

        let h = harness(transport, None);
        let options = RequestOptions::default()
            .with_timeout(Duration::from_secs(5))
            .with_query("page", "2")
            .with_header("X-Trace", "abc");
        let result: Result<ApiEnvelope<Value>, _> = h
            .gateway
            .dispatch(HttpMethod::Get, "/server/list", None, options)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn business_401_invalidates_session_but_returns_envelope() {
        let mut transport = MockHttpTransportPort::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse::new(
                200,
                Some(json!({"code": 401, "msg": "expired", "data": null})),
            ))
        });

        let h = harness(transport, Some("tok-1"));
        let env: ApiEnvelope<Value> = h.gateway.get("/server/list").await.unwrap();

        assert_eq!(env.code, 401);
        assert_eq!(env.msg, "expired");
        assert_eq!(h.gateway.session().current_token(), None);
        assert_eq!(h.navigator.last(), Some(Route::Login));

        let notes = h.notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].description.as_deref(), Some(BUSINESS_SESSION_EXPIRED));
    }

    #[tokio::test]
    async fn http_401_invalidates_session_and_fails() {
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(401, None)));

        let h = harness(transport, Some("tok-1"));
        let err = h
            .gateway
            .get::<Value>("/server/list")
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(h.gateway.session().current_token(), None);
        assert_eq!(
            h.notifier.notifications()[0].description.as_deref(),
            Some(HTTP_SESSION_INVALID)
        );
    }

    #[tokio::test]
    async fn transport_failure_leaves_session_alone() {
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError::new("ConnectError", "connection refused")));

        let h = harness(transport, Some("tok-1"));
        let err = h.gateway.get::<Value>("/server/list").await.unwrap_err();

        assert_eq!(
            err,
            GatewayError::Transport(TransportError::new("ConnectError", "connection refused"))
        );
        assert_eq!(h.gateway.session().current_token().as_deref(), Some("tok-1"));
        let notes = h.notifier.notifications();
        assert_eq!(notes[0].title, NETWORK_ERROR_TITLE);
        assert_eq!(notes[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn soft_business_failure_is_warning() {
        let mut transport = MockHttpTransportPort::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse::new(
                200,
                Some(json!({"code": 403, "msg": "permission denied", "data": {"partial": true}})),
            ))
        });

        let h = harness(transport, Some("tok-1"));
        let env: ApiEnvelope<Value> = h.gateway.get("/server/edit").await.unwrap();

        assert_eq!(env.data, Some(json!({"partial": true})));
        assert_eq!(h.gateway.session().current_token().as_deref(), Some("tok-1"));
        assert_eq!(h.notifier.notifications()[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn mismatched_payload_is_decode_error() {
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Some(json!({"code": 200, "data": "nope"})))));

        let h = harness(transport, None);
        let err = h.gateway.get::<Vec<u32>>("/server/list").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));

        let notes = h.notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn business_failure_with_mismatched_payload_still_returns_envelope() {
        let mut transport = MockHttpTransportPort::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(HttpResponse::new(
                200,
                Some(json!({"code": 401, "msg": "expired", "data": {"reason": "token"}})),
            ))
        });

        let h = harness(transport, Some("tok-1"));
        let envelope = h.gateway.get::<Vec<u32>>("/server/list").await.unwrap();

        assert_eq!(envelope.code, 401);
        assert_eq!(envelope.msg, "expired");
        assert_eq!(envelope.data, None);
        assert_eq!(h.gateway.session().current_token(), None);

        // Only the session-expired toast, no decode error on top.
        let notes = h.notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].description.as_deref(), Some(BUSINESS_SESSION_EXPIRED));
    }

    #[tokio::test]
    async fn post_serializes_body() {
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .withf(|req| req.method == HttpMethod::Post && req.body == Some(json!(["a", "b"])))
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Some(json!({"code": 200, "data": []})))));

        let h = harness(transport, None);
        let env: ApiEnvelope<Vec<Value>> = h.gateway.post("/server/get_profiles", &["a", "b"]).await.unwrap();
        assert_eq!(env.data, Some(vec![]));
    }

    #[tokio::test]
    async fn external_uses_given_base_and_bearer_only() {
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .withf(|req| {
                req.url() == "https://skins.example/api/profile"
                    && req.header("Authorization") == Some("Bearer ext-1")
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, Some(json!({"name": "steve"})))));

        let h = harness(transport, Some("tok-1"));
        let body: Value = h
            .gateway
            .dispatch_external(
                "https://skins.example",
                HttpMethod::Get,
                "/api/profile",
                None,
                Some("ext-1"),
                RequestOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(body["name"], "steve");
    }

    #[tokio::test]
    async fn external_401_does_not_touch_session() {
        let mut transport = MockHttpTransportPort::new();
        transport
            .expect_send()
            .withf(|req| req.header("Authorization").is_none())
            .times(1)
            .returning(|_| Ok(HttpResponse::new(401, None)));

        let h = harness(transport, Some("tok-1"));
        let err = h
            .gateway
            .dispatch_external::<Value>(
                "https://skins.example",
                HttpMethod::Get,
                "/api/profile",
                None,
                None,
                RequestOptions::default(),
            )
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(h.gateway.session().current_token().as_deref(), Some("tok-1"));
        assert_eq!(
            h.notifier.notifications()[0].description.as_deref(),
            Some("Status: 401")
        );
    }
}
