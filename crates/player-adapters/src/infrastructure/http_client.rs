//! HTTP transport backed by reqwest
//!
//! Performs exactly one exchange per call and reports what happened; status
//! interpretation, notifications and session handling live in the app layer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;

use arucraftr_player_ports::outbound::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransportPort, TransportError,
};

/// Connect timeout applied to every exchange; the total timeout comes from
/// the request.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Connect => Method::CONNECT,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Trace => Method::TRACE,
    }
}

fn transport_error(e: &reqwest::Error) -> TransportError {
    let name = if e.is_timeout() {
        "TimeoutError"
    } else if e.is_connect() {
        "ConnectError"
    } else if e.is_body() || e.is_decode() {
        "BodyError"
    } else {
        "RequestError"
    };
    TransportError::new(name, e.to_string())
}

/// Empty or non-JSON bodies are reported as `None`.
fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

#[async_trait]
impl HttpTransportPort for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url();
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        tracing::debug!(method = request.method.as_str(), %url, "Sending request");

        let response = builder.send().await.map_err(|e| {
            let err = transport_error(&e);
            tracing::debug!(%url, error = %err, "Request did not complete");
            err
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| transport_error(&e))?;

        tracing::debug!(%url, status, "Received response");
        Ok(HttpResponse::new(status, parse_body(&bytes)))
    }
}
