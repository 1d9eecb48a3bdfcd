//! Panel client configuration
//!
//! Read from the environment (the runner loads `.env` first). Every value has
//! a default so the client starts without any configuration.

use std::time::Duration;

/// Production panel backend
pub const DEFAULT_API_BASE: &str = "https://panel-api.arucraftr.org";

pub const DEFAULT_APP_NAME: &str = "aruCraftR Player Panel";

/// Default request timeout in milliseconds (2 minutes)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Runtime configuration shared by the gateway and the runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    pub api_base: String,
    pub app_name: String,
    pub request_timeout: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl PanelConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            app_name: DEFAULT_APP_NAME.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Build from `PANEL_API_BASE`, `PANEL_APP_NAME` and
    /// `PANEL_REQUEST_TIMEOUT_MS`, falling back to defaults.
    pub fn from_env() -> Self {
        let api_base =
            std::env::var("PANEL_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let app_name =
            std::env::var("PANEL_APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string());

        Self {
            api_base,
            app_name,
            request_timeout: Duration::from_millis(get_request_timeout_ms()),
        }
    }
}

/// Get the request timeout from environment variable or use default
pub fn get_request_timeout_ms() -> u64 {
    std::env::var("PANEL_REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS)
}
