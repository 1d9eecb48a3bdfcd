//! Response classification.
//!
//! Turning a transport result into an [`Outcome`] and an outcome into a
//! [`Reaction`] are both pure; `ApiGateway` performs the reaction. Keeping the
//! two apart lets every status/code branch be tested without a session or a
//! notification sink.

use arucraftr_domain::{BUSINESS_NOT_FOUND, BUSINESS_OK, BUSINESS_UNAUTHORIZED};
use arucraftr_player_ports::outbound::{HttpResponse, Notification, TransportError};

pub const PANEL_API_TITLE: &str = "aruCraftR API";
pub const API_ERROR_TITLE: &str = "API error";
pub const NETWORK_ERROR_TITLE: &str = "Network error";

pub const BUSINESS_SESSION_EXPIRED: &str = "Session expired, please log in again";
pub const HTTP_SESSION_INVALID: &str = "Session invalid, please log in again";
pub const API_NOT_FOUND: &str = "The requested API does not exist";
pub const UNKNOWN_ERROR: &str = "Unknown error";
pub const MALFORMED_RESPONSE: &str = "The server sent a response the panel cannot read";

/// What a completed (or failed) exchange amounts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx, and for panel calls business `code == 200`
    Success,
    /// 2xx carrying a non-200 business code
    BusinessFailure {
        code: i64,
        message: String,
        http_status: u16,
    },
    /// Non-2xx status
    HttpFailure { status: u16 },
    /// The exchange never completed
    TransportFailure(TransportError),
    /// 2xx whose body is not a panel envelope
    Malformed { reason: String },
}

/// Side effects an outcome calls for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    pub notification: Option<Notification>,
    pub end_session: bool,
}

impl Reaction {
    fn none() -> Self {
        Self::default()
    }

    fn notify(notification: Notification) -> Self {
        Self {
            notification: Some(notification),
            end_session: false,
        }
    }

    fn notify_and_end_session(notification: Notification) -> Self {
        Self {
            notification: Some(notification),
            end_session: true,
        }
    }
}

/// Classify a panel API exchange, inspecting the envelope's business code.
pub fn classify_panel(result: &Result<HttpResponse, TransportError>) -> Outcome {
    let response = match result {
        Err(e) => return Outcome::TransportFailure(e.clone()),
        Ok(response) if !response.is_success() => {
            return Outcome::HttpFailure {
                status: response.status,
            }
        }
        Ok(response) => response,
    };

    let Some(code) = response
        .body
        .as_ref()
        .and_then(|body| body.get("code"))
        .and_then(|code| code.as_i64())
    else {
        return Outcome::Malformed {
            reason: format!("status {} body has no business code", response.status),
        };
    };

    if code == BUSINESS_OK {
        return Outcome::Success;
    }

    let message = response
        .body
        .as_ref()
        .and_then(|body| body.get("msg"))
        .and_then(|msg| msg.as_str())
        .unwrap_or_default()
        .to_string();

    Outcome::BusinessFailure {
        code,
        message,
        http_status: response.status,
    }
}

/// Classify an exchange with an external service. Only transport and HTTP
/// status are inspected; the body shape is unknown.
pub fn classify_external(result: &Result<HttpResponse, TransportError>) -> Outcome {
    match result {
        Err(e) => Outcome::TransportFailure(e.clone()),
        Ok(response) if !response.is_success() => Outcome::HttpFailure {
            status: response.status,
        },
        Ok(_) => Outcome::Success,
    }
}

/// Side effects for a panel outcome.
pub fn panel_reaction(outcome: &Outcome) -> Reaction {
    match outcome {
        Outcome::Success => Reaction::none(),
        Outcome::TransportFailure(e) => {
            Reaction::notify(Notification::error(NETWORK_ERROR_TITLE, e.to_string()))
        }
        Outcome::HttpFailure { status: 401 } => Reaction::notify_and_end_session(
            Notification::error(API_ERROR_TITLE, HTTP_SESSION_INVALID),
        ),
        Outcome::HttpFailure { status: 404 } => {
            Reaction::notify(Notification::error(API_ERROR_TITLE, API_NOT_FOUND))
        }
        Outcome::HttpFailure { status } => Reaction::notify(Notification::error(
            API_ERROR_TITLE,
            format!("Status: {status}"),
        )),
        Outcome::BusinessFailure { code, .. } if *code == BUSINESS_UNAUTHORIZED => {
            Reaction::notify_and_end_session(Notification::error(
                PANEL_API_TITLE,
                BUSINESS_SESSION_EXPIRED,
            ))
        }
        Outcome::BusinessFailure { code, .. } if *code == BUSINESS_NOT_FOUND => {
            Reaction::notify(Notification::error(PANEL_API_TITLE, API_NOT_FOUND))
        }
        // A soft failure is only surfaced when the transport itself was a
        // plain 200.
        Outcome::BusinessFailure {
            message,
            http_status: 200,
            ..
        } => {
            let description = if message.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                message.clone()
            };
            Reaction::notify(Notification::warning(PANEL_API_TITLE, description))
        }
        Outcome::BusinessFailure { .. } => Reaction::none(),
        Outcome::Malformed { .. } => {
            Reaction::notify(Notification::error(PANEL_API_TITLE, MALFORMED_RESPONSE))
        }
    }
}

/// Side effects for an external-service outcome. Never ends the session.
pub fn external_reaction(outcome: &Outcome, base_url: &str) -> Reaction {
    match outcome {
        Outcome::TransportFailure(e) => Reaction::notify(Notification::error(
            format!("{NETWORK_ERROR_TITLE} ({base_url})"),
            e.to_string(),
        )),
        Outcome::HttpFailure { status: 404 } => {
            Reaction::notify(Notification::error(API_ERROR_TITLE, API_NOT_FOUND))
        }
        Outcome::HttpFailure { status } => Reaction::notify(Notification::error(
            API_ERROR_TITLE,
            format!("Status: {status}"),
        )),
        Outcome::Malformed { .. } => {
            Reaction::notify(Notification::error(API_ERROR_TITLE, MALFORMED_RESPONSE))
        }
        Outcome::Success | Outcome::BusinessFailure { .. } => Reaction::none(),
    }
}
