//! Application layer error types
//!
//! `GatewayError` is what a dispatch returns when it did not produce an
//! envelope. Business failures (HTTP 2xx with a non-200 `code`) are not
//! errors: the caller receives the envelope and decides.

use arucraftr_player_ports::outbound::TransportError;
use thiserror::Error;

/// Errors returned by `ApiGateway` dispatches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The exchange never completed
    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    /// The exchange completed with a non-2xx status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The body could not be decoded into the expected shape
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// The request body could not be serialized
    #[error("Failed to serialize request: {0}")]
    Serialize(String),
}

impl GatewayError {
    /// HTTP status for `Http` failures
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is an authorization error
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Session lifecycle precondition violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session token cannot be empty")]
    EmptyToken,
}
