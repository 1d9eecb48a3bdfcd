//! Panel API response envelope.
//!
//! Every panel endpoint answers with `{code, msg, data}`. `code` is a business
//! status and is independent of the HTTP status line: a request can complete
//! with HTTP 200 and still carry `code = 401`.

use serde::{Deserialize, Serialize};

/// Business success.
pub const BUSINESS_OK: i64 = 200;
/// Business-layer session expiry.
pub const BUSINESS_UNAUTHORIZED: i64 = 401;
/// Business-layer "endpoint or resource does not exist".
pub const BUSINESS_NOT_FOUND: i64 = 404;

/// Generic panel response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Build a failed envelope with no payload.
    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }

    /// Whether the business code signals success.
    pub fn is_success(&self) -> bool {
        self.code == BUSINESS_OK
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_msg_and_data_default() {
        let env: ApiEnvelope<Vec<String>> = serde_json::from_str(r#"{"code":200}"#).unwrap();
        assert!(env.is_success());
        assert_eq!(env.msg, "");
        assert!(env.data.is_none());
    }

    #[test]
    fn null_data_is_none() {
        let env: ApiEnvelope<serde_json::Value> =
            serde_json::from_str(r#"{"code":401,"msg":"expired","data":null}"#).unwrap();
        assert_eq!(env.code, BUSINESS_UNAUTHORIZED);
        assert_eq!(env.msg, "expired");
        assert!(env.data.is_none());
    }
}
