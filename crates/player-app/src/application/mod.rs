//! Application layer - Use cases and orchestration

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod session;

// Re-export common types
pub use api::{ApiGateway, RequestOptions};
pub use config::{get_request_timeout_ms, PanelConfig};
pub use error::{GatewayError, SessionError};
pub use services::{AuthService, ProfileCache};
pub use session::{guard_route, CooldownTimer, SessionStore};
