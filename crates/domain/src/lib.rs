//! Core types shared by every layer of the player panel client.
//!
//! Everything here mirrors the panel backend's JSON wire format. Field names
//! on the Rust side follow the panel's vocabulary; `serde` attributes carry the
//! backend spelling.

pub mod envelope;
pub mod error;
pub mod player;
pub mod server;

pub use envelope::{ApiEnvelope, BUSINESS_NOT_FOUND, BUSINESS_OK, BUSINESS_UNAUTHORIZED};
pub use error::DomainError;
pub use player::{AuthedPlayer, LoginResponse};
pub use server::{ServerId, ServerProfile, ServerStatus, ServerSummary};
