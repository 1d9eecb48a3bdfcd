//! Application services

pub mod auth_service;
pub mod profile_cache;

pub use auth_service::{AuthService, LOGOUT_PATH};
pub use profile_cache::{ProfileCache, GET_PROFILES_PATH};
