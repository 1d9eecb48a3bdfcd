//! Panel API dispatch and response classification

pub mod classify;
pub mod gateway;

pub use classify::{Outcome, Reaction};
pub use gateway::{ApiGateway, RequestOptions};
