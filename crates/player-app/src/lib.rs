//! Player panel client core: session lifecycle, API dispatch and the
//! server profile cache.

pub mod application;
