//! Infrastructure layer - concrete adapters for the outbound ports
//!
//! - `http_client`: reqwest-backed transport for the panel and external APIs
//! - `platform`: file storage and the system clock
//! - `notifications` / `navigation`: headless sinks that log through `tracing`
//! - `scheduler`: tokio interval timers
//! - `testing`: in-memory fakes for unit tests

pub mod http_client;
pub mod navigation;
pub mod notifications;
pub mod platform;
pub mod scheduler;
pub mod testing;

pub use http_client::ReqwestTransport;
pub use navigation::LoggingNavigator;
pub use notifications::TracingNotifier;
pub use platform::{FileStorageProvider, SystemClock};
pub use scheduler::TokioTickScheduler;
