//! Test-only infrastructure fakes.
//!
//! These helpers implement outbound ports for unit tests of the app layer, so
//! services run without a network, a disk or real timers. Port traits that
//! mockall handles well (transport, storage) are also available as automocks
//! from the ports crate; the fakes here cover state that tests want to
//! inspect after the fact.

pub mod fixtures;
pub mod manual_scheduler;

pub use fixtures::{FixedClock, InMemoryStorage, RecordingNavigator, RecordingNotifier};
pub use manual_scheduler::ManualScheduler;
