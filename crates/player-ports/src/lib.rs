//! Player panel port definitions.
//!
//! The application layer only talks to the outside world (HTTP, storage,
//! clock, toasts, navigation, timers) through the traits defined here.

pub mod outbound;
