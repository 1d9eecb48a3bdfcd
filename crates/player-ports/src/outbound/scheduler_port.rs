//! Scheduler Port - repeating timers with an explicit cancel handle
//!
//! mockall cannot express `Fn` arguments usefully, so tests drive this port
//! with the manual scheduler from the adapters' testing module instead of an
//! automock.

use std::time::Duration;

/// Callback invoked on every period
pub type TickCallback = Box<dyn Fn() + Send + Sync>;

/// Handle to a registered repeating callback
pub trait ScheduledTask: Send + Sync {
    /// Stop future invocations. Idempotent.
    fn cancel(&self);

    fn is_cancelled(&self) -> bool;
}

pub trait TickSchedulerPort: Send + Sync {
    /// Invoke `tick` every `period` until the returned handle is cancelled.
    /// The first invocation happens one full period after registration.
    fn schedule_repeating(&self, period: Duration, tick: TickCallback) -> Box<dyn ScheduledTask>;
}
