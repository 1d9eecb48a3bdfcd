//! Verification-code cooldown.
//!
//! A single countdown shared by every consumer. While it runs, starting it
//! again does nothing; it cancels its own repeating callback when it reaches
//! zero.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arucraftr_player_ports::outbound::{ScheduledTask, TickSchedulerPort};

/// Length of a fresh countdown
pub const COOLDOWN_SECONDS: u32 = 60;

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Default)]
struct CooldownState {
    remaining: u32,
    task: Option<Box<dyn ScheduledTask>>,
}

struct CooldownInner {
    state: Mutex<CooldownState>,
    scheduler: Arc<dyn TickSchedulerPort>,
}

impl Drop for CooldownInner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = state.task.take() {
            task.cancel();
        }
    }
}

/// Shared countdown driven by a one-second repeating callback
#[derive(Clone)]
pub struct CooldownTimer {
    inner: Arc<CooldownInner>,
}

impl CooldownTimer {
    pub fn new(scheduler: Arc<dyn TickSchedulerPort>) -> Self {
        Self {
            inner: Arc::new(CooldownInner {
                state: Mutex::new(CooldownState::default()),
                scheduler,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CooldownState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the countdown. Returns `false` (and changes nothing) if a countdown
    /// is already running.
    pub fn start(&self) -> bool {
        let mut state = self.lock();
        if state.task.is_some() {
            return false;
        }
        if state.remaining == 0 {
            state.remaining = COOLDOWN_SECONDS;
        }

        // The callback only holds a weak handle so a dropped timer does not
        // keep itself alive through its own schedule.
        let weak = Arc::downgrade(&self.inner);
        let task = self.inner.scheduler.schedule_repeating(
            TICK_PERIOD,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    CooldownTimer { inner }.tick();
                }
            }),
        );
        state.task = Some(task);
        tracing::debug!(remaining = state.remaining, "Cooldown started");
        true
    }

    /// Advance one second. At zero the repeating callback is cancelled.
    /// Returns the seconds left.
    pub fn tick(&self) -> u32 {
        let (remaining, finished) = {
            let mut state = self.lock();
            state.remaining = state.remaining.saturating_sub(1);
            let finished = if state.remaining == 0 {
                state.task.take()
            } else {
                None
            };
            (state.remaining, finished)
        };

        if let Some(task) = finished {
            task.cancel();
            tracing::debug!("Cooldown finished");
        }
        remaining
    }

    /// Stop the countdown and zero it so it can be started again.
    pub fn reset(&self) {
        let task = {
            let mut state = self.lock();
            state.remaining = 0;
            state.task.take()
        };
        if let Some(task) = task {
            task.cancel();
        }
    }

    pub fn remaining(&self) -> u32 {
        self.lock().remaining
    }

    pub fn is_running(&self) -> bool {
        self.lock().task.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arucraftr_player_adapters::infrastructure::testing::ManualScheduler;

    fn timer() -> (CooldownTimer, ManualScheduler) {
        let scheduler = ManualScheduler::default();
        (CooldownTimer::new(Arc::new(scheduler.clone())), scheduler)
    }

    #[test]
    fn start_arms_sixty_seconds() {
        let (timer, scheduler) = timer();

        assert!(timer.start());
        assert_eq!(timer.remaining(), COOLDOWN_SECONDS);
        assert!(timer.is_running());
        assert_eq!(scheduler.active_tasks(), 1);
        assert_eq!(scheduler.last_period(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn second_start_while_running_is_noop() {
        let (timer, scheduler) = timer();
        timer.start();
        scheduler.fire();
        scheduler.fire();

        assert!(!timer.start());
        assert_eq!(timer.remaining(), COOLDOWN_SECONDS - 2);
        assert_eq!(scheduler.registered_tasks(), 1);
    }

    #[test]
    fn sixty_ticks_reach_zero_and_cancel() {
        let (timer, scheduler) = timer();
        timer.start();

        for _ in 0..COOLDOWN_SECONDS - 1 {
            scheduler.fire();
        }
        assert_eq!(timer.remaining(), 1);
        assert_eq!(scheduler.active_tasks(), 1);

        scheduler.fire();
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_running());
        assert_eq!(scheduler.active_tasks(), 0);

        // A cancelled callback is not invoked again.
        scheduler.fire();
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn restart_after_finish_schedules_again() {
        let (timer, scheduler) = timer();
        timer.start();
        for _ in 0..COOLDOWN_SECONDS {
            scheduler.fire();
        }

        assert!(timer.start());
        assert_eq!(timer.remaining(), COOLDOWN_SECONDS);
        assert_eq!(scheduler.registered_tasks(), 2);
        assert_eq!(scheduler.active_tasks(), 1);
    }

    #[test]
    fn reset_cancels_and_allows_restart() {
        let (timer, scheduler) = timer();
        timer.start();
        scheduler.fire();

        timer.reset();
        assert_eq!(timer.remaining(), 0);
        assert_eq!(scheduler.active_tasks(), 0);

        assert!(timer.start());
        assert_eq!(timer.remaining(), COOLDOWN_SECONDS);
    }

    #[test]
    fn dropping_timer_cancels_callback() {
        let (timer, scheduler) = timer();
        timer.start();

        drop(timer);
        assert_eq!(scheduler.active_tasks(), 0);
    }
}
