//! Scheduler whose periods elapse only when a test calls [`ManualScheduler::fire`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arucraftr_player_ports::outbound::{ScheduledTask, TickCallback, TickSchedulerPort};

struct Registration {
    period: Duration,
    tick: Arc<TickCallback>,
    cancelled: Arc<AtomicBool>,
}

struct ManualTask {
    cancelled: Arc<AtomicBool>,
}

impl ScheduledTask for ManualTask {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
pub struct ManualScheduler {
    registrations: Arc<Mutex<Vec<Registration>>>,
}

impl ManualScheduler {
    fn registrations(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Elapse one period: invoke every callback that has not been cancelled.
    ///
    /// Callbacks run without the scheduler's lock held, so they may cancel
    /// their own task or schedule new ones.
    pub fn fire(&self) {
        let due: Vec<(Arc<TickCallback>, Arc<AtomicBool>)> = self
            .registrations()
            .iter()
            .filter(|r| !r.cancelled.load(Ordering::SeqCst))
            .map(|r| (r.tick.clone(), r.cancelled.clone()))
            .collect();

        for (tick, cancelled) in due {
            // An earlier callback in this round may have cancelled this one.
            if !cancelled.load(Ordering::SeqCst) {
                tick();
            }
        }
    }

    pub fn active_tasks(&self) -> usize {
        self.registrations()
            .iter()
            .filter(|r| !r.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Number of callbacks ever scheduled, cancelled or not
    pub fn registered_tasks(&self) -> usize {
        self.registrations().len()
    }

    pub fn last_period(&self) -> Option<Duration> {
        self.registrations().last().map(|r| r.period)
    }
}

impl TickSchedulerPort for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, tick: TickCallback) -> Box<dyn ScheduledTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.registrations().push(Registration {
            period,
            tick: Arc::new(tick),
            cancelled: cancelled.clone(),
        });
        Box::new(ManualTask { cancelled })
    }
}
