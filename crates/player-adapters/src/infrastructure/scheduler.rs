//! Repeating timers on the tokio runtime

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use arucraftr_player_ports::outbound::{ScheduledTask, TickCallback, TickSchedulerPort};

/// Cancel handle for a spawned interval loop
#[derive(Debug, Clone)]
pub struct TokioScheduledTask {
    cancel_token: CancellationToken,
}

impl ScheduledTask for TokioScheduledTask {
    fn cancel(&self) {
        self.cancel_token.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Spawns each repeating callback as a task on the runtime that was current
/// when it was scheduled.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTickScheduler;

impl TickSchedulerPort for TokioTickScheduler {
    fn schedule_repeating(&self, period: Duration, tick: TickCallback) -> Box<dyn ScheduledTask> {
        let cancel_token = CancellationToken::new();
        let task = TokioScheduledTask {
            cancel_token: cancel_token.clone(),
        };

        let Ok(handle) = Handle::try_current() else {
            tracing::error!("No tokio runtime available; repeating timer not started");
            cancel_token.cancel();
            return Box::new(task);
        };

        handle.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => break,
                    _ = interval.tick() => tick(),
                }
            }
            tracing::trace!("Repeating timer stopped");
        });

        Box::new(task)
    }
}
