use std::time::Duration;

use tokio::runtime::Handle;

use crate::domain::time::{Scheduler, TimerHandle, TimerTask};

/// Runs each task on its own tokio task after a `sleep`. Cancelling aborts it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let Ok(runtime) = Handle::try_current() else {
            // Lazy expiry in the registry still applies.
            tracing::warn!(?delay, "no tokio runtime; timer not armed");
            return TimerHandle::detached();
        };
        let join = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        let abort = join.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}
