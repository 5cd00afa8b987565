use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::time::{Clock, Scheduler, SystemClock};
use crate::infra::memory::{InMemoryLinkedUserStore, InMemoryLinkingCodeStore};
use crate::infra::scheduler::TokioScheduler;

/// Shared application state passed to every handler via axum `State`.
///
/// Handlers reach the stores and clock only through the accessors below.
#[derive(Clone)]
pub struct AppState {
    codes: InMemoryLinkingCodeStore,
    linked_users: InMemoryLinkedUserStore,
    clock: Arc<dyn Clock>,
    started_at: Instant,
}

impl AppState {
    pub fn new(clock: Arc<dyn Clock>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            codes: InMemoryLinkingCodeStore::new(scheduler),
            linked_users: InMemoryLinkedUserStore::new(),
            clock,
            started_at: Instant::now(),
        }
    }

    /// Wall clock and tokio timers.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(TokioScheduler))
    }

    pub fn code_repo(&self) -> InMemoryLinkingCodeStore {
        self.codes.clone()
    }

    pub fn linked_user_repo(&self) -> InMemoryLinkedUserStore {
        self.linked_users.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Time since this state was built, i.e. since the service started.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
