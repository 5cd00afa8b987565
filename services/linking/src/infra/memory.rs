use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{LinkedUserRepository, LinkingCodeRepository};
use crate::domain::time::{Scheduler, TimerHandle};
use crate::domain::types::LinkingCode;
use crate::error::LinkingServiceError;

struct Entry {
    /// Distinguishes this insertion from a later one under the same key.
    id: Uuid,
    code: LinkingCode,
    timer: Option<TimerHandle>,
}

type Entries = HashMap<String, Entry>;

fn poisoned() -> LinkingServiceError {
    LinkingServiceError::Internal(anyhow!("linking code registry lock poisoned"))
}

/// Process-local linking code registry.
///
/// Every check-and-mutate runs under one lock that is never held across an
/// `.await` or while a timer is armed or cancelled.
#[derive(Clone)]
pub struct InMemoryLinkingCodeStore {
    entries: Arc<Mutex<Entries>>,
    scheduler: Arc<dyn Scheduler>,
}

impl InMemoryLinkingCodeStore {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            scheduler,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, LinkingServiceError> {
        self.entries.lock().map_err(|_| poisoned())
    }

    fn arm_expiry(&self, key: String, id: Uuid, delay: std::time::Duration) -> TimerHandle {
        let entries = Arc::downgrade(&self.entries);
        self.scheduler
            .schedule(delay, Box::new(move || evict_if_current(&entries, &key, id)))
    }
}

/// Timer callback: drop the entry only if it is still the insertion that armed
/// this timer.
fn evict_if_current(entries: &Weak<Mutex<Entries>>, key: &str, id: Uuid) {
    let Some(entries) = entries.upgrade() else {
        return;
    };
    let Ok(mut map) = entries.lock() else {
        tracing::warn!(code = key, "registry lock poisoned; leaving expiry to lazy check");
        return;
    };
    if map.get(key).is_some_and(|entry| entry.id == id) {
        map.remove(key);
        tracing::debug!(code = key, "linking code expired");
    }
}

impl LinkingCodeRepository for InMemoryLinkingCodeStore {
    async fn insert_new(&self, code: LinkingCode) -> Result<bool, LinkingServiceError> {
        let key = code.code.clone();
        let now = code.created_at;
        let delay = code.ttl().to_std().unwrap_or_default();
        let id = Uuid::new_v4();

        let replaced = {
            let mut map = self.lock()?;
            if map.get(&key).is_some_and(|entry| entry.code.is_valid(now)) {
                return Ok(false);
            }
            map.insert(
                key.clone(),
                Entry {
                    id,
                    code,
                    timer: None,
                },
            )
        };
        if let Some(timer) = replaced.and_then(|entry| entry.timer) {
            timer.cancel();
        }

        let timer = self.arm_expiry(key.clone(), id, delay);
        let orphaned = {
            let mut map = self.lock()?;
            match map.get_mut(&key) {
                Some(entry) if entry.id == id => {
                    entry.timer = Some(timer);
                    None
                }
                // Consumed or swept before the timer was attached.
                _ => Some(timer),
            }
        };
        if let Some(timer) = orphaned {
            timer.cancel();
        }
        Ok(true)
    }

    async fn take_valid(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LinkingCode>, LinkingServiceError> {
        // Removal is the single atomic step: whoever removes the entry owns it.
        let removed = self.lock()?.remove(code);
        let Some(Entry {
            code: mut record,
            timer,
            ..
        }) = removed
        else {
            return Ok(None);
        };
        if let Some(timer) = timer {
            timer.cancel();
        }
        if !record.is_valid(now) {
            tracing::debug!(code, "evicted stale linking code on lookup");
            return Ok(None);
        }
        record.used = true;
        Ok(Some(record))
    }

    async fn count_active(&self, now: DateTime<Utc>) -> Result<u64, LinkingServiceError> {
        let map = self.lock()?;
        Ok(map.values().filter(|entry| entry.code.is_valid(now)).count() as u64)
    }
}

/// Owners that completed a link, keyed by owner id with the first link time.
#[derive(Clone, Default)]
pub struct InMemoryLinkedUserStore {
    users: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryLinkedUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkedUserRepository for InMemoryLinkedUserStore {
    async fn record_link(
        &self,
        owner_id: &str,
        linked_at: DateTime<Utc>,
    ) -> Result<(), LinkingServiceError> {
        let mut users = self.users.lock().map_err(|_| poisoned())?;
        users.entry(owner_id.to_owned()).or_insert(linked_at);
        Ok(())
    }

    async fn count(&self) -> Result<u64, LinkingServiceError> {
        let users = self.users.lock().map_err(|_| poisoned())?;
        Ok(users.len() as u64)
    }
}
