#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use crate::domain::types::LinkingCode;
use crate::error::LinkingServiceError;

/// Registry of live linking codes.
pub trait LinkingCodeRepository: Send + Sync {
    /// Insert `code` unless a live entry already holds the same key, arming its
    /// expiry timer. Returns `false` on collision. An expired entry under the
    /// same key is replaced.
    async fn insert_new(&self, code: LinkingCode) -> Result<bool, LinkingServiceError>;

    /// Atomically consume a valid code: marks it used, removes it and cancels
    /// its timer. Expired entries met on the way are evicted. `None` covers
    /// absent, expired and already-used codes alike.
    async fn take_valid(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LinkingCode>, LinkingServiceError>;

    /// Count live (unused, unexpired) codes.
    async fn count_active(&self, now: DateTime<Utc>) -> Result<u64, LinkingServiceError>;
}

/// Owners that completed a link.
pub trait LinkedUserRepository: Send + Sync {
    async fn record_link(
        &self,
        owner_id: &str,
        linked_at: DateTime<Utc>,
    ) -> Result<(), LinkingServiceError>;

    async fn count(&self) -> Result<u64, LinkingServiceError>;
}
