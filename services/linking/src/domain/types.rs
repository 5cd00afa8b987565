use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chat history and settings a web session hands over to the bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPayload {
    pub chats: Vec<Value>,
    pub settings: Map<String, Value>,
}

impl LinkPayload {
    /// Whatever the web client stored under `settings.userName`, any JSON type.
    pub fn user_name(&self) -> Option<&Value> {
        self.settings.get("userName")
    }
}

/// One-time code binding an owner to the payload captured at generation.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkingCode {
    pub code: String,
    pub owner_id: String,
    pub payload: LinkPayload,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl LinkingCode {
    /// Build a fresh, unused code issued at `now`.
    pub fn issue(code: String, payload: LinkPayload, now: DateTime<Utc>) -> Self {
        Self {
            code,
            owner_id: owner_id_at(now),
            payload,
            created_at: now,
            expires_at: now + Duration::seconds(LINKING_CODE_TTL_SECS),
            used: false,
        }
    }

    /// Strictly after `expires_at`; the boundary instant itself is still valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired(now)
    }

    /// Time from issue to expiry.
    pub fn ttl(&self) -> Duration {
        self.expires_at - self.created_at
    }
}

/// Owner identifiers are derived from the issue time.
pub fn owner_id_at(now: DateTime<Utc>) -> String {
    format!("user_{}", now.timestamp_millis())
}

/// Canonical form of a code as typed by a user: trimmed and upper-cased.
///
/// Returns `None` when nothing is left after trimming.
pub fn normalize_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_uppercase())
    }
}

/// Linking code length in characters.
pub const LINKING_CODE_LEN: usize = 8;

/// Linking code time-to-live in seconds.
pub const LINKING_CODE_TTL_SECS: i64 = 300;

/// Upper bound on draws when a freshly generated code collides with a live one.
pub const MAX_GENERATE_ATTEMPTS: usize = 8;
