use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rand::RngExt;

use crate::domain::repository::{LinkedUserRepository, LinkingCodeRepository};
use crate::domain::time::Clock;
use crate::domain::types::{
    LINKING_CODE_LEN, LinkPayload, LinkingCode, MAX_GENERATE_ATTEMPTS, normalize_code,
};
use crate::error::LinkingServiceError;

/// Charset for generating random linking codes (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draw a code from the thread-local CSPRNG.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..LINKING_CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

// ── GenerateCode ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct GenerateCodeOutput {
    pub code: String,
    pub owner_id: String,
    pub expires_at: DateTime<Utc>,
}

pub struct GenerateCodeUseCase<R, C, G = fn() -> String>
where
    R: LinkingCodeRepository,
    C: Clock,
    G: Fn() -> String,
{
    pub codes: R,
    pub clock: C,
    pub draw: G,
}

impl<R, C> GenerateCodeUseCase<R, C>
where
    R: LinkingCodeRepository,
    C: Clock,
{
    pub fn new(codes: R, clock: C) -> Self {
        Self {
            codes,
            clock,
            draw: generate_code,
        }
    }
}

impl<R, C, G> GenerateCodeUseCase<R, C, G>
where
    R: LinkingCodeRepository,
    C: Clock,
    G: Fn() -> String,
{
    pub async fn execute(
        &self,
        payload: LinkPayload,
    ) -> Result<GenerateCodeOutput, LinkingServiceError> {
        for attempt in 1..=MAX_GENERATE_ATTEMPTS {
            let record = LinkingCode::issue((self.draw)(), payload.clone(), self.clock.now());
            let output = GenerateCodeOutput {
                code: record.code.clone(),
                owner_id: record.owner_id.clone(),
                expires_at: record.expires_at,
            };
            if self.codes.insert_new(record).await? {
                tracing::info!(
                    code = %output.code,
                    owner_id = %output.owner_id,
                    expires_at = %output.expires_at,
                    chats = payload.chats.len(),
                    "generated linking code"
                );
                return Ok(output);
            }
            tracing::warn!(attempt, "linking code collided with a live code; redrawing");
        }
        Err(LinkingServiceError::Internal(anyhow!(
            "no free linking code after {MAX_GENERATE_ATTEMPTS} attempts"
        )))
    }
}

// ── ValidateCode ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ValidateCodeOutput {
    pub owner_id: String,
    pub payload: LinkPayload,
}

pub struct ValidateCodeUseCase<R, U, C>
where
    R: LinkingCodeRepository,
    U: LinkedUserRepository,
    C: Clock,
{
    pub codes: R,
    pub linked_users: U,
    pub clock: C,
}

impl<R, U, C> ValidateCodeUseCase<R, U, C>
where
    R: LinkingCodeRepository,
    U: LinkedUserRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        code: Option<&str>,
    ) -> Result<ValidateCodeOutput, LinkingServiceError> {
        let code = code
            .and_then(normalize_code)
            .ok_or(LinkingServiceError::CodeRequired)?;

        let now = self.clock.now();
        let Some(record) = self.codes.take_valid(&code, now).await? else {
            tracing::info!(code = %code, "rejected linking code");
            return Err(LinkingServiceError::InvalidCode);
        };

        self.linked_users.record_link(&record.owner_id, now).await?;
        tracing::info!(code = %code, owner_id = %record.owner_id, "linking code validated");

        Ok(ValidateCodeOutput {
            owner_id: record.owner_id,
            payload: record.payload,
        })
    }
}

// ── RegistryStats ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub active_codes: u64,
    pub linked_users: u64,
}

pub struct RegistryStatsUseCase<R, U, C>
where
    R: LinkingCodeRepository,
    U: LinkedUserRepository,
    C: Clock,
{
    pub codes: R,
    pub linked_users: U,
    pub clock: C,
}

impl<R, U, C> RegistryStatsUseCase<R, U, C>
where
    R: LinkingCodeRepository,
    U: LinkedUserRepository,
    C: Clock,
{
    pub async fn execute(&self) -> Result<RegistryStats, LinkingServiceError> {
        Ok(RegistryStats {
            active_codes: self.codes.count_active(self.clock.now()).await?,
            linked_users: self.linked_users.count().await?,
        })
    }
}
