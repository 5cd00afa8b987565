use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::time::Clock;
use crate::error::LinkingServiceError;
use crate::infra::memory::{InMemoryLinkedUserStore, InMemoryLinkingCodeStore};
use crate::state::AppState;
use crate::usecase::linking::RegistryStatsUseCase;

type StatsUseCase =
    RegistryStatsUseCase<InMemoryLinkingCodeStore, InMemoryLinkedUserStore, Arc<dyn Clock>>;

fn stats_usecase(state: &AppState) -> StatsUseCase {
    RegistryStatsUseCase {
        codes: state.code_repo(),
        linked_users: state.linked_user_repo(),
        clock: state.clock(),
    }
}

// ── GET /api/health ──────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(serialize_with = "botlink_core::serde::to_rfc3339_ms")]
    pub timestamp: DateTime<Utc>,
    pub active_codes: u64,
}

pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, LinkingServiceError> {
    let stats = stats_usecase(&state).execute().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        timestamp: state.clock().now(),
        active_codes: stats.active_codes,
    }))
}

// ── GET /api/stats ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub active_codes: u64,
    pub linked_users: u64,
    /// Seconds since the service started.
    pub uptime: f64,
}

pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, LinkingServiceError> {
    let stats = stats_usecase(&state).execute().await?;
    Ok(Json(StatsResponse {
        active_codes: stats.active_codes,
        linked_users: stats.linked_users,
        uptime: state.uptime().as_secs_f64(),
    }))
}

// ── fallback ─────────────────────────────────────────────────────────────────

pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
}
