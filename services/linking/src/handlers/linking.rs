use axum::{Json, body::Bytes, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::types::LinkPayload;
use crate::error::{LinkingServiceError, ValidationRejection};
use crate::handlers::parse_json_body;
use crate::state::AppState;
use crate::usecase::linking::{GenerateCodeUseCase, ValidateCodeUseCase};

// ── POST /api/generate-code ──────────────────────────────────────────────────

/// Both fields are taken as raw JSON; a value of the wrong shape falls back to
/// the empty default rather than failing the request.
#[derive(Deserialize, Default)]
pub struct GenerateCodeRequest {
    pub chats: Option<Value>,
    pub settings: Option<Value>,
}

impl From<GenerateCodeRequest> for LinkPayload {
    fn from(req: GenerateCodeRequest) -> Self {
        let chats = match req.chats {
            Some(Value::Array(chats)) => chats,
            _ => Vec::new(),
        };
        let settings = match req.settings {
            Some(Value::Object(settings)) => settings,
            _ => Map::new(),
        };
        Self { chats, settings }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeResponse {
    pub code: String,
    #[serde(serialize_with = "botlink_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

pub async fn generate_code(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateCodeResponse>, LinkingServiceError> {
    let req: GenerateCodeRequest = parse_json_body(&body)?;
    let usecase = GenerateCodeUseCase::new(state.code_repo(), state.clock());
    let out = usecase.execute(req.into()).await?;
    Ok(Json(GenerateCodeResponse {
        code: out.code,
        expires_at: out.expires_at,
    }))
}

// ── POST /api/validate-code ──────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ValidateCodeRequest {
    pub code: Option<Value>,
    /// Accepted for compatibility with bot clients; not verified.
    pub bot_secret: Option<Value>,
}

impl ValidateCodeRequest {
    /// The code to look up, `None` when the field is missing or falsy.
    ///
    /// Truthy non-string values can never name a stored code.
    fn code(&self) -> Result<Option<&str>, LinkingServiceError> {
        match &self.code {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
            Some(Value::String(code)) => Ok(Some(code.as_str())),
            Some(_) => Err(LinkingServiceError::InvalidCode),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCodeResponse {
    pub valid: bool,
    pub chats: Vec<Value>,
    pub settings: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<Value>,
    pub user_id: String,
}

pub async fn validate_code(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ValidateCodeResponse>, ValidationRejection> {
    let req: ValidateCodeRequest = parse_json_body(&body)?;
    let usecase = ValidateCodeUseCase {
        codes: state.code_repo(),
        linked_users: state.linked_user_repo(),
        clock: state.clock(),
    };
    let out = usecase.execute(req.code()?).await?;
    let username = out.payload.user_name().cloned();
    Ok(Json(ValidateCodeResponse {
        valid: true,
        chats: out.payload.chats,
        settings: out.payload.settings,
        username,
        user_id: out.owner_id,
    }))
}
