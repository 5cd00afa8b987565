use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Linking service error variants.
///
/// Absent, expired and already-used codes all collapse into `InvalidCode` so a
/// caller cannot probe which codes once existed.
#[derive(Debug, thiserror::Error)]
pub enum LinkingServiceError {
    #[error("Code is required")]
    CodeRequired,
    #[error("Invalid or expired code")]
    InvalidCode,
    #[error("Server error")]
    MalformedBody(#[from] serde_json::Error),
    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

impl LinkingServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CodeRequired => "CODE_REQUIRED",
            Self::InvalidCode => "INVALID_CODE",
            Self::MalformedBody(_) => "MALFORMED_BODY",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::CodeRequired => StatusCode::BAD_REQUEST,
            Self::InvalidCode => StatusCode::NOT_FOUND,
            Self::MalformedBody(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log 500s with their cause. 4xx are expected client outcomes and are
    /// already covered by the request trace.
    fn log_server_fault(&self) {
        match self {
            Self::MalformedBody(e) => {
                tracing::error!(error = %e, kind = self.kind(), "malformed request body");
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = self.kind(), "internal error");
            }
            Self::CodeRequired | Self::InvalidCode => {}
        }
    }
}

impl IntoResponse for LinkingServiceError {
    fn into_response(self) -> Response {
        self.log_server_fault();
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), axum::Json(body)).into_response()
    }
}

/// Error body for the validate endpoint, which always reports `valid: false`.
#[derive(Debug)]
pub struct ValidationRejection(pub LinkingServiceError);

impl From<LinkingServiceError> for ValidationRejection {
    fn from(err: LinkingServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let Self(err) = self;
        err.log_server_fault();
        let body = serde_json::json!({ "valid": false, "error": err.to_string() });
        (err.status(), axum::Json(body)).into_response()
    }
}
