pub mod linking;
pub mod status;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::LinkingServiceError;

/// Decode a JSON request body, treating an empty body as `{}`.
///
/// Parse failures surface as a server fault rather than axum's 4xx rejection.
pub(crate) fn parse_json_body<T>(body: &Bytes) -> Result<T, LinkingServiceError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}
