//! Shared-secret gate for the REST API.
//!
//! Every `/api` request must carry the configured key in the `x-api-key`
//! header. A missing header is `401`, a wrong key is `403`.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::app_state::AppState;
use crate::error::RegistryError;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Axum middleware rejecting requests without the configured API key.
///
/// # Errors
///
/// Returns [`RegistryError::MissingApiKey`] or
/// [`RegistryError::InvalidApiKey`].
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RegistryError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .ok_or(RegistryError::MissingApiKey)?;

    if !constant_time_eq::constant_time_eq(provided.as_bytes(), state.api_key.as_bytes()) {
        tracing::debug!(uri = %request.uri(), "rejected request with invalid API key");
        return Err(RegistryError::InvalidApiKey);
    }

    Ok(next.run(request).await)
}
