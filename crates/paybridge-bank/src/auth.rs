//! Authentication extractor.
//!
//! The transfer protocol runs between services, so the only credential is
//! the bank's shared static API key, attached by the PSP to every request as
//! the `x-api-key` header and compared in constant time.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use paybridge_core::crypto::constant_time_eq;

use crate::error::ApiError;
use crate::state::AppState;

/// Proof that the request carried the bank's API key.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for ApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        if !constant_time_eq(presented, &state.config.api_key) {
            return Err(ApiError::Unauthorized);
        }

        Ok(Self)
    }
}
