//! Caller identity extraction.
//!
//! Authentication itself (login, token issuance) lives outside this service;
//! the surface in front of the PSP passes the authenticated caller identity
//! explicitly in the `x-caller-id` header, and it is threaded as a value
//! through the coordinator - never read from ambient state.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller on whose behalf a request runs.
#[derive(Debug, Clone)]
pub struct Caller {
    /// The caller's identity.
    pub id: String,
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-caller-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        Ok(Self { id: id.to_string() })
    }
}
