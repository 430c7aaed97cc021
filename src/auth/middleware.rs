//! Admin guard extractor

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use sha2::{Digest, Sha256};

use crate::AppState;
use crate::error::AppError;

fn extract_token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Compare digests so timing does not depend on where the tokens differ.
fn tokens_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Guard for admin-only handlers
///
/// Passes unconditionally when `admin.token` is unset.
///
/// # Usage
/// ```ignore
/// async fn handler(_admin: AdminGuard) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

#[async_trait]
impl<S> FromRequestParts<S> for AdminGuard
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let Some(expected) = state.config.admin.token.as_deref() else {
            return Ok(AdminGuard);
        };

        let presented = extract_token_from_headers(&parts.headers).ok_or(AppError::Unauthorized)?;
        if tokens_match(presented, expected) {
            Ok(AdminGuard)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin request with wrong token");
            Err(AppError::Unauthorized)
        }
    }
}
