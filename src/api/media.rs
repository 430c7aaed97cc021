//! Photo bytes for the memory backend
//!
//! Only mounted when storage is in-process; S3 links go straight to the bucket.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;

/// Signed-link query parameters
#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: Option<i64>,
    pub signature: Option<String>,
}

/// GET /media/*key
///
/// A link carrying a signature must verify and be unexpired. Unsigned reads
/// are allowed only when `storage.public_read` is set.
pub async fn serve_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<SignedQuery>,
) -> Result<Response, AppError> {
    let signer = state.signer.as_ref().ok_or(AppError::NotFound)?;

    match query.signature.as_deref() {
        Some(signature) => {
            let expires = query.expires.ok_or(AppError::Forbidden)?;
            signer.verify(&key, expires, signature, Utc::now())?;
        }
        None if state.config.storage.public_read => {}
        None => return Err(AppError::Forbidden),
    }

    let object = state.storage.get(&key).await?;

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::CACHE_CONTROL, "private, max-age=300".to_string()),
        ],
        object.data,
    )
        .into_response())
}
