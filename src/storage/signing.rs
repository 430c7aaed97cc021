//! HMAC-signed, time-limited read links
//!
//! Link format: `{base}/media/{key}?expires={unix_secs}&signature={sig}`
//! where `sig = base64url(HMAC-SHA256(secret, "{key}\n{expires}"))`.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Mints and verifies signed read links
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner").finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, key: &str, expires: i64) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid signing key: {e}")))?;
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Signature for `key` valid until the unix timestamp `expires`
    pub fn sign(&self, key: &str, expires: i64) -> Result<String, AppError> {
        let signature = self.mac(key, expires)?.finalize().into_bytes();
        Ok(general_purpose::URL_SAFE_NO_PAD.encode(signature))
    }

    /// Check a presented signature.
    ///
    /// # Errors
    /// `AppError::Forbidden` if the link has expired or the signature does not match.
    pub fn verify(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if expires < now.timestamp() {
            return Err(AppError::Forbidden);
        }

        let presented = general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AppError::Forbidden)?;

        self.mac(key, expires)?
            .verify_slice(&presented)
            .map_err(|_| AppError::Forbidden)
    }
}
