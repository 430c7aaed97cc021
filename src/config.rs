//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf, time::Duration};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub flags: FlagsConfig,
    pub upload: UploadConfig,
    pub listing: ListingConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain, optionally with port (e.g., "photos.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://photos.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Object storage backend selector
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible bucket (R2, GCS interoperability, MinIO, AWS)
    #[default]
    S3,
    /// In-process map served from `/media`; for local development and tests
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket name
    #[serde(default)]
    pub bucket: String,
    /// S3 endpoint, e.g. "https://<account>.r2.cloudflarestorage.com".
    /// Falls back to the AWS endpoint for `region` when omitted.
    pub endpoint: Option<String>,
    /// Signing region ("auto" for R2)
    pub region: String,
    /// Access key ID
    pub access_key_id: Option<String>,
    /// Secret access key
    pub secret_access_key: Option<String>,
    /// Use path-style addressing (MinIO and most self-hosted gateways)
    #[serde(default)]
    pub force_path_style: bool,
    /// Public URL base for stored photos
    /// e.g., "https://storage.googleapis.com/my-bucket"
    pub public_url: Option<String>,
    /// HMAC secret for memory-backend signed links
    pub signing_secret: Option<String>,
    /// Serve memory-backend objects without a signature
    pub public_read: bool,
}

/// Upload flag persistence
#[derive(Debug, Clone, Deserialize)]
pub struct FlagsConfig {
    /// JSON file holding `isUploadEnabled`
    pub path: PathBuf,
    /// Value reported while the file does not exist yet
    pub default_enabled: bool,
}

/// Upload pipeline limits
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted file in bytes (default: 20 MiB)
    pub max_bytes: usize,
    /// JPEG quality used by the server-side transcoder
    pub jpeg_quality: u8,
}

/// Longest lifetime S3 accepts for a presigned URL (seven days)
pub const MAX_SIGNED_URL_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Listing / pagination settings
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Page size when the request carries no `limit`
    pub default_limit: usize,
    /// Upper clamp for `limit`
    pub max_limit: usize,
    /// Lifetime of minted signed URLs in seconds
    pub signed_url_ttl_seconds: u64,
}

impl ListingConfig {
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_seconds)
    }
}

/// Admin guard configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// Bearer token required for toggle/delete.
    /// Unset leaves those endpoints open.
    pub token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (GUESTLENS__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.domain", "localhost:8080")?
            .set_default("server.protocol", "http")?
            .set_default("storage.backend", "s3")?
            .set_default("storage.region", "auto")?
            .set_default("storage.force_path_style", false)?
            .set_default("storage.public_read", true)?
            .set_default("flags.path", "config.json")?
            .set_default("flags.default_enabled", true)?
            .set_default("upload.max_bytes", 20 * 1024 * 1024)?
            .set_default("upload.jpeg_quality", 80)?
            .set_default("listing.default_limit", 16)?
            .set_default("listing.max_limit", 1000)?
            .set_default("listing.signed_url_ttl_seconds", 3600)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("GUESTLENS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        const MIN_SIGNING_SECRET_BYTES: usize = 16;

        if !(1..=100).contains(&self.upload.jpeg_quality) {
            return Err(AppError::Config(
                "upload.jpeg_quality must be between 1 and 100".to_string(),
            ));
        }

        if self.upload.max_bytes == 0 {
            return Err(AppError::Config(
                "upload.max_bytes must be greater than 0".to_string(),
            ));
        }

        if !(1..=MAX_SIGNED_URL_TTL_SECONDS).contains(&self.listing.signed_url_ttl_seconds) {
            return Err(AppError::Config(format!(
                "listing.signed_url_ttl_seconds must be between 1 and {}",
                MAX_SIGNED_URL_TTL_SECONDS
            )));
        }

        if self.listing.default_limit == 0 || self.listing.default_limit > self.listing.max_limit
        {
            return Err(AppError::Config(format!(
                "listing.default_limit must be between 1 and listing.max_limit ({})",
                self.listing.max_limit
            )));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.bucket.trim().is_empty() {
                    return Err(AppError::Config(
                        "storage.bucket is required when storage.backend=s3".to_string(),
                    ));
                }
                if self.storage.access_key_id.is_none() || self.storage.secret_access_key.is_none()
                {
                    return Err(AppError::Config(
                        "storage.access_key_id and storage.secret_access_key are required when storage.backend=s3"
                            .to_string(),
                    ));
                }
            }
            StorageBackend::Memory => {
                let secret_len = self
                    .storage
                    .signing_secret
                    .as_deref()
                    .map(str::len)
                    .unwrap_or(0);
                if secret_len < MIN_SIGNING_SECRET_BYTES {
                    return Err(AppError::Config(format!(
                        "storage.signing_secret must be at least {} bytes when storage.backend=memory",
                        MIN_SIGNING_SECRET_BYTES
                    )));
                }
            }
        }

        if self.admin.token.is_none() {
            tracing::warn!("admin.token is not set; upload toggle and delete endpoints are open");
        }

        if !self.server.protocol.eq_ignore_ascii_case("https")
            && !is_local_server_domain(&self.server.domain)
        {
            tracing::warn!(
                domain = %self.server.domain,
                "Serving a public domain over plain http"
            );
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}
