//! guestlens - event photo sharing over object storage
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - listFiles / upload / deleteFile / toggleUpload           │
//! │  - /media for the in-process store                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Upload pipeline (flag gate, type check, JPEG transcode)  │
//! │  - Listing with concurrent URL signing, deletion            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Storage Layer                           │
//! │  - S3-compatible bucket or in-process map                   │
//! │  - Upload flag JSON file                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Upload and gallery logic
//! - `storage`: Object store trait and backends
//! - `flags`: Persisted upload on/off switch
//! - `imaging`: JPEG transcoder and pre-upload compressor
//! - `client`: HTTP client for uploading and browsing the gallery
//! - `auth`: Optional admin token guard
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod flags;
pub mod imaging;
pub mod metrics;
pub mod progress;
pub mod service;
pub mod storage;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like the object store and flag store.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Photo storage
    pub storage: Arc<dyn storage::ObjectStore>,

    /// Upload on/off switch
    pub flags: Arc<dyn flags::FlagStore>,

    /// Link signer when photos are served from `/media`
    pub signer: Option<storage::UrlSigner>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect the configured storage backend
    /// 2. Open the upload flag file
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        use flags::FlagStore as _;

        tracing::info!("Initializing application state...");

        let (storage, signer): (Arc<dyn storage::ObjectStore>, Option<storage::UrlSigner>) =
            match config.storage.backend {
                config::StorageBackend::S3 => {
                    let store = storage::S3ObjectStore::new(&config.storage).await?;
                    (Arc::new(store), None)
                }
                config::StorageBackend::Memory => {
                    let secret = config.storage.signing_secret.as_deref().ok_or_else(|| {
                        error::AppError::Config(
                            "storage.signing_secret is required when storage.backend=memory"
                                .to_string(),
                        )
                    })?;
                    let signer = storage::UrlSigner::new(secret);
                    let store =
                        storage::MemoryObjectStore::new(config.server.base_url(), signer.clone());
                    tracing::warn!("Using in-memory photo storage; photos are lost on restart");
                    (Arc::new(store), Some(signer))
                }
            };
        tracing::info!(backend = ?config.storage.backend, "Photo storage initialized");

        let flags = flags::JsonFlagStore::new(&config.flags.path, config.flags.default_enabled);
        let enabled = flags.is_upload_enabled().await?;
        tracing::info!(
            path = %config.flags.path.display(),
            enabled,
            "Upload flag loaded"
        );

        Ok(Self::from_parts(config, storage, Arc::new(flags), signer))
    }

    /// Assemble state from already-built components
    pub fn from_parts(
        config: config::AppConfig,
        storage: Arc<dyn storage::ObjectStore>,
        flags: Arc<dyn flags::FlagStore>,
        signer: Option<storage::UrlSigner>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            flags,
            signer,
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    let mut router = Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api::api_router(state.config.upload.max_bytes))
        .merge(api::metrics_router());
    if state.signer.is_some() {
        router = router.merge(api::media_router());
    }

    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if !server.protocol.eq_ignore_ascii_case("https") {
        return CorsLayer::permissive();
    }

    let allowed_origin = server.base_url();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin from server base URL; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
