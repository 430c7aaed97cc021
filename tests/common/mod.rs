//! Common test utilities for E2E tests

#![allow(dead_code)]

use std::io::Cursor;

use guestlens::{AppState, config};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Test server instance backed by the in-memory store
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Test server requiring `ADMIN_TOKEN` on admin endpoints
    pub async fn with_admin_token() -> Self {
        Self::with_config(|config| config.admin.token = Some(ADMIN_TOKEN.to_string())).await
    }

    /// Create a test server after applying `customize` to the default config
    pub async fn with_config(customize: impl FnOnce(&mut config::AppConfig)) -> Self {
        let temp_dir = TempDir::new().unwrap();

        // Bind first: links handed out by the memory store embed the port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: addr.port(),
                domain: addr.to_string(),
                protocol: "http".to_string(),
            },
            storage: config::StorageConfig {
                backend: config::StorageBackend::Memory,
                bucket: String::new(),
                endpoint: None,
                region: "auto".to_string(),
                access_key_id: None,
                secret_access_key: None,
                force_path_style: false,
                public_url: None,
                signing_secret: Some("test-signing-secret-32-bytes!!!!".to_string()),
                public_read: true,
            },
            flags: config::FlagsConfig {
                path: temp_dir.path().join("config.json"),
                default_enabled: true,
            },
            upload: config::UploadConfig {
                max_bytes: 10 * 1024 * 1024,
                jpeg_quality: 80,
            },
            listing: config::ListingConfig {
                default_limit: 16,
                max_limit: 1000,
                signed_url_ttl_seconds: 3600,
            },
            admin: config::AdminConfig { token: None },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };
        customize(&mut config);
        config.validate().unwrap();

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Build router
        let app = guestlens::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: format!("http://{}", addr),
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// API client pointed at this server
    pub fn api_client(&self) -> guestlens::client::ApiClient {
        guestlens::client::ApiClient::new(&self.addr).unwrap()
    }

    /// POST a single `file` part to /api/upload
    pub async fn upload(&self, name: &str, content_type: &str, data: Vec<u8>) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(name.to_string())
            .mime_str(content_type)
            .unwrap();
        let form = reqwest::multipart::Form::new().part("file", part);

        self.client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    /// Upload a small PNG and assert success
    pub async fn upload_png(&self, name: &str) {
        let response = self.upload(name, "image/png", png(32, 24)).await;
        assert_eq!(response.status(), 200, "upload of {name} failed");
    }

    /// Write the upload flag through the shared state
    pub async fn set_uploads_enabled(&self, enabled: bool) {
        self.state.flags.set_upload_enabled(enabled).await.unwrap();
    }
}

/// Gradient image encoded as `format`
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    }));
    // JPEG needs RGB; the GIF encoder wants RGBA
    if format != ImageFormat::Jpeg {
        image = DynamicImage::ImageRgba8(image.to_rgba8());
    }
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Png)
}
