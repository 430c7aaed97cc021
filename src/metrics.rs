//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{Counter, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("guestlens_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "guestlens_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Photo Metrics
    pub static ref PHOTO_UPLOADS_TOTAL: IntCounter = IntCounter::new(
        "guestlens_photo_uploads_total",
        "Total number of stored photo uploads"
    ).expect("metric can be created");
    pub static ref PHOTO_BYTES_STORED: Counter = Counter::new(
        "guestlens_photo_bytes_stored_total",
        "Total transcoded JPEG bytes written to storage"
    ).expect("metric can be created");
    pub static ref UPLOAD_REJECTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("guestlens_upload_rejections_total", "Uploads rejected before storage"),
        &["reason"]
    ).expect("metric can be created");
    pub static ref PHOTO_DELETES_TOTAL: IntCounter = IntCounter::new(
        "guestlens_photo_deletes_total",
        "Total number of deleted photos"
    ).expect("metric can be created");
    pub static ref SIGNED_URLS_TOTAL: IntCounter = IntCounter::new(
        "guestlens_signed_urls_total",
        "Total number of signed URLs minted for listings"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("guestlens_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("HTTP_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("HTTP_REQUEST_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(PHOTO_UPLOADS_TOTAL.clone()))
        .expect("PHOTO_UPLOADS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(PHOTO_BYTES_STORED.clone()))
        .expect("PHOTO_BYTES_STORED can be registered");
    REGISTRY
        .register(Box::new(UPLOAD_REJECTIONS_TOTAL.clone()))
        .expect("UPLOAD_REJECTIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(PHOTO_DELETES_TOTAL.clone()))
        .expect("PHOTO_DELETES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SIGNED_URLS_TOTAL.clone()))
        .expect("SIGNED_URLS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
