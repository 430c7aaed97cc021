//! E2E tests for GET /api/listFiles and signed photo links

mod common;

use std::collections::HashSet;

use common::TestServer;
use guestlens::api::dto::ListFilesResponse;
use serde_json::Value;

async fn list(server: &TestServer, query: &str) -> reqwest::Response {
    server
        .client
        .get(server.url(&format!("/api/listFiles{query}")))
        .send()
        .await
        .unwrap()
}

/// Store `count` photos directly, bypassing the upload route
async fn seed(server: &TestServer, count: usize) {
    for i in 0..count {
        server
            .state
            .storage
            .put(&format!("photo-{i:02}.jpg"), vec![0xFF, 0xD8, i as u8], "image/jpeg")
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_empty_gallery() {
    let server = TestServer::new().await;

    let response = list(&server, "").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["fileUrls"], serde_json::json!([]));
    assert!(body.get("nextPageToken").is_none());
}

#[tokio::test]
async fn test_default_page_size_and_cursor_walk() {
    let server = TestServer::new().await;
    seed(&server, 20).await;

    let first: ListFilesResponse = list(&server, "").await.json().await.unwrap();
    assert_eq!(first.file_urls.len(), 16);
    let token = first.next_page_token.clone().expect("more pages expected");

    let second: ListFilesResponse = list(&server, &format!("?pageToken={token}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second.file_urls.len(), 4);
    assert!(second.next_page_token.is_none());

    let names: HashSet<_> = first
        .file_urls
        .iter()
        .chain(second.file_urls.iter())
        .map(|file| file.name.clone())
        .collect();
    assert_eq!(names.len(), 20);
}

#[tokio::test]
async fn test_exact_multiple_ends_without_token() {
    let server = TestServer::new().await;
    seed(&server, 10).await;

    let first: ListFilesResponse = list(&server, "?limit=5").await.json().await.unwrap();
    let token = first.next_page_token.expect("second page expected");

    let second: ListFilesResponse = list(&server, &format!("?limit=5&pageToken={token}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second.file_urls.len(), 5);
    assert!(second.next_page_token.is_none());
}

#[tokio::test]
async fn test_same_cursor_returns_same_page() {
    let server = TestServer::new().await;
    seed(&server, 9).await;

    let first: ListFilesResponse = list(&server, "?limit=3").await.json().await.unwrap();
    let token = first.next_page_token.unwrap();

    let a: ListFilesResponse = list(&server, &format!("?limit=3&pageToken={token}"))
        .await
        .json()
        .await
        .unwrap();
    let b: ListFilesResponse = list(&server, &format!("?limit=3&pageToken={token}"))
        .await
        .json()
        .await
        .unwrap();

    let names = |page: &ListFilesResponse| -> Vec<String> {
        page.file_urls.iter().map(|file| file.name.clone()).collect()
    };
    assert_eq!(names(&a), names(&b));
    assert_eq!(a.next_page_token, b.next_page_token);
}

#[tokio::test]
async fn test_zero_limit_rejected() {
    let server = TestServer::new().await;

    let response = list(&server, "?limit=0").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_non_numeric_limit_rejected() {
    let server = TestServer::new().await;

    let response = list(&server, "?limit=lots").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_garbage_cursor_rejected() {
    let server = TestServer::new().await;
    seed(&server, 2).await;

    let response = list(&server, "?pageToken=not*base64").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_limit_above_maximum_is_clamped() {
    let server = TestServer::with_config(|config| {
        config.listing.default_limit = 5;
        config.listing.max_limit = 5;
    })
    .await;
    seed(&server, 8).await;

    let page: ListFilesResponse = list(&server, "?limit=50").await.json().await.unwrap();
    assert_eq!(page.file_urls.len(), 5);
    assert!(page.next_page_token.is_some());
}

#[tokio::test]
async fn test_signed_url_fetches_photo() {
    let server = TestServer::with_config(|config| config.storage.public_read = false).await;
    server.upload_png("signed.png").await;

    let page: ListFilesResponse = list(&server, "").await.json().await.unwrap();
    let file = &page.file_urls[0];
    assert_eq!(file.name, "signed.png");
    assert!(file.url.contains("signature="));

    let response = server.client.get(&file.url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
}

#[tokio::test]
async fn test_tampered_or_unsigned_link_is_forbidden() {
    let server = TestServer::with_config(|config| config.storage.public_read = false).await;
    server.upload_png("private.png").await;

    let page: ListFilesResponse = list(&server, "").await.json().await.unwrap();
    let url = &page.file_urls[0].url;

    let tampered = format!("{}x", url);
    let response = server.client.get(&tampered).send().await.unwrap();
    assert_eq!(response.status(), 403);

    let unsigned = url.split('?').next().unwrap();
    let response = server.client.get(unsigned).send().await.unwrap();
    assert_eq!(response.status(), 403);
}
