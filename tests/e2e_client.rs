//! E2E tests driving the server through `guestlens::client`

mod common;

use common::{ADMIN_TOKEN, TestServer, png};
use guestlens::client::{ClientError, GalleryController, ItemState};
use guestlens::imaging::SelectedFile;
use guestlens::progress::ProgressReporter;

fn drain(mut rx: tokio::sync::mpsc::UnboundedReceiver<u8>) -> Vec<u8> {
    let mut values = Vec::new();
    while let Ok(value) = rx.try_recv() {
        values.push(value);
    }
    values
}

#[tokio::test]
async fn test_upload_reports_progress_and_returns_url() {
    let server = TestServer::new().await;
    let client = server.api_client();

    let (compression, compression_rx) = ProgressReporter::channel();
    let (transfer, transfer_rx) = ProgressReporter::channel();
    let file = SelectedFile::new("wide.png", "image/png", png(1200, 600));

    let outcome = client.upload(file, compression, transfer).await.unwrap();
    assert!(outcome.url.ends_with("/media/wide.png"));
    assert!(outcome.preview_data_url.starts_with("data:image/jpeg;base64,"));

    let compression = drain(compression_rx);
    let transfer = drain(transfer_rx);
    assert_eq!(compression.last(), Some(&100));
    assert_eq!(transfer.first(), Some(&0));
    assert_eq!(transfer.last(), Some(&100));
    assert!(compression.windows(2).all(|w| w[0] < w[1]));
    assert!(transfer.windows(2).all(|w| w[0] < w[1]));

    let download = client.download(&outcome.url).await.unwrap();
    assert_eq!(download.content_type.as_deref(), Some("image/jpeg"));
    let stored = image::load_from_memory(&download.data).unwrap();
    assert_eq!((stored.width(), stored.height()), (800, 400));
}

#[tokio::test]
async fn test_upload_refused_when_disabled() {
    let server = TestServer::new().await;
    server.set_uploads_enabled(false).await;
    let client = server.api_client();

    let (transfer, transfer_rx) = ProgressReporter::channel();
    let file = SelectedFile::new("late.png", "image/png", png(10, 10));

    let error = client
        .upload(file, ProgressReporter::noop(), transfer)
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::UploadsDisabled));
    assert!(drain(transfer_rx).is_empty());
}

#[tokio::test]
async fn test_uncompressed_upload_maps_server_rejections() {
    let server = TestServer::new().await;
    let client = server.api_client();

    let file = SelectedFile::new("broken.png", "image/png", b"nope".to_vec());
    let error = client
        .upload_uncompressed(file, ProgressReporter::noop())
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::Server { status: 500, .. }));

    server.set_uploads_enabled(false).await;
    let file = SelectedFile::new("ok.png", "image/png", png(4, 4));
    let error = client
        .upload_uncompressed(file, ProgressReporter::noop())
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::UploadsDisabled));
}

#[tokio::test]
async fn test_toggle_through_client() {
    let server = TestServer::with_admin_token().await;

    let anonymous = server.api_client();
    assert!(anonymous.upload_enabled().await.unwrap());
    assert!(matches!(
        anonymous.set_upload_enabled(false).await,
        Err(ClientError::Unauthorized)
    ));

    let admin = server.api_client().with_admin_token(ADMIN_TOKEN);
    assert!(!admin.set_upload_enabled(false).await.unwrap());
    assert!(!anonymous.upload_enabled().await.unwrap());
}

#[tokio::test]
async fn test_gallery_pages_until_exhausted() {
    let server = TestServer::new().await;
    for i in 0..7 {
        server.upload_png(&format!("img-{i}.png")).await;
    }

    let mut gallery = GalleryController::new(server.api_client(), Some(3));
    assert_eq!(gallery.load_more().await.unwrap(), 3);
    assert_eq!(gallery.load_more().await.unwrap(), 3);
    assert!(!gallery.is_exhausted());
    assert_eq!(gallery.load_more().await.unwrap(), 1);
    assert!(gallery.is_exhausted());
    assert_eq!(gallery.load_more().await.unwrap(), 0);

    let names: Vec<_> = gallery.items().iter().map(|i| i.name.clone()).collect();
    let expected: Vec<_> = (0..7).map(|i| format!("img-{i}.png")).collect();
    assert_eq!(names, expected);
    assert!(gallery.items().iter().all(|i| i.state == ItemState::Loading));
}

#[tokio::test]
async fn test_gallery_download_and_delete() {
    let server = TestServer::new().await;
    server.upload_png("a.png").await;
    server.upload_png("b.png").await;

    let mut gallery = GalleryController::new(server.api_client(), None);
    gallery.load_more().await.unwrap();

    let download = gallery.download("a.png").await.unwrap();
    assert_eq!(download.content_type.as_deref(), Some("image/jpeg"));
    assert!(gallery.mark_loaded("a.png"));

    gallery.request_delete("b.png").unwrap();
    assert_eq!(gallery.confirm_delete().await.unwrap().as_deref(), Some("b.png"));
    assert_eq!(gallery.items().len(), 1);

    gallery.refresh().await.unwrap();
    let names: Vec<_> = gallery.items().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["a.png"]);
}

#[tokio::test]
async fn test_gallery_keeps_item_removed_when_server_delete_fails() {
    let server = TestServer::new().await;
    server.upload_png("a.png").await;

    let mut gallery = GalleryController::new(server.api_client(), None);
    gallery.load_more().await.unwrap();

    // Remove behind the gallery's back so the server answers 404
    server.state.storage.delete("a.png").await.unwrap();

    gallery.request_delete("a.png").unwrap();
    assert!(matches!(
        gallery.confirm_delete().await,
        Err(ClientError::NotFound)
    ));
    assert!(gallery.items().is_empty());
}
