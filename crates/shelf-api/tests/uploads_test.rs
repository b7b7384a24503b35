//! Upload endpoint tests against a real local storage root.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use shelf_api::routes::build_router;
use shelf_api::state::AppState;
use shelf_core::config::{Config, ThumbnailConfig};

async fn test_app() -> (Router, Arc<AppState>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        server_port: 0,
        storage_root: dir.path().to_path_buf(),
        max_body_size_mb: 16,
        upload_task_workers: 2,
        upload_task_queue_size: 64,
        thumbnails: ThumbnailConfig::default(),
    };
    let state = AppState::build(config).await.unwrap();
    (build_router(state.clone()), state, dir)
}

fn stream_request(path: &str, body: &str, extra: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri("/api/fs/stream")
        .header("File-Path", path);
    for (name, value) in extra {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _, _dir) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stream_upload_writes_object() {
    let (app, state, _dir) = test_app().await;

    let response = app
        .oneshot(stream_request("/docs/hello.txt", "hello world", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let meta = state.fs.get("/docs/hello.txt").await.unwrap();
    assert_eq!(meta.size, 11);
    let disk = meta.local_path.unwrap();
    assert_eq!(std::fs::read(disk).unwrap(), b"hello world");
}

#[tokio::test]
async fn test_stream_upload_decodes_percent_encoded_path() {
    let (app, state, _dir) = test_app().await;

    let response = app
        .oneshot(stream_request("/docs/two%20words.txt", "x", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(state.fs.get("/docs/two words.txt").await.is_ok());
}

#[tokio::test]
async fn test_overwrite_disabled_conflicts() {
    let (app, state, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(stream_request("/docs/once.txt", "first", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(stream_request(
            "/docs/once.txt",
            "second",
            &[("Overwrite", "false")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = response_json(response).await;
    assert_eq!(body["code"], "ALREADY_EXISTS");

    // The original object is untouched
    let meta = state.fs.get("/docs/once.txt").await.unwrap();
    assert_eq!(meta.size, 5);
}

#[tokio::test]
async fn test_overwrite_enabled_replaces() {
    let (app, state, _dir) = test_app().await;

    app.clone()
        .oneshot(stream_request("/docs/again.txt", "first", &[]))
        .await
        .unwrap();
    let response = app
        .oneshot(stream_request("/docs/again.txt", "replaced", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let meta = state.fs.get("/docs/again.txt").await.unwrap();
    assert_eq!(meta.size, 8);
}

#[tokio::test]
async fn test_missing_file_path_is_rejected() {
    let (app, _, _dir) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/fs/stream")
                .body(Body::from("data"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_traversal_path_is_denied() {
    let (app, _, _dir) = test_app().await;

    let response = app
        .oneshot(stream_request("/../../etc/passwd", "data", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = response_json(response).await;
    assert_eq!(body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_as_task_upload_returns_handle_and_completes() {
    let (app, state, _dir) = test_app().await;

    let response = app
        .oneshot(stream_request(
            "/inbox/queued.txt",
            "queued content",
            &[("As-Task", "true")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert!(body["task"]["id"].is_string());
    assert!(body["task"]["name"]
        .as_str()
        .unwrap()
        .contains("/inbox/queued.txt"));

    // The write happens on the worker pool after the response
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(meta) = state.fs.get("/inbox/queued.txt").await {
            assert_eq!(meta.size, 14);
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "queued upload never landed"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_form_upload_writes_object() {
    let (app, state, _dir) = test_app().await;

    let boundary = "shelf-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"form.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello form\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/fs/form")
                .header("File-Path", "/docs/form.txt")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let meta = state.fs.get("/docs/form.txt").await.unwrap();
    assert_eq!(meta.size, 10);
    let disk = meta.local_path.unwrap();
    assert_eq!(std::fs::read(disk).unwrap(), b"hello form");
}

#[tokio::test]
async fn test_form_upload_without_file_field_is_rejected() {
    let (app, _, _dir) = test_app().await;

    let boundary = "shelf-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\r\n\
         not a file\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/fs/form")
                .header("File-Path", "/docs/none.txt")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
