use super::*;
use crate::downloader::test_helpers::{ScriptedLauncher, Step, wait_for_terminal};
use crate::types::{DownloadId, Status};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

mod media;
mod system;

const URL: &str = "https://example.com/watch?v=abc";

/// Test downloader wrapped in Arc, as the router expects
async fn create_test_downloader(
    launcher: ScriptedLauncher,
) -> (Arc<MediaDownloader>, tempfile::TempDir) {
    let (downloader, temp_dir) =
        crate::downloader::test_helpers::create_test_downloader(Arc::new(launcher)).await;
    (Arc::new(downloader), temp_dir)
}

fn router_for(downloader: &Arc<MediaDownloader>) -> Router {
    create_router(downloader.clone(), downloader.get_config())
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    let mut config = (*downloader.get_config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let downloader = downloader.clone();
        async move { start_api_server(downloader, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server exited early");
    api_handle.abort();
}

#[tokio::test]
async fn test_cors_headers_when_enabled() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(router_for(&downloader), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_restricted_to_listed_origins() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    let mut config = (*downloader.get_config()).clone();
    config.server.api.cors_origins = vec!["http://allowed.test".to_string()];
    let app = create_router(downloader.clone(), Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://other.test")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_api_key_guards_every_route() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    let mut config = (*downloader.get_config()).clone();
    config.server.api.api_key = Some("letmein".to_string());
    let app = create_router(downloader.clone(), Arc::new(config));

    let response = send(app.clone(), get("/api/downloads")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/downloads")
        .header("X-Api-Key", "letmein")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_swagger_ui_can_be_disabled() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    let mut config = (*downloader.get_config()).clone();
    config.server.api.swagger_ui = false;
    let app = create_router(downloader.clone(), Arc::new(config));

    let response = send(app, get("/swagger-ui/")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_default_config_router_serves_both_documents() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    let config = Config::default();
    assert!(config.server.api.swagger_ui);
    let app = create_router(downloader.clone(), Arc::new(config));

    let response = send(app.clone(), get("/api/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert!(doc["paths"]["/api/download"].is_object());

    let response = send(app, get(SWAGGER_DOC_PATH)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert!(doc["paths"]["/api/download"].is_object());
}
