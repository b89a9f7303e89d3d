use super::*;
use tokio_stream::StreamExt;

#[tokio::test]
async fn test_health_check() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    let response = send(router_for(&downloader), get("/api/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["accepting_downloads"], true);
}

#[tokio::test]
async fn test_openapi_route() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    let response = send(router_for(&downloader), get("/api/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let spec = json_body(response).await;
    assert!(spec["paths"]["/api/download"].is_object());
}

/// Read SSE chunks until `needle` shows up
async fn read_until(body: Body, needle: &str) -> String {
    let mut stream = body.into_data_stream();
    let mut seen = String::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(chunk) = stream.next().await {
            seen.push_str(&String::from_utf8_lossy(&chunk.unwrap()));
            if seen.contains(needle) {
                break;
            }
        }
    })
    .await
    .expect("event not streamed");
    seen
}

#[tokio::test]
async fn test_event_stream_emits_named_events() {
    let launcher = ScriptedLauncher::new().script(
        URL,
        vec![
            Step::delay_ms(20),
            Step::out("[download]  42.0% of 1.00MiB"),
            Step::exit(0),
        ],
    );
    let (downloader, _temp_dir) = create_test_downloader(launcher).await;

    let response = send(router_for(&downloader), get("/api/events")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    downloader
        .submit(crate::types::DownloadRequest::video(URL, "best"))
        .await
        .unwrap();

    let seen = read_until(response.into_body(), "event: download-complete").await;
    let start = seen.find("event: download-start").unwrap();
    let progress = seen.find("event: download-progress").unwrap();
    let complete = seen.find("event: download-complete").unwrap();
    assert!(start < progress && progress < complete);
    assert!(seen.contains(r#""progress":42.0"#));
    assert!(seen.contains(r#""status":"completed""#));
}

#[tokio::test]
async fn test_event_stream_filters_by_download() {
    let other = "https://example.com/other";
    let launcher = ScriptedLauncher::new()
        .script(other, vec![Step::out("[download] Destination: other.mp4"), Step::exit(0)])
        .script(URL, vec![Step::delay_ms(50), Step::exit(0)]);
    let (downloader, _temp_dir) = create_test_downloader(launcher).await;

    let first = downloader
        .submit(crate::types::DownloadRequest::video(URL, "best"))
        .await
        .unwrap();

    let uri = format!("/api/events?download_id={}", first.0);
    let response = send(router_for(&downloader), get(&uri)).await;

    downloader
        .submit(crate::types::DownloadRequest::video(other, "best"))
        .await
        .unwrap();

    let seen = read_until(response.into_body(), "event: download-complete").await;
    assert!(seen.contains(&format!(r#""id":{}"#, first.0)));
    assert!(!seen.contains(other));
}
