use super::*;

#[tokio::test]
async fn test_probe_routes_require_url() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    for uri in ["/api/info", "/api/info/playlist", "/api/formats", "/api/info?url="] {
        let response = send(router_for(&downloader), get(uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "missing_field");
        assert_eq!(body["error"]["details"]["field"], "url");
    }
}

#[tokio::test]
async fn test_media_info_route() {
    let launcher = ScriptedLauncher::new().script(
        URL,
        vec![
            Step::out(r#"{"id":"abc","title":"A Clip","duration":3.0}"#),
            Step::exit(0),
        ],
    );
    let (downloader, _temp_dir) = create_test_downloader(launcher).await;

    let uri = format!("/api/info?url={}", urlencoding::encode(URL));
    let response = send(router_for(&downloader), get(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let info = json_body(response).await;
    assert_eq!(info["title"], "A Clip");
    assert_eq!(info["duration"], 3.0);
}

#[tokio::test]
async fn test_tool_failure_is_bad_gateway() {
    let launcher = ScriptedLauncher::new().script(
        URL,
        vec![Step::err("ERROR: Video unavailable"), Step::exit(1)],
    );
    let (downloader, _temp_dir) = create_test_downloader(launcher).await;

    let uri = format!("/api/info/playlist?url={}", urlencoding::encode(URL));
    let response = send(router_for(&downloader), get(&uri)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = json_body(response).await;
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Video unavailable")
    );
}

#[tokio::test]
async fn test_formats_route_groups_table() {
    let launcher = ScriptedLauncher::new().script(
        URL,
        vec![
            Step::out("[info] Available formats for abc:"),
            Step::out("ID  EXT  RESOLUTION FPS | FILESIZE"),
            Step::out("--------------------------------------"),
            Step::out("140 m4a  audio only     |  3.1MiB"),
            Step::out("22  mp4  1280x720   30  |  40MiB"),
            Step::exit(0),
        ],
    );
    let (downloader, _temp_dir) = create_test_downloader(launcher).await;

    let uri = format!("/api/formats?url={}", urlencoding::encode(URL));
    let response = send(router_for(&downloader), get(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let formats = json_body(response).await;
    assert_eq!(formats["all_formats"].as_array().unwrap().len(), 2);
    assert_eq!(formats["audio_formats"][0]["format_code"], "140");
    assert_eq!(formats["video_formats"][0]["format_code"], "22");
}

#[tokio::test]
async fn test_quality_presets_route() {
    let (downloader, _temp_dir) = create_test_downloader(ScriptedLauncher::new()).await;

    let response = send(router_for(&downloader), get("/api/formats/quality-presets")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let presets = json_body(response).await;
    assert_eq!(presets["video"][0]["value"], "2160");
    assert!(
        presets["audio"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["value"] == "mp3")
    );
}
