//! Optional API key authentication
//!
//! When `ApiConfig::api_key` is set, every request must carry the same value in
//! the `X-Api-Key` header or it is answered with 401.

use crate::error::ApiError;
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware rejecting requests without the configured `X-Api-Key`
///
/// With `None` as state every request passes through.
///
/// ```no_run
/// use axum::{Router, middleware};
/// use media_dl::api::auth::require_api_key;
///
/// let router: Router = Router::new().layer(middleware::from_fn_with_state(
///     Some("secret".to_string()),
///     require_api_key,
/// ));
/// ```
pub async fn require_api_key(
    State(expected): State<Option<String>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if constant_time_eq(key.as_bytes(), expected.as_bytes()) => {
            next.run(request).await
        }
        Some(_) => {
            tracing::debug!(path = %request.uri().path(), "rejected request with wrong API key");
            unauthorized("Invalid API key")
        }
        None => unauthorized("Missing X-Api-Key header"),
    }
}

/// Compares every byte so timing does not reveal the first mismatch
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiError::unauthorized(message))).into_response()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, middleware, routing::get};
    use tower::ServiceExt;

    fn app(key: Option<&str>) -> Router {
        Router::new()
            .route("/api/health", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                key.map(str::to_string),
                require_api_key,
            ))
    }

    async fn call(key: Option<&str>, header: Option<(&str, &str)>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/api/health");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        let response = app(key)
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_open_when_no_key_configured() {
        let (status, _) = call(None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_matching_key_passes() {
        let (status, body) = call(Some("s3cret"), Some(("X-Api-Key", "s3cret"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_header_name_is_case_insensitive() {
        let (status, _) = call(Some("s3cret"), Some(("x-API-key", "s3cret"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_key_rejected() {
        let (status, body) = call(Some("s3cret"), Some(("X-Api-Key", "S3CRET"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let error: ApiError = serde_json::from_str(&body).unwrap();
        assert_eq!(error.error.code, "unauthorized");
        assert_eq!(error.error.message, "Invalid API key");
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let (status, body) = call(Some("s3cret"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Missing X-Api-Key header"));
    }

    #[tokio::test]
    async fn test_key_is_not_trimmed() {
        let (status, _) = call(Some("s3cret "), Some(("X-Api-Key", "s3cret"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
