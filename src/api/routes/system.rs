//! System handlers: health, OpenAPI, events.

use super::EventStreamQuery;
use crate::api::AppState;
use crate::events::SubscriptionError;
use crate::types::Event;
use axum::{
    Json,
    extract::{Query, State},
    response::{
        IntoResponse,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use serde_json::json;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Events buffered between the forwarding task and the HTTP response
const SSE_BUFFER: usize = 64;

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "accepting_downloads": state.downloader.is_accepting(),
    }))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/api/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

/// GET /events - Server-sent events stream
///
/// Each download transition is sent as an SSE event named `download-start`,
/// `download-progress`, `download-complete` or `download-error` whose data is
/// the full state snapshot. A client that falls too far behind receives one
/// `error` event and the stream ends.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "system",
    params(EventStreamQuery),
    responses(
        (status = 200, description = "Server-sent events stream (text/event-stream)")
    )
)]
pub async fn event_stream(
    State(state): State<AppState>,
    Query(query): Query<EventStreamQuery>,
) -> Sse<ReceiverStream<Result<SseEvent, Infallible>>> {
    let mut subscription = state.downloader.subscribe();
    let (tx, rx) = mpsc::channel(SSE_BUFFER);

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                received = subscription.recv() => received,
                _ = tx.closed() => break,
            };

            let sse = match received {
                Ok(event) => {
                    if let Some(wanted) = query.download_id
                        && event.download_id().is_some_and(|id| id.0 != wanted)
                    {
                        continue;
                    }
                    match to_sse_event(&event) {
                        Some(sse) => sse,
                        None => continue,
                    }
                }
                Err(SubscriptionError::Overloaded { skipped }) => {
                    tracing::warn!(skipped, "SSE client lagged, disconnecting");
                    let data = json!({ "error": "lagged", "skipped": skipped }).to_string();
                    tx.send(Ok(SseEvent::default().event("error").data(data)))
                        .await
                        .ok();
                    break;
                }
                Err(SubscriptionError::Closed) => break,
            };

            if tx.send(Ok(sse)).await.is_err() {
                break;
            }
        }
        tracing::debug!("SSE client disconnected");
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default())
}

/// SSE frame for an event; the data is the bare state snapshot
fn to_sse_event(event: &Event) -> Option<SseEvent> {
    let data = match event.state() {
        Some(state) => serde_json::to_string(state),
        None => Ok("{}".to_string()),
    };

    match data {
        Ok(data) => Some(SseEvent::default().event(event.name()).data(data)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize event to JSON");
            None
        }
    }
}
