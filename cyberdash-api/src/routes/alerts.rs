//! Live alert stream
//!
//! `GET /api/alerts` holds a Server-Sent Events connection open and forwards
//! every [`AlertEvent`] published on the hub as one `data:` line. Events
//! missed while the client lagged are skipped.

use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::get,
    Router,
};
use cyberdash_core::AlertEvent;
use std::convert::Infallible;
use tokio::sync::broadcast;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{events::AlertHub, state::AppState};

/// Turn a hub subscription into SSE frames, dropping lag notifications.
pub fn alert_stream(
    rx: broadcast::Receiver<AlertEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(to_sse(&event))),
        Err(err) => {
            tracing::debug!(error = %err, "Alert subscriber lagged");
            None
        }
    })
}

fn to_sse(event: &AlertEvent) -> Event {
    // AlertEvent is plain data; serialization cannot fail.
    Event::default().data(serde_json::to_string(event).unwrap_or_default())
}

/// GET /api/alerts - Subscribe to live alert events
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/alerts",
    tag = "Alerts",
    responses(
        (status = 200, description = "text/event-stream of AlertEvent payloads", body = AlertEvent, content_type = "text/event-stream"),
    ),
))]
pub async fn stream_alerts(State(hub): State<AlertHub>) -> impl IntoResponse {
    tracing::info!(subscribers = hub.subscriber_count() + 1, "Alert stream opened");
    let sse = Sse::new(alert_stream(hub.subscribe())).keep_alive(KeepAlive::default());
    ([(header::CACHE_CONTROL, "no-cache")], sse)
}

/// Create the alert stream router.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(stream_alerts))
}
