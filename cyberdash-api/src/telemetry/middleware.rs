//! Axum Middleware for HTTP Request Tracing
//!
//! Wraps every request in an `http_request` span and logs its outcome.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info_span, Instrument};

/// Normalize a path for spans (replace ids with a placeholder).
///
/// Numeric segments and UUID-shaped segments become `{id}`.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| if is_id(segment) { "{id}" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_id(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    if segment.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    segment.len() == 36
        && segment.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

/// Observability middleware for Axum.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let status = response.status();
    let duration = start.elapsed();

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %normalized_path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %normalized_path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric_id() {
        assert_eq!(normalize_path("/api/agents/12345"), "/api/agents/{id}");
    }

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/things/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/things/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/agents"), "/api/agents");
        assert_eq!(normalize_path("/api/agents/live"), "/api/agents/live");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }

    #[test]
    fn test_normalize_path_trailing_slash() {
        assert_eq!(normalize_path("/api/agents/7/"), "/api/agents/{id}/");
    }
}
