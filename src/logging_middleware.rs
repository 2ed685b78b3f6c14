// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{
    body::Body, extract::Request, http::header, http::StatusCode, middleware::Next,
    response::Response,
};
use tracing::debug;

const MAX_LOGGED_BODY: usize = 4096;

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

fn log_body(label: &str, context: &str, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    if let Ok(body_str) = std::str::from_utf8(bytes) {
        let preview: String = body_str.chars().take(MAX_LOGGED_BODY).collect();
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&preview) {
            debug!(
                context = %context,
                body = %serde_json::to_string_pretty(&json).unwrap_or(preview),
                "{}", label
            );
        } else {
            debug!(context = %context, body = %preview, "{}", label);
        }
    }
}

/// Log request and response bodies in debug mode
///
/// Multipart upload bodies are passed through untouched; buffering a
/// multi-megabyte document just to log it is pointless and the bytes are not
/// text anyway.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if is_multipart(&request) {
        let context = format!("{} {}", request.method(), request.uri());
        debug!(context = %context, "Multipart request (body not logged)");
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let context = format!("{} {}", parts.method, parts.uri);
    log_body("Request", &context, &bytes);

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let context = parts.status.to_string();
    log_body("Response", &context, &bytes);

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
