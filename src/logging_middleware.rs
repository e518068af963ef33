// src/logging_middleware.rs
//! Debug-level request/response body logging.
//!
//! Auth endpoints are exempt: their bodies carry sign-in tokens and raw
//! email addresses, which must never land in log output.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Bodies larger than this are summarized rather than logged (scrape
/// responses can carry sizeable description text)
const MAX_LOGGED_BODY: usize = 8 * 1024;

fn is_sensitive_path(path: &str) -> bool {
    path.starts_with("/api/auth/")
}

fn log_body(label: &'static str, prefix: &str, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    if bytes.len() > MAX_LOGGED_BODY {
        debug!("{} {} body: {} bytes (truncated from log)", label, prefix, bytes.len());
        return;
    }
    if let Ok(body_str) = std::str::from_utf8(bytes) {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(body_str) {
            debug!(
                body = %serde_json::to_string_pretty(&json).unwrap_or_else(|_| body_str.to_string()),
                "{} {}", label, prefix
            );
        } else {
            debug!(body = %body_str, "{} {}", label, prefix);
        }
    }
}

pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();
    let sensitive = is_sensitive_path(parts.uri.path());
    let route = format!("{} {}", parts.method, parts.uri);

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !sensitive {
        log_body("📥", &route, &bytes);
    } else if !bytes.is_empty() {
        debug!("📥 {} body: {} bytes (auth, redacted)", route, bytes.len());
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !sensitive {
        log_body("📤", &format!("{} <- {}", parts.status, route), &bytes);
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_paths_are_redacted() {
        assert!(is_sensitive_path("/api/auth/signin-link"));
        assert!(is_sensitive_path("/api/auth/google"));
        assert!(!is_sensitive_path("/api/wishlists"));
        assert!(!is_sensitive_path("/api/scrape"));
    }
}
