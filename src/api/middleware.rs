/// Shared request-header helpers
use axum::http::HeaderMap;

/// Extract the bearer token from the Authorization header.
///
/// Requires the exact `Bearer ` scheme prefix followed by a non-empty token;
/// anything else is treated as no credential at all.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}
