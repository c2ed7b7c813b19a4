use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};

/// Guards the administrative routes. The key may be sent as
/// `X-Api-Key: <key>` or `Authorization: Bearer <key>`.
///
/// With no key configured the routes are disabled and answer 403.
pub async fn admin_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config().server.admin_api_key.as_deref() else {
        return Err(ApiError::Forbidden(
            "Administrative endpoints are disabled".to_string(),
        ));
    };

    match extract_api_key(&headers) {
        Some(key) if keys_match(&key, expected) => {
            tracing::Span::current().record("user_id", "admin");
            Ok(next.run(request).await)
        }
        _ => Err(ApiError::Unauthorized(
            "Invalid or missing API key".to_string(),
        )),
    }
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

/// Compares without short-circuiting on the first differing byte.
fn keys_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Api-Key", HeaderValue::from_static("secret"));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("secret"));
    }

    #[test]
    fn test_extract_api_key_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer  secret "));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("secret"));

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_api_key(&headers).is_none());
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match("secret", "secret"));
        assert!(!keys_match("secreT", "secret"));
        assert!(!keys_match("secret1", "secret"));
        assert!(!keys_match("", "secret"));
    }
}
