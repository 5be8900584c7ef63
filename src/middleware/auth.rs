use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer-token gate for the protected routes. Resolves the token to a full
/// user record and attaches it to the request for downstream handlers.
///
/// Failure modes, in order: missing/malformed header (401), bad signature or
/// expired token (403), token valid but user gone (404). Exactly one user
/// lookup per request, re-verified every time.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).ok_or_else(|| {
        ApiError::unauthorized("Unauthorized - No token provided")
    })?;

    let claims = state
        .sessions
        .verify_access(token)
        .map_err(|_| ApiError::forbidden("Forbidden - Invalid token"))?;

    let user = state
        .users
        .find_by_id(claims.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_a_bearer_token() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_header() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        assert_eq!(extract_bearer(&headers_with("Basic dXNlcjpwdw==")), None);
    }

    #[test]
    fn rejects_empty_token() {
        assert_eq!(extract_bearer(&headers_with("Bearer ")), None);
    }
}
