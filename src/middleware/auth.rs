use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::AuthContext;
use crate::handlers::AppState;

/// Resolves the caller's identity once per request and injects it as an
/// extension. Missing or invalid tokens become the anonymous context rather
/// than a rejection: each operation decides for itself which roles it needs.
pub async fn resolve_auth_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = bearer_token(request.headers())
        .and_then(|token| state.verifier.decode(token))
        .map(AuthContext::from_claims)
        .unwrap_or_else(AuthContext::anonymous);

    request.extensions_mut().insert(auth);
    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
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

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(v) = value {
            h.insert("authorization", HeaderValue::from_str(v).unwrap());
        }
        h
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers(Some("Bearer abc.def.ghi"))), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_header() {
        assert_eq!(bearer_token(&headers(None)), None);
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        assert_eq!(bearer_token(&headers(Some("Basic dXNlcg=="))), None);
    }

    #[test]
    fn rejects_empty_token() {
        assert_eq!(bearer_token(&headers(Some("Bearer "))), None);
    }
}
