use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{errors::ApiError, AppState};

/// Marker extractor proving the caller presented the admin bearer token.
///
/// The authentication model is a single boolean gate: every write endpoint
/// requires the configured token, reads are public. There is no role or
/// permission granularity.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAdmin;

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            Some(token) if token_matches(token, &state.config.admin_token) => {
                Ok(AuthenticatedAdmin)
            }
            _ => Err(ApiError::Unauthorized),
        }
    }
}

/// Extracts the bearer token from the Authorization header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Constant-time token comparison; the timing of a failed check must not
/// reveal how much of the token matched.
fn token_matches(candidate: &str, expected: &str) -> bool {
    let candidate = candidate.as_bytes();
    let expected = expected.as_bytes();
    if candidate.len() != expected.len() {
        return false;
    }
    candidate
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn extracts_bearer_token() {
        let parts = parts_with_auth(Some("Bearer secret-token"));
        assert_eq!(bearer_token(&parts), Some("secret-token"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Bearer   "))), None);
    }

    #[test]
    fn token_comparison_requires_exact_match() {
        assert!(token_matches("secret-token", "secret-token"));
        assert!(!token_matches("secret-токен", "secret-token"));
        assert!(!token_matches("secret-toke", "secret-token"));
        assert!(!token_matches("", "secret-token"));
    }
}
