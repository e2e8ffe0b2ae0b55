//! Admin Authentication
//!
//! Bearer-token guard for the listing and deletion endpoints.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::api::AppState;
use crate::api::error::ApiError;

/// Extractor that succeeds only for requests carrying the admin bearer token
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let Some(expected) = state.admin_token.as_deref() else {
            return Err(ApiError::Unauthorized);
        };

        let provided = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        match provided {
            Some(token) if token_matches(token, expected) => Ok(RequireAdmin),
            _ => {
                tracing::warn!("Rejected admin request to {}", parts.uri.path());
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Compare without short-circuiting on the first differing byte
fn token_matches(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
