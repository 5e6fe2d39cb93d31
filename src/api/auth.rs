//! Caller identity.
//!
//! Sessions are handled in front of this service; the session layer forwards
//! the authenticated user id in the `x-user-id` header.

use axum::{extract::FromRequestParts, http::StatusCode, http::request::Parts};

use super::envelope::ApiFailure;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf the request runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CurrentUser(v.to_string()))
            .ok_or_else(|| {
                ApiFailure::new(
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    format!("Missing {} header", USER_ID_HEADER),
                )
            })
    }
}
