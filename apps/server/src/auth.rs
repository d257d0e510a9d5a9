//! # Acting User
//!
//! Login happens in the front end, which forwards the user id on every
//! request in the `X-User-ID` header.
//!
//! ```text
//! X-User-ID: 7
//!      │
//!      ▼
//! missing / not a number / no such user ──► 401
//! user.is_active == false                ──► 403
//!      │
//!      ▼
//! CurrentUser(User)
//! ```

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use caja_core::User;

use crate::error::ApiError;
use crate::startup::AppState;

pub const USER_ID_HEADER: &str = "X-User-ID";

/// The active user making the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id: i64 = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing or invalid X-User-ID header"))?;

        let user = state
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized(format!("Unknown user: {}", user_id)))?;

        if !user.is_active {
            return Err(ApiError::forbidden(format!("User {} is inactive", user.username)));
        }

        tracing::Span::current().record("user_id", user.id);
        Ok(CurrentUser(user))
    }
}
