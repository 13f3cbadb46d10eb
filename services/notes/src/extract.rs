//! Request extractors

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{ApiError, ApiResult};
use crate::models::SessionIdentity;
use crate::state::AppState;

/// The caller's session, if the request carries a valid token. Handlers that
/// need a signed-in user pass it on to the access controller, which answers
/// 401 when it is empty.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<SessionIdentity>);

impl CurrentSession {
    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.0.as_ref()
    }

    pub fn require(self) -> ApiResult<SessionIdentity> {
        self.0.ok_or(ApiError::Unauthorized)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by the route guard
        if let Some(session) = parts.extensions.get::<CurrentSession>() {
            return Ok(session.clone());
        }

        Ok(CurrentSession(state.auth.resolve_session(&parts.headers)))
    }
}
