//! Path-based redirect layer
//!
//! Runs before any handler. Visitors without a session are sent to the login
//! page from private pages; signed-in users are sent to their notes from the
//! public-only pages. This is a coarse check only: per-note ownership is
//! enforced by the access controller.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::extract::CurrentSession;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";
pub const NOTES_PATH: &str = "/notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteCategory {
    /// Landing, login and registration pages
    PublicOnly,
    /// The notes list and the new-note page
    Private,
    /// A single note's page
    NoteDetail,
    Unguarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToNotes,
}

impl Decision {
    /// Redirect target, if any
    pub fn location(self) -> Option<&'static str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectToLogin => Some(LOGIN_PATH),
            Decision::RedirectToNotes => Some(NOTES_PATH),
        }
    }
}

/// Classify a request path. A trailing slash is ignored.
pub fn classify(path: &str) -> RouteCategory {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    match path {
        "/" | "/login" | "/register" => RouteCategory::PublicOnly,
        "/notes" | "/notes/new" => RouteCategory::Private,
        _ if path.starts_with("/notes/") => RouteCategory::NoteDetail,
        _ => RouteCategory::Unguarded,
    }
}

pub fn decide(authenticated: bool, path: &str) -> Decision {
    match (classify(path), authenticated) {
        (RouteCategory::Private | RouteCategory::NoteDetail, false) => Decision::RedirectToLogin,
        (RouteCategory::PublicOnly, true) => Decision::RedirectToNotes,
        _ => Decision::Allow,
    }
}

/// Apply the guard to every request. The resolved session is stashed in the
/// request extensions so handlers don't verify the token twice.
pub async fn route_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let session = state.auth.resolve_session(req.headers());
    let decision = decide(session.is_some(), req.uri().path());

    if let Some(location) = decision.location() {
        debug!("Redirecting {} to {}", req.uri().path(), location);
        return Redirect::temporary(location).into_response();
    }

    req.extensions_mut().insert(CurrentSession(session));
    next.run(req).await
}
