//! HTTP routes
//!
//! The JSON API lives under `/api` so that page paths stay free for the route
//! guard. Anything that matches no route gets a JSON 404.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentSession;
use crate::guard::route_guard;
use crate::models::{
    AuthenticatedUser, LoginRequest, NotePayload, RegisterRequest, RequestResetRequest,
    ResetPasswordRequest, UserResponse, ValidateResetTokenRequest,
};
use crate::reset::ResetTokenStatus;
use crate::state::AppState;

/// Body of every request-reset response, whether or not the account exists
pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";

/// Response for user login
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: AuthenticatedUser,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Create the router for the notes service
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
        .route("/auth/validate-reset-token", post(validate_reset_token))
        .route("/auth/request-reset", post(request_reset))
        .route("/auth/reset-password", post(reset_password))
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "notes-service"
    }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let user = state.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": UserResponse::from(&user),
        })),
    ))
}

/// User login endpoint. The token is set as the session cookie and also
/// returned for bearer clients.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let Json(request) = payload?;
    let user = state
        .auth
        .authenticate(&request.email, &request.password)
        .await?;

    let token = state.auth.issue_session(&user)?;
    let sessions = state.auth.sessions();
    let cookie = sessions.session_cookie(&token)?;

    let response = LoginResponse {
        user,
        token,
        token_type: "Bearer".to_string(),
        expires_in: sessions.ttl_seconds(),
    };

    Ok((jar.add(cookie), Json(response)))
}

/// Logout endpoint. Sessions are stateless, so this only expires the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(state.auth.sessions().removal_cookie());
    (jar, Json(json!({ "message": "Logged out successfully" })))
}

pub async fn current_session(session: CurrentSession) -> ApiResult<impl IntoResponse> {
    Ok(Json(session.require()?))
}

pub async fn validate_reset_token(
    State(state): State<AppState>,
    payload: Result<Json<ValidateResetTokenRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    if request.token.trim().is_empty() {
        return Err(ApiError::Validation("Token is required".to_string()));
    }

    match state.resets.validate_token(&request.token).await? {
        ResetTokenStatus::Valid => Ok(Json(json!({ "message": "Token is valid" }))),
        ResetTokenStatus::Invalid => Err(ApiError::InvalidToken),
    }
}

/// Always answers the same way so the response can't be used to test for
/// registered emails.
pub async fn request_reset(
    State(state): State<AppState>,
    payload: Result<Json<RequestResetRequest>, JsonRejection>,
) -> impl IntoResponse {
    if let Ok(Json(request)) = payload {
        if let Err(e) = state.resets.request_reset(&request.email).await {
            error!("Reset request failed: {}", e);
        }
    }

    Json(json!({ "message": RESET_REQUESTED_MESSAGE }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    state
        .resets
        .consume_reset(&request.token, &request.password)
        .await?;

    Ok(Json(json!({ "message": "Password has been reset successfully" })))
}

pub async fn list_notes(
    State(state): State<AppState>,
    session: CurrentSession,
) -> ApiResult<impl IntoResponse> {
    let notes = state.notes.list(session.identity()).await?;
    Ok(Json(notes))
}

pub async fn create_note(
    State(state): State<AppState>,
    session: CurrentSession,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    // An anonymous caller gets 401 even with a broken body.
    let session = session.require()?;
    let Json(payload) = payload?;
    let note = state.notes.create(Some(&session), payload).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_note(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let note = state.notes.get(session.identity(), &id).await?;
    Ok(Json(note))
}

pub async fn update_note(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
    payload: Result<Json<NotePayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let session = session.require()?;
    let Json(payload) = payload?;
    let note = state.notes.update(Some(&session), &id, payload).await?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.notes.delete(session.identity(), &id).await?;
    Ok(Json(json!({ "message": "Note deleted successfully" })))
}
