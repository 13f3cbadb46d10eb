//! Registration, credential checks and session issuance

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult, AuthFailure};
use crate::models::{AuthenticatedUser, NewUser, RegisterRequest, SessionIdentity, User};
use crate::password::PasswordHasher;
use crate::repositories::UserStore;
use crate::session::SessionService;
use crate::validation::{normalize_email, validate_registration};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    sessions: SessionService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, sessions: SessionService) -> Self {
        Self {
            users,
            hasher,
            sessions,
        }
    }

    /// Create an account. The returned user carries the password hash, so map
    /// it through `UserResponse` before it leaves the service.
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<User> {
        validate_registration(&request)?;
        let email = normalize_email(&request.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.hasher.hash(request.password).await?;
        let new_user = NewUser {
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email,
            password_hash,
        };

        // Two concurrent registrations can both pass the lookup above; the
        // unique constraint decides.
        let user = self.users.create(&new_user).await.map_err(|e| {
            if e.is_unique_violation() {
                ApiError::Conflict("User already exists".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Check an email/password pair. Missing credentials fail the same way
    /// as unknown ones.
    pub async fn authenticate(&self, email: &str, password: &str) -> ApiResult<AuthenticatedUser> {
        if email.trim().is_empty() || password.is_empty() {
            warn!("Login rejected: missing credentials");
            return Err(ApiError::Auth(AuthFailure::UserNotFound));
        }

        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            // Same Argon2 cost as a known account with a wrong password.
            self.hasher.verify_decoy(password.to_string()).await?;
            warn!("Login rejected: {}", AuthFailure::UserNotFound);
            return Err(ApiError::Auth(AuthFailure::UserNotFound));
        };

        let valid = self
            .hasher
            .verify(password.to_string(), user.password_hash.clone())
            .await?;
        if !valid {
            warn!("Login rejected for user {}: {}", user.id, AuthFailure::InvalidPassword);
            return Err(ApiError::Auth(AuthFailure::InvalidPassword));
        }

        info!("User {} authenticated", user.id);
        Ok(AuthenticatedUser::from(&user))
    }

    /// Sign a session token for an authenticated user
    pub fn issue_session(&self, user: &AuthenticatedUser) -> ApiResult<String> {
        self.sessions.issue(&SessionIdentity::from(user))
    }

    /// The identity attached to a request, if its token verifies
    pub fn resolve_session(&self, headers: &HeaderMap) -> Option<SessionIdentity> {
        self.sessions.resolve(headers)
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }
}
