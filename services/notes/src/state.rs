//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::access::NoteAccessController;
use crate::auth::AuthService;
use crate::error::{ApiError, ApiResult};
use crate::password::PasswordHasher;
use crate::repositories::{
    MemoryNoteStore, MemoryUserStore, NoteRepository, NoteStore, UserRepository, UserStore,
};
use crate::reset::{LogNotifier, PasswordResetService, ResetNotifier};
use crate::session::SessionService;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub resets: PasswordResetService,
    pub notes: NoteAccessController,
}

impl AppState {
    /// Wire the services over the given stores. Settings that would not
    /// survive a request (such as out-of-range lifetimes) are refused here.
    pub fn new(
        settings: &Settings,
        users: Arc<dyn UserStore>,
        notes: Arc<dyn NoteStore>,
        notifier: Arc<dyn ResetNotifier>,
    ) -> ApiResult<Self> {
        settings
            .validate()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let hasher = PasswordHasher::new(settings.password_memory_kib, settings.password_iterations)?;
        let sessions = SessionService::from_settings(settings);

        Ok(Self {
            auth: AuthService::new(users.clone(), hasher.clone(), sessions),
            resets: PasswordResetService::new(users, hasher, notifier, settings.reset_token_ttl()),
            notes: NoteAccessController::new(notes),
        })
    }

    /// PostgreSQL-backed state; reset links go to the log
    pub fn with_postgres(settings: &Settings, pool: PgPool) -> ApiResult<Self> {
        Self::new(
            settings,
            Arc::new(UserRepository::new(pool.clone())),
            Arc::new(NoteRepository::new(pool)),
            Arc::new(LogNotifier::new(settings.public_base_url.clone())),
        )
    }

    /// State over in-memory stores
    pub fn in_memory(settings: &Settings, notifier: Arc<dyn ResetNotifier>) -> ApiResult<Self> {
        Self::new(
            settings,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryNoteStore::new()),
            notifier,
        )
    }
}
