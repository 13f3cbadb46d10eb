//! Repositories for database operations
//!
//! Handlers talk to the stores through the [`UserStore`] and [`NoteStore`]
//! traits. `user` and `note` hold the PostgreSQL implementations, `memory` an
//! in-process one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{NewNote, NewUser, Note, NoteChanges, User};

pub mod memory;
pub mod note;
pub mod user;

pub use memory::{MemoryNoteStore, MemoryUserStore};
pub use note::NoteRepository;
pub use user::UserRepository;

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A duplicate email yields `DatabaseError::UniqueViolation`.
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;

    /// Look a user up by (normalised) email
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Store a reset token on the user owning `email`, replacing any previous
    /// one. Returns the user, or `None` when no account matches.
    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>>;

    /// Find the user whose reset token equals `token` and expires after `now`
    async fn find_by_valid_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>>;

    /// Atomically replace the password hash and clear the reset token, but
    /// only while the token is still valid at `now`.
    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>>;
}

/// Note store
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a note; `created_at` and `updated_at` are set to the same instant
    async fn create(&self, new_note: &NewNote) -> DatabaseResult<Note>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Note>>;

    /// Every note owned by `owner_id`, newest creation first
    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<Note>>;

    /// Replace title and content of a note owned by `owner_id`, refreshing
    /// `updated_at`. `None` when no such note exists.
    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &NoteChanges,
    ) -> DatabaseResult<Option<Note>>;

    /// Delete a note owned by `owner_id`; false when nothing was deleted
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> DatabaseResult<bool>;
}
