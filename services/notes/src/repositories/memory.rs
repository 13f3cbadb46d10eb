//! In-process stores
//!
//! Same contracts as the PostgreSQL repositories, backed by maps behind a
//! `tokio::sync::RwLock`. Used by the test suites and for running the router
//! without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NoteStore, UserStore};
use crate::models::{NewNote, NewUser, Note, NoteChanges, User};

/// In-memory credential store
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.values_mut().find(|u| u.email == email) else {
            return Ok(None);
        };

        user.reset_token = Some(token.to_string());
        user.reset_token_expires_at = Some(expires_at);
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn find_by_valid_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| reset_token_matches(u, token, now))
            .cloned())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users
            .values_mut()
            .find(|u| reset_token_matches(u, token, now))
        else {
            return Ok(None);
        };

        user.password_hash = password_hash.to_string();
        user.reset_token = None;
        user.reset_token_expires_at = None;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

fn reset_token_matches(user: &User, token: &str, now: DateTime<Utc>) -> bool {
    user.reset_token.as_deref() == Some(token)
        && user.reset_token_expires_at.is_some_and(|expires| expires > now)
}

#[derive(Debug, Clone)]
struct StoredNote {
    seq: u64,
    note: Note,
}

#[derive(Default)]
struct NoteTable {
    next_seq: u64,
    rows: HashMap<Uuid, StoredNote>,
}

/// In-memory note store
#[derive(Clone, Default)]
pub struct MemoryNoteStore {
    table: Arc<RwLock<NoteTable>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn create(&self, new_note: &NewNote) -> DatabaseResult<Note> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: new_note.title.clone(),
            content: new_note.content.clone(),
            owner_id: new_note.owner_id,
            created_at: now,
            updated_at: now,
        };

        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(
            note.id,
            StoredNote {
                seq,
                note: note.clone(),
            },
        );
        Ok(note)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Note>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).map(|stored| stored.note.clone()))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<Note>> {
        let table = self.table.read().await;
        let mut owned: Vec<&StoredNote> = table
            .rows
            .values()
            .filter(|stored| stored.note.owner_id == owner_id)
            .collect();

        // Insertion order breaks ties between equal timestamps.
        owned.sort_by(|a, b| {
            b.note
                .created_at
                .cmp(&a.note.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(owned.into_iter().map(|stored| stored.note.clone()).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &NoteChanges,
    ) -> DatabaseResult<Option<Note>> {
        let mut table = self.table.write().await;
        let Some(stored) = table
            .rows
            .get_mut(&id)
            .filter(|stored| stored.note.owner_id == owner_id)
        else {
            return Ok(None);
        };

        stored.note.title = changes.title.clone();
        stored.note.content = changes.content.clone();
        stored.note.updated_at = Utc::now().max(stored.note.created_at);
        Ok(Some(stored.note.clone()))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> DatabaseResult<bool> {
        let mut table = self.table.write().await;
        let owned = table
            .rows
            .get(&id)
            .is_some_and(|stored| stored.note.owner_id == owner_id);
        if owned {
            table.rows.remove(&id);
        }
        Ok(owned)
    }
}
