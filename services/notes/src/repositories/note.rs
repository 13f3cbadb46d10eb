//! Note repository for database operations

use async_trait::async_trait;
use common::error::DatabaseResult;
use sqlx::PgPool;
use uuid::Uuid;

use super::NoteStore;
use crate::models::{NewNote, Note, NoteChanges};

/// Note repository for database operations
#[derive(Clone)]
pub struct NoteRepository {
    pool: PgPool,
}

impl NoteRepository {
    /// Create a new note repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for NoteRepository {
    async fn create(&self, new_note: &NewNote) -> DatabaseResult<Note> {
        // Both timestamps default to NOW(), which is fixed for the statement.
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (id, owner_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, owner_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_note.owner_id)
        .bind(&new_note.title)
        .bind(&new_note.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(note)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, owner_id, created_at, updated_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> DatabaseResult<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, owner_id, created_at, updated_at
            FROM notes
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &NoteChanges,
    ) -> DatabaseResult<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes
            SET title = $3, content = $4, updated_at = GREATEST(NOW(), created_at)
            WHERE id = $1 AND owner_id = $2
            RETURNING id, title, content, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&changes.title)
        .bind(&changes.content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
