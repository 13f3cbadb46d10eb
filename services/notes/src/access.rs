//! Ownership-checked note operations
//!
//! Every operation takes the caller's session (if any) and runs the checks in
//! a fixed order: authentication, input validation, existence, ownership.
//! Writes are additionally conditioned on the owner at the store, so a note
//! that changes hands or disappears between the check and the write is never
//! touched.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{NewNote, Note, NoteChanges, NotePayload, SessionIdentity};
use crate::repositories::NoteStore;
use crate::validation::validate_note;

#[derive(Clone)]
pub struct NoteAccessController {
    notes: Arc<dyn NoteStore>,
}

impl NoteAccessController {
    pub fn new(notes: Arc<dyn NoteStore>) -> Self {
        Self { notes }
    }

    /// The caller's notes, newest first
    pub async fn list(&self, session: Option<&SessionIdentity>) -> ApiResult<Vec<Note>> {
        let session = require_session(session)?;
        let notes = self.notes.list_by_owner(session.id).await?;
        debug!("Listed {} notes for user {}", notes.len(), session.id);
        Ok(notes)
    }

    /// Create a note owned by the caller. Title and content are stored trimmed.
    pub async fn create(
        &self,
        session: Option<&SessionIdentity>,
        payload: NotePayload,
    ) -> ApiResult<Note> {
        let session = require_session(session)?;
        validate_note(&payload)?;

        let note = self
            .notes
            .create(&NewNote {
                owner_id: session.id,
                title: payload.title.trim().to_string(),
                content: payload.content.trim().to_string(),
            })
            .await?;

        info!("User {} created note {}", session.id, note.id);
        Ok(note)
    }

    pub async fn get(&self, session: Option<&SessionIdentity>, id: &str) -> ApiResult<Note> {
        let session = require_session(session)?;
        self.load_owned(session, id).await
    }

    /// Replace the title and content of one of the caller's notes
    pub async fn update(
        &self,
        session: Option<&SessionIdentity>,
        id: &str,
        payload: NotePayload,
    ) -> ApiResult<Note> {
        let session = require_session(session)?;
        validate_note(&payload)?;
        let note = self.load_owned(session, id).await?;

        let changes = NoteChanges {
            title: payload.title.trim().to_string(),
            content: payload.content.trim().to_string(),
        };
        let updated = self
            .notes
            .update(note.id, session.id, &changes)
            .await?
            .ok_or(ApiError::NotFound("Note"))?;

        info!("User {} updated note {}", session.id, updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, session: Option<&SessionIdentity>, id: &str) -> ApiResult<()> {
        let session = require_session(session)?;
        let note = self.load_owned(session, id).await?;

        if !self.notes.delete(note.id, session.id).await? {
            return Err(ApiError::NotFound("Note"));
        }

        info!("User {} deleted note {}", session.id, note.id);
        Ok(())
    }

    /// Look a note up by its raw id and check the caller owns it. Ids that
    /// don't parse can't exist, so they are reported as missing.
    async fn load_owned(&self, session: &SessionIdentity, id: &str) -> ApiResult<Note> {
        let id = Uuid::parse_str(id).map_err(|_| ApiError::NotFound("Note"))?;
        let note = self
            .notes
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Note"))?;

        if note.owner_id != session.id {
            warn!("User {} denied access to note {}", session.id, note.id);
            return Err(ApiError::Forbidden);
        }

        Ok(note)
    }
}

fn require_session(session: Option<&SessionIdentity>) -> ApiResult<&SessionIdentity> {
    session.ok_or(ApiError::Unauthorized)
}
