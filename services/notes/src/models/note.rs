//! Note model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Note entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New note creation payload
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
}

/// Full replacement of a note's editable fields
#[derive(Debug, Clone)]
pub struct NoteChanges {
    pub title: String,
    pub content: String,
}

/// Request body for creating or replacing a note
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotePayload {
    pub title: String,
    pub content: String,
}
