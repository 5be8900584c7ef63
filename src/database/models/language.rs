use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// A user-owned topic container. The row is the unit of atomicity: the
/// embedded note array is read, mutated in memory, and written back whole.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Language {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Owning user. Nullable because legacy rows predate ownership.
    #[serde(rename = "createdBy")]
    pub created_by: Option<Uuid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub notes: Json<Vec<Note>>,
}

/// `{id, name}` projection used by the list endpoint.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LanguageSummary {
    pub id: Uuid,
    pub name: String,
}

/// A titled unit of content embedded in a Language. Notes have no storage
/// identity of their own, only a position in the parent's ordered array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "noteDetail")]
    pub note_detail: Vec<NoteDetail>,
    /// Creator attribution, copied at creation time and never refreshed.
    #[serde(rename = "createdBy")]
    pub created_by: NoteCreator,
    pub last_edited: DateTime<Utc>,
}

/// Denormalized creator attribution stored on each note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteCreator {
    pub id: Uuid,
    #[serde(rename = "firstName")]
    pub first_name: String,
}

/// One content block of a note, discriminated by its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NoteDetail {
    Text {
        /// Syntax-highlight hint for the block, e.g. "javascript".
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        content: String,
    },
    Img {
        /// Encoded image payload. Opaque at this layer.
        content: String,
    },
}

/// Wire shape of an incoming detail block, before validation. Kept loose so
/// a bad `type` tag produces a 400 rather than a body-rejection error.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteDetailInput {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub language: Option<String>,
    pub content: Option<Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum DetailError {
    #[error("note detail type must be \"text\" or \"img\"")]
    UnknownType,
    #[error("note detail content is required")]
    MissingContent,
}

impl NoteDetailInput {
    /// Validate one incoming block into its typed variant.
    pub fn into_detail(self) -> Result<NoteDetail, DetailError> {
        let content = match self.content {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => return Err(DetailError::MissingContent),
            // Tolerate non-string payloads the way the legacy store did:
            // keep them as their JSON text.
            Some(other) => other.to_string(),
        };

        match self.kind.as_deref() {
            Some("text") => Ok(NoteDetail::Text { language: self.language, content }),
            Some("img") => Ok(NoteDetail::Img { content }),
            _ => Err(DetailError::UnknownType),
        }
    }
}

/// Validate a full inbound detail array.
pub fn validate_details(inputs: Vec<NoteDetailInput>) -> Result<Vec<NoteDetail>, DetailError> {
    inputs.into_iter().map(NoteDetailInput::into_detail).collect()
}

impl Language {
    pub fn notes(&self) -> &[Note] {
        &self.notes.0
    }

    pub fn find_note(&self, note_id: Uuid) -> Option<&Note> {
        self.notes.0.iter().find(|n| n.id == note_id)
    }

    pub fn find_note_mut(&mut self, note_id: Uuid) -> Option<&mut Note> {
        self.notes.0.iter_mut().find(|n| n.id == note_id)
    }

    /// Case-sensitive exact title match, the duplicate rule used at creation.
    pub fn has_note_titled(&self, title: &str) -> bool {
        self.notes.0.iter().any(|n| n.title == title)
    }

    pub fn push_note(&mut self, note: Note) {
        self.notes.0.push(note);
    }

    /// Remove a note, preserving the relative order of the remainder.
    /// Returns false when the id does not resolve.
    pub fn remove_note(&mut self, note_id: Uuid) -> bool {
        let before = self.notes.0.len();
        self.notes.0.retain(|n| n.id != note_id);
        self.notes.0.len() != before
    }
}
