use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::language::{validate_details, DetailError};
use crate::database::models::{Language, Note, NoteCreator, NoteDetailInput};
use crate::database::{LanguageStore, StoreError};
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Language not found")]
    LanguageNotFound,

    #[error("Note not found")]
    NoteNotFound,

    #[error("Note with title \"{0}\" already exists")]
    DuplicateTitle(String),

    #[error("note_detail must contain at least one entry")]
    EmptyDetails,

    #[error(transparent)]
    Detail(#[from] DetailError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<NoteError> for ApiError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::LanguageNotFound | NoteError::NoteNotFound => {
                ApiError::not_found(err.to_string())
            }
            NoteError::DuplicateTitle(_) => ApiError::conflict(err.to_string()),
            NoteError::EmptyDetails | NoteError::Detail(_) => ApiError::validation(err.to_string()),
            NoteError::Store(e) => e.into(),
        }
    }
}

/// Fields of a note creation request, before validation.
#[derive(Debug)]
pub struct NewNote {
    pub title: String,
    pub description: String,
    pub details: Vec<NoteDetailInput>,
}

/// Partial update. `None` means "not provided, leave unchanged", which is
/// distinct from an explicitly empty value.
#[derive(Debug, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub details: Option<Vec<NoteDetailInput>>,
}

/// A note joined with its parent language's attribution, for name-addressed
/// lookups.
#[derive(Debug, Serialize)]
pub struct NoteWithLanguage {
    #[serde(rename = "languageId")]
    pub language_id: Uuid,
    #[serde(rename = "languageName")]
    pub language_name: String,
    #[serde(flatten)]
    pub note: Note,
}

/// CRUD over notes embedded in a language document. Every mutation loads the
/// whole document, edits it in memory, and writes the note array back whole;
/// the document is the unit of atomicity, so concurrent mutations of one
/// language race and the last write wins.
#[derive(Clone)]
pub struct NoteEngine {
    languages: LanguageStore,
}

impl NoteEngine {
    pub fn new(languages: LanguageStore) -> Self {
        Self { languages }
    }

    async fn load(&self, language_id: Uuid) -> Result<Language, NoteError> {
        self.languages
            .find_by_id(language_id)
            .await?
            .ok_or(NoteError::LanguageNotFound)
    }

    pub async fn get_notes(&self, language_id: Uuid) -> Result<Vec<Note>, NoteError> {
        Ok(self.load(language_id).await?.notes.0)
    }

    pub async fn get_note(&self, language_id: Uuid, note_id: Uuid) -> Result<Note, NoteError> {
        self.load(language_id)
            .await?
            .find_note(note_id)
            .cloned()
            .ok_or(NoteError::NoteNotFound)
    }

    /// Name-addressed lookup: case-insensitive exact match on the trimmed
    /// language name, answering with language attribution on the note.
    pub async fn get_note_by_language_name(
        &self,
        name: &str,
        note_id: Uuid,
    ) -> Result<NoteWithLanguage, NoteError> {
        let language = self
            .languages
            .find_by_name_ci(name.trim())
            .await?
            .ok_or(NoteError::LanguageNotFound)?;

        let note = language
            .find_note(note_id)
            .cloned()
            .ok_or(NoteError::NoteNotFound)?;

        Ok(NoteWithLanguage {
            language_id: language.id,
            language_name: language.name,
            note,
        })
    }

    /// Append a new note and return the updated language document.
    pub async fn create_note(
        &self,
        language_id: Uuid,
        new: NewNote,
        creator: NoteCreator,
    ) -> Result<Language, NoteError> {
        let mut language = self.load(language_id).await?;
        apply_create(&mut language, new, creator)?;
        self.languages.save_notes(&language).await?;
        Ok(language)
    }

    /// Apply a partial update and return the updated language document.
    pub async fn update_note(
        &self,
        language_id: Uuid,
        note_id: Uuid,
        patch: NotePatch,
    ) -> Result<Language, NoteError> {
        let mut language = self.load(language_id).await?;
        apply_update(&mut language, note_id, patch)?;
        self.languages.save_notes(&language).await?;
        Ok(language)
    }

    /// Remove a note and return the updated language document.
    pub async fn delete_note(&self, language_id: Uuid, note_id: Uuid) -> Result<Language, NoteError> {
        let mut language = self.load(language_id).await?;
        apply_delete(&mut language, note_id)?;
        self.languages.save_notes(&language).await?;
        Ok(language)
    }
}

fn apply_create(language: &mut Language, new: NewNote, creator: NoteCreator) -> Result<(), NoteError> {
    if new.details.is_empty() {
        return Err(NoteError::EmptyDetails);
    }
    let details = validate_details(new.details)?;

    if language.has_note_titled(&new.title) {
        return Err(NoteError::DuplicateTitle(new.title));
    }

    language.push_note(Note {
        id: Uuid::new_v4(),
        title: new.title,
        description: new.description,
        note_detail: details,
        created_by: creator,
        last_edited: Utc::now(),
    });
    Ok(())
}

fn apply_update(language: &mut Language, note_id: Uuid, patch: NotePatch) -> Result<(), NoteError> {
    // Validate the replacement details before touching the note, so a bad
    // patch leaves the document untouched.
    let details = match patch.details {
        Some(inputs) => {
            if inputs.is_empty() {
                return Err(NoteError::EmptyDetails);
            }
            Some(validate_details(inputs)?)
        }
        None => None,
    };

    let note = language
        .find_note_mut(note_id)
        .ok_or(NoteError::NoteNotFound)?;

    // Title uniqueness is not re-checked on rename. Known limitation,
    // pending a product decision on how rename conflicts should behave.
    if let Some(title) = patch.title {
        note.title = title;
    }
    if let Some(description) = patch.description {
        note.description = description;
    }
    if let Some(details) = details {
        note.note_detail = details;
    }
    note.last_edited = Utc::now();
    Ok(())
}

fn apply_delete(language: &mut Language, note_id: Uuid) -> Result<(), NoteError> {
    if !language.remove_note(note_id) {
        return Err(NoteError::NoteNotFound);
    }
    Ok(())
}
