use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::models::{NoteCreator, NoteDetailInput, User};
use crate::error::ApiError;
use crate::services::notes::{NewNote, NotePatch};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LanguageIdBody {
    pub language_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailsQuery {
    pub language_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteQuery {
    pub language_id: Option<String>,
    pub note_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteByNameQuery {
    pub name: Option<String>,
    pub note_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCourseRequest {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewNoteRequest {
    pub language_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub note_detail: Option<Vec<NoteDetailInput>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub language_id: Option<String>,
    pub note_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub note_detail: Option<Vec<NoteDetailInput>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteNoteRequest {
    pub language_id: Option<String>,
    pub note_id: Option<String>,
}

/// GET /languages/ - id/name pairs of the caller's languages.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiError> {
    let languages = state.ownership.list_languages(&user).await?;
    Ok(Json(languages))
}

/// GET /languages/details?language_id=|name= - full language document.
pub async fn details(
    State(state): State<AppState>,
    Query(query): Query<DetailsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if query.language_id.is_none() && query.name.is_none() {
        return Err(ApiError::validation("Either language_id or name is required."));
    }
    let language_id = query
        .language_id
        .as_deref()
        .map(parse_language_id)
        .transpose()?;

    let language = state
        .ownership
        .language_details(language_id, query.name.as_deref())
        .await?;
    Ok(Json(language))
}

/// GET /languages/getNotes - all notes of one language, id in the body.
pub async fn get_notes(
    State(state): State<AppState>,
    body: Option<Json<LanguageIdBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let language_id = parse_language_id(body.language_id.as_deref().unwrap_or_default())?;

    let notes = state.notes.get_notes(language_id).await?;
    Ok(Json(notes))
}

/// GET /languages/getNote/:note_id - one note, language id in the body.
pub async fn get_note_by_path(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    body: Option<Json<LanguageIdBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let language_id = parse_language_id(body.language_id.as_deref().unwrap_or_default())?;
    let note_id = parse_note_id(&note_id)?;

    let note = state.notes.get_note(language_id, note_id).await?;
    Ok(Json(note))
}

/// GET /languages/note?language_id&note_id - one note, ids in the query.
pub async fn get_note(
    State(state): State<AppState>,
    Query(query): Query<NoteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(language_id), Some(note_id)) = (query.language_id, query.note_id) else {
        return Err(ApiError::validation("language_id and note_id are required."));
    };
    let language_id = parse_language_id(&language_id)?;
    let note_id = parse_note_id(&note_id)?;

    let note = state.notes.get_note(language_id, note_id).await?;
    Ok(Json(note))
}

/// GET /languages/note/by-name?name&note_id - one note addressed by language
/// name, answered with language attribution.
pub async fn get_note_by_name(
    State(state): State<AppState>,
    Query(query): Query<NoteByNameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(name), Some(note_id)) = (query.name, query.note_id) else {
        return Err(ApiError::validation("Language name and note_id are required."));
    };
    let note_id = parse_note_id(&note_id)?;

    let note = state.notes.get_note_by_language_name(&name, note_id).await?;
    Ok(Json(note))
}

/// POST /languages/addNewCourse - create a language owned by the caller.
pub async fn add_course(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    body: Option<Json<AddCourseRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Course title is required."))?;

    let language = state.ownership.create_language(&user, &name).await?;
    Ok((StatusCode::CREATED, Json(language)))
}

/// POST /languages/notes/newNote - append a note to a language.
pub async fn new_note(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    body: Option<Json<NewNoteRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let language_id = parse_language_id(body.language_id.as_deref().unwrap_or_default())?;

    let (Some(title), Some(description), Some(details)) =
        (body.title, body.description, body.note_detail)
    else {
        return Err(ApiError::validation("Missing or invalid required fields in the body"));
    };

    let new = NewNote { title, description, details };
    let creator = NoteCreator { id: user.id, first_name: user.first_name.clone() };

    let language = state.notes.create_note(language_id, new, creator).await?;
    Ok((StatusCode::CREATED, Json(language)))
}

/// PUT /languages/notes/updateNote - partial update; absent fields are left
/// unchanged and `last_edited` is always refreshed.
pub async fn update_note(
    State(state): State<AppState>,
    body: Option<Json<UpdateNoteRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let (Some(language_id), Some(note_id)) = (body.language_id, body.note_id) else {
        return Err(ApiError::validation(
            "Missing required fields: language_id and note_id are required.",
        ));
    };
    let language_id = parse_language_id(&language_id)?;
    let note_id = parse_note_id(&note_id)?;

    let patch = NotePatch {
        title: body.title,
        description: body.description,
        details: body.note_detail,
    };

    let language = state.notes.update_note(language_id, note_id, patch).await?;
    Ok(Json(language))
}

/// DELETE /languages/deleteLanguage - drop a language with all its notes and
/// detach it from the caller's list.
pub async fn delete_language(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    body: Option<Json<LanguageIdBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let language_id = body
        .language_id
        .ok_or_else(|| ApiError::validation("The body needs to contain the language_id"))?;
    let language_id = parse_language_id(&language_id)?;

    state.ownership.delete_language(&user, language_id).await?;
    Ok(Json(json!({
        "message": "Successfully deleted language and updated user's languages"
    })))
}

/// DELETE /languages/deleteNote - remove one note from a language.
pub async fn delete_note(
    State(state): State<AppState>,
    body: Option<Json<DeleteNoteRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let (Some(language_id), Some(note_id)) = (body.language_id, body.note_id) else {
        return Err(ApiError::validation(
            "The body needs to contain both language_id and note_id",
        ));
    };
    let language_id = parse_language_id(&language_id)?;
    let note_id = parse_note_id(&note_id)?;

    let language = state.notes.delete_note(language_id, note_id).await?;
    Ok(Json(json!({
        "message": "Note deleted successfully",
        "updatedLanguage": language,
    })))
}

fn parse_language_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::validation("Invalid language_id"))
}

fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::validation("Invalid note_id"))
}
