pub mod language;
pub mod user;

pub use language::{Language, LanguageSummary, Note, NoteCreator, NoteDetail, NoteDetailInput};
pub use user::{User, UserProfile};
