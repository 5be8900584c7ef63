use chrono::Utc;
use sqlx::types::Json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::database::models::{Language, LanguageSummary, User};
use crate::database::{LanguageStore, StoreError, UserStore};
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("Course '{0}' already exists.")]
    DuplicateName(String),

    #[error("Language not found")]
    LanguageNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<OwnershipError> for ApiError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::DuplicateName(_) => ApiError::conflict(err.to_string()),
            OwnershipError::LanguageNotFound => ApiError::not_found(err.to_string()),
            OwnershipError::Store(e) => e.into(),
        }
    }
}

/// Ties languages to the users who created them: creation tags the owner and
/// records the back-reference, listing is scoped to the caller.
#[derive(Clone)]
pub struct OwnershipService {
    languages: LanguageStore,
    users: UserStore,
}

impl OwnershipService {
    pub fn new(languages: LanguageStore, users: UserStore) -> Self {
        Self { languages, users }
    }

    /// Create a language owned by `user`. Name duplicates are rejected with a
    /// case-sensitive exact match.
    ///
    /// Two writes, no transaction: the language insert and the owner's
    /// reference-list update are separate statements, and a failure between
    /// them leaves an orphaned language behind.
    pub async fn create_language(&self, user: &User, name: &str) -> Result<Language, OwnershipError> {
        if self.languages.find_by_name(name).await?.is_some() {
            return Err(OwnershipError::DuplicateName(name.to_string()));
        }

        let language = Language {
            id: Uuid::new_v4(),
            name: name.to_string(),
            logo: None,
            created_by: Some(user.id),
            created_at: Utc::now(),
            notes: Json(Vec::new()),
        };

        self.languages.insert(&language).await?;
        self.users.add_language(user.id, language.id).await?;

        Ok(language)
    }

    /// Delete a language and detach it from the caller's reference list. The
    /// detach is best-effort: the delete is not rolled back if it fails.
    pub async fn delete_language(&self, user: &User, language_id: Uuid) -> Result<(), OwnershipError> {
        if !self.languages.delete(language_id).await? {
            return Err(OwnershipError::LanguageNotFound);
        }

        if let Err(e) = self.users.remove_language(user.id, language_id).await {
            error!(
                "failed to detach language {} from user {}: {}",
                language_id, user.id, e
            );
        }

        Ok(())
    }

    /// Languages owned by the caller. Scoping happens in the store query.
    pub async fn list_languages(&self, user: &User) -> Result<Vec<LanguageSummary>, OwnershipError> {
        Ok(self.languages.list_owned(user.id).await?)
    }

    /// Resolve a language by id, or by case-insensitive name.
    pub async fn language_details(
        &self,
        language_id: Option<Uuid>,
        name: Option<&str>,
    ) -> Result<Language, OwnershipError> {
        let language = match (language_id, name) {
            (Some(id), _) => self.languages.find_by_id(id).await?,
            (None, Some(name)) => self.languages.find_by_name_ci(name).await?,
            (None, None) => None,
        };
        language.ok_or(OwnershipError::LanguageNotFound)
    }
}
