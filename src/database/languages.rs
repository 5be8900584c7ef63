use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Language, LanguageSummary};
use crate::database::StoreError;

const LANGUAGE_COLUMNS: &str = "id, name, logo, created_by, created_at, notes";

/// Persistence for language documents. Each row embeds its full note array,
/// so the row is the unit every mutation reads and writes whole.
#[derive(Clone)]
pub struct LanguageStore {
    pool: PgPool,
}

impl LanguageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Language>, StoreError> {
        let language = sqlx::query_as::<_, Language>(&format!(
            "SELECT {LANGUAGE_COLUMNS} FROM languages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(language)
    }

    /// Case-sensitive exact match, used by the duplicate check at creation.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Language>, StoreError> {
        let language = sqlx::query_as::<_, Language>(&format!(
            "SELECT {LANGUAGE_COLUMNS} FROM languages WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(language)
    }

    /// Case-insensitive exact match, used by the name-addressed lookups.
    pub async fn find_by_name_ci(&self, name: &str) -> Result<Option<Language>, StoreError> {
        let language = sqlx::query_as::<_, Language>(&format!(
            "SELECT {LANGUAGE_COLUMNS} FROM languages WHERE LOWER(name) = LOWER($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(language)
    }

    /// Languages created by the given user. Authorization happens in the
    /// query itself, never as a post-filter.
    pub async fn list_owned(&self, user_id: Uuid) -> Result<Vec<LanguageSummary>, StoreError> {
        let summaries = sqlx::query_as::<_, LanguageSummary>(
            "SELECT id, name FROM languages WHERE created_by = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }

    pub async fn insert(&self, language: &Language) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO languages (id, name, logo, created_by, created_at, notes) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(language.id)
        .bind(&language.name)
        .bind(&language.logo)
        .bind(language.created_by)
        .bind(language.created_at)
        .bind(Json(&language.notes.0))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Write the document's note array back whole. Last write wins: there is
    /// no version token, so concurrent writers to one language race.
    pub async fn save_notes(&self, language: &Language) -> Result<(), StoreError> {
        sqlx::query("UPDATE languages SET notes = $2 WHERE id = $1")
            .bind(language.id)
            .bind(Json(&language.notes.0))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns false when the id did not resolve.
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
