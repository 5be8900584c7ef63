use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::User;
use crate::database::StoreError;

const USER_COLUMNS: &str = "id, first_name, last_name, username, email, password_hash, \
     external_id, languages, is_admin, profile_picture, created_at";

/// Persistence for user identity records.
#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, username, email, password_hash, \
             external_id, languages, is_admin, profile_picture, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.external_id)
        .bind(&user.languages)
        .bind(user.is_admin)
        .bind(&user.profile_picture)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Append a language reference to the user's ownership list.
    pub async fn add_language(&self, user_id: Uuid, language_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET languages = array_append(languages, $2) WHERE id = $1")
            .bind(user_id)
            .bind(language_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop a language reference from the user's ownership list.
    pub async fn remove_language(&self, user_id: Uuid, language_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET languages = array_remove(languages, $2) WHERE id = $1")
            .bind(user_id)
            .bind(language_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
