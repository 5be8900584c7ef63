use sqlx::PgPool;

use crate::auth::SessionIssuer;
use crate::config::AppConfig;
use crate::database::{LanguageStore, UserStore};
use crate::services::{NoteEngine, OwnershipService};

/// Shared handler state, assembled once at boot from the configuration and
/// the connection pool. Everything inside is cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pool: PgPool,
    pub sessions: SessionIssuer,
    pub users: UserStore,
    pub ownership: OwnershipService,
    pub notes: NoteEngine,
}

impl AppState {
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let users = UserStore::new(pool.clone());
        let languages = LanguageStore::new(pool.clone());
        Self {
            sessions: SessionIssuer::new(&config.jwt),
            ownership: OwnershipService::new(languages.clone(), users.clone()),
            notes: NoteEngine::new(languages),
            users,
            pool,
            config,
        }
    }
}
