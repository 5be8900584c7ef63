pub mod languages;
pub mod models;
pub mod pool;
pub mod users;

pub use languages::LanguageStore;
pub use pool::{connect, ensure_schema, health_check, StoreError};
pub use users::UserStore;
