use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env();
    tracing::info!("Starting langnotes API in {:?} mode", config.environment);

    let pool = database::connect(&config.database).await?;
    database::ensure_schema(&pool).await?;

    let port = config.server.port;
    let state = AppState::new(config, pool);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("langnotes API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_size_bytes;

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes())
        // Protected resources
        .merge(language_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::user;

    Router::new()
        .route("/user/register", post(user::register))
        .route("/user/login/username-password", post(user::login_password))
        .route("/user/login/google", post(user::login_google))
        .route("/user/checkUser", post(user::check_user))
        .route("/user/refresh-token", post(user::refresh_token))
}

fn language_routes(state: AppState) -> Router<AppState> {
    use axum::routing::{delete, post, put};
    use handlers::languages;

    Router::new()
        // Language collection
        .route("/languages/", get(languages::list))
        .route("/languages/details", get(languages::details))
        .route("/languages/addNewCourse", post(languages::add_course))
        .route("/languages/deleteLanguage", delete(languages::delete_language))
        // Notes within a language
        .route("/languages/getNotes", get(languages::get_notes))
        .route("/languages/getNote/:note_id", get(languages::get_note_by_path))
        .route("/languages/note", get(languages::get_note))
        .route("/languages/note/by-name", get(languages::get_note_by_name))
        .route("/languages/notes/newNote", post(languages::new_note))
        .route("/languages/notes/updateNote", put(languages::update_note))
        .route("/languages/deleteNote", delete(languages::delete_note))
        // Every route above requires a bearer access token
        .route_layer(axum::middleware::from_fn_with_state(state, middleware::require_auth))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "langnotes API",
        "version": version,
        "description": "Backend for a programming-language note-taking app",
        "endpoints": {
            "user": "/user/* (public - registration, login, token refresh)",
            "languages": "/languages/* (protected - language and note CRUD)",
            "health": "/health (public)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("shutdown signal received, draining connections");
}
