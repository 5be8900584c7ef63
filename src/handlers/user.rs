use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bcrypt::DEFAULT_COST;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::TokenError;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_id: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub google_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckUserRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// POST /user/register - create a new account and hand back a session.
///
/// `password` is optional: federated accounts carry no hash and authenticate
/// through their external id. `userId` seeds that external id when provided.
pub async fn register(
    State(state): State<AppState>,
    body: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let (username, email, first_name, last_name) = match (
        non_empty(body.username),
        non_empty(body.email),
        non_empty(body.first_name),
        non_empty(body.last_name),
    ) {
        (Some(u), Some(e), Some(f), Some(l)) => (u, e, f, l),
        _ => {
            return Err(ApiError::validation(
                "firstName, lastName, username, and email are required.",
            ))
        }
    };

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("User already exists with this email."));
    }

    let password_hash = match body.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(bcrypt::hash(password, DEFAULT_COST).map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal("Error creating user. Please try again later.")
        })?),
        None => None,
    };

    // External id either arrives with the request (federated first-seen) or
    // gets generated here.
    let external_id = body
        .user_id
        .unwrap_or_else(|| format!("custom-{}", Uuid::new_v4()));

    let user = User {
        id: Uuid::new_v4(),
        first_name,
        last_name,
        username,
        email,
        password_hash,
        external_id: Some(external_id),
        languages: vec![],
        is_admin: false,
        profile_picture: body.profile_picture,
        created_at: Utc::now(),
    };

    state.users.insert(&user).await?;

    let access_token = state.sessions.issue_access_token(&user).map_err(issue_failed)?;
    let refresh_token = state.sessions.issue_refresh_token(&user).map_err(issue_failed)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": user.profile(),
            "tokens": {
                "accessToken": access_token,
                "refreshToken": refresh_token,
            },
        })),
    ))
}

/// POST /user/login/username-password - authenticate and receive both tokens.
/// The account can be addressed by email or by username.
pub async fn login_password(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let password = non_empty(body.password)
        .ok_or_else(|| ApiError::validation("Email or username, and password are required."))?;

    let user = match (non_empty(body.email), non_empty(body.username)) {
        (Some(email), _) => state.users.find_by_email(&email).await?,
        (None, Some(username)) => state.users.find_by_username(&username).await?,
        (None, None) => {
            return Err(ApiError::validation(
                "Email or username, and password are required.",
            ))
        }
    };
    let user = user.ok_or_else(|| ApiError::not_found("User not found."))?;

    // Federated accounts have no hash and cannot log in this way
    let hash = user.password_hash.as_deref().ok_or_else(invalid_credentials)?;
    let valid = bcrypt::verify(password.trim(), hash).map_err(|e| {
        tracing::error!("password verification failed: {}", e);
        ApiError::internal("Error during login. Please try again later.")
    })?;
    if !valid {
        return Err(invalid_credentials());
    }

    let access_token = state.sessions.issue_access_token(&user).map_err(issue_failed)?;
    let refresh_token = state.sessions.issue_refresh_token(&user).map_err(issue_failed)?;

    Ok(Json(json!({
        "accessToken": access_token,
        "refreshToken": refresh_token,
    })))
}

/// POST /user/login/google - federated login by external id. Hands out a
/// single access token; the federated path carries no refresh token.
pub async fn login_google(
    State(state): State<AppState>,
    body: Option<Json<GoogleLoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let google_id =
        non_empty(body.google_id).ok_or_else(|| ApiError::validation("Google ID is required."))?;

    let user = state
        .users
        .find_by_external_id(&google_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found with this Google ID."))?;

    let token = state.sessions.issue_access_token(&user).map_err(issue_failed)?;

    Ok(Json(json!({
        "message": "Google login successful",
        "token": token,
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
        },
    })))
}

/// POST /user/checkUser - does an account exist for this external id? Known
/// accounts come back with a profile and a fresh token pair.
pub async fn check_user(
    State(state): State<AppState>,
    body: Option<Json<CheckUserRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let user_id =
        non_empty(body.user_id).ok_or_else(|| ApiError::validation("User ID is required."))?;

    let Some(user) = state.users.find_by_external_id(&user_id).await? else {
        return Ok(Json(json!({ "exists": false })));
    };

    let access_token = state.sessions.issue_access_token(&user).map_err(issue_failed)?;
    let refresh_token = state.sessions.issue_refresh_token(&user).map_err(issue_failed)?;

    Ok(Json(json!({
        "exists": true,
        "user": user.profile(),
        "tokens": {
            "accessToken": access_token,
            "refreshToken": refresh_token,
        },
    })))
}

/// POST /user/refresh-token - exchange a refresh token for a new session.
/// Both tokens rotate: the answer always carries a fresh pair.
pub async fn refresh_token(
    State(state): State<AppState>,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let refresh_token = non_empty(body.refresh_token)
        .ok_or_else(|| ApiError::validation("Refresh token is required."))?;

    let claims = state.sessions.verify_refresh(&refresh_token).map_err(|e| match e {
        TokenError::Expired | TokenError::Invalid => {
            ApiError::unauthorized("Invalid or expired refresh token.")
        }
        other => {
            tracing::error!("refresh verification failed: {}", other);
            ApiError::internal("Error refreshing tokens. Please try again later.")
        }
    })?;

    // The identity must still resolve: a deleted account cannot refresh
    let user = state
        .users
        .find_by_id(claims.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    let access_token = state.sessions.issue_access_token(&user).map_err(issue_failed)?;
    let refresh_token = state.sessions.issue_refresh_token(&user).map_err(issue_failed)?;

    Ok(Json(json!({
        "accessToken": access_token,
        "refreshToken": refresh_token,
    })))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials. Please check your email and password.")
}

fn issue_failed(err: TokenError) -> ApiError {
    tracing::error!("token issuance failed: {}", err);
    ApiError::internal("Error issuing tokens. Please try again later.")
}
