mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let Some(server) = common::try_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn register_rejects_missing_fields() -> Result<()> {
    let Some(server) = common::try_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/user/register", server.base_url))
        .json(&json!({ "username": "solo" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert!(body["error"].as_str().unwrap().contains("required"));
    Ok(())
}

#[tokio::test]
async fn register_login_and_refresh_flow() -> Result<()> {
    let Some(server) = common::try_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let email = format!("{}@example.com", common::unique("ada"));
    let username = common::unique("ada");

    // Register
    let res = client
        .post(format!("{}/user/register", server.base_url))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "correct horse battery staple",
            "firstName": "Ada",
            "lastName": "Lovelace",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<Value>().await?;
    assert_eq!(body["user"]["email"], email.as_str());
    assert_eq!(body["user"]["firstName"], "Ada");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["tokens"]["accessToken"].is_string());
    assert!(body["tokens"]["refreshToken"].is_string());

    // The same email cannot register twice
    let res = client
        .post(format!("{}/user/register", server.base_url))
        .json(&json!({
            "username": common::unique("other"),
            "email": email,
            "password": "different",
            "firstName": "Eve",
            "lastName": "Imposter",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "User already exists with this email.");

    // Login by email
    let res = client
        .post(format!("{}/user/login/username-password", server.base_url))
        .json(&json!({ "email": email, "password": "correct horse battery staple" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let tokens = res.json::<Value>().await?;
    assert!(tokens["accessToken"].is_string());
    let refresh_token = tokens["refreshToken"].as_str().unwrap().to_string();

    // Login by username works too
    let res = client
        .post(format!("{}/user/login/username-password", server.base_url))
        .json(&json!({ "username": username, "password": "correct horse battery staple" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Wrong password
    let res = client
        .post(format!("{}/user/login/username-password", server.base_url))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Unknown account
    let res = client
        .post(format!("{}/user/login/username-password", server.base_url))
        .json(&json!({ "email": "nobody@example.com", "password": "x" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Refresh rotates both tokens
    let res = client
        .post(format!("{}/user/refresh-token", server.base_url))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let rotated = res.json::<Value>().await?;
    assert!(rotated["accessToken"].is_string());
    assert!(rotated["refreshToken"].is_string());

    // The fresh access token opens a protected route
    let res = client
        .get(format!("{}/languages/", server.base_url))
        .bearer_auth(rotated["accessToken"].as_str().unwrap())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Garbage refresh token is rejected
    let res = client
        .post(format!("{}/user/refresh-token", server.base_url))
        .json(&json!({ "refreshToken": "not.a.token" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn google_login_and_check_user() -> Result<()> {
    let Some(server) = common::try_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let google_id = common::unique("google-id");
    let email = format!("{}@example.com", common::unique("fed"));

    // Federated-style registration: external id supplied, no password
    let res = client
        .post(format!("{}/user/register", server.base_url))
        .json(&json!({
            "username": common::unique("fed"),
            "email": email,
            "firstName": "Fede",
            "lastName": "Rated",
            "userId": google_id,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Google login answers with a single access token
    let res = client
        .post(format!("{}/user/login/google", server.base_url))
        .json(&json!({ "googleId": google_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], email.as_str());

    // Unknown external id
    let res = client
        .post(format!("{}/user/login/google", server.base_url))
        .json(&json!({ "googleId": "does-not-exist" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // checkUser sees the account and hands out a session
    let res = client
        .post(format!("{}/user/checkUser", server.base_url))
        .json(&json!({ "userId": google_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["exists"], true);
    assert!(body["tokens"]["accessToken"].is_string());

    // Unknown ids report exists: false with a 200
    let res = client
        .post(format!("{}/user/checkUser", server.base_url))
        .json(&json!({ "userId": "unknown-external-id" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["exists"], false);
    assert!(body.get("tokens").is_none());

    Ok(())
}

#[tokio::test]
async fn protected_routes_enforce_bearer_tokens() -> Result<()> {
    let Some(server) = common::try_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    // No token at all
    let res = client.get(format!("{}/languages/", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Unauthorized - No token provided");

    // A token that never verified
    let res = client
        .get(format!("{}/languages/", server.base_url))
        .bearer_auth("garbage.token.value")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Forbidden - Invalid token");

    Ok(())
}
