// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use evolutfit::config::Config;
use evolutfit::db::{Database, Filter};
use evolutfit::routes::create_router;
use evolutfit::services::Mailer;
use evolutfit::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test app over the in-memory store with captured mail.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let config = Config::test_default();
    let mailer = Mailer::capturing(&config);
    create_test_app_with(config, Database::in_memory(), mailer)
}

#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    db: Database,
    mailer: Mailer,
) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, db, mailer));
    (create_router(state.clone()), state)
}

/// Send a request with an optional JSON body and bearer token.
#[allow(dead_code)]
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

/// Read a response body as JSON (`Value::Null` for an empty body).
#[allow(dead_code)]
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user and return `(user_id, token)`.
#[allow(dead_code)]
pub async fn register_user(app: &Router, name: &str, email: &str) -> (String, String) {
    let (status, body) = send_json(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "name": name,
            "lastname": "Tester",
            "email": email,
            "age": 30,
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

    let id = body["user"]["id"].as_str().unwrap().to_string();
    let token = body["token"].as_str().unwrap().to_string();
    (id, token)
}

/// Collect the `path` of every entry in an error body.
#[allow(dead_code)]
pub fn error_paths(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["path"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Flip a stored identity to inactive, bypassing the API.
#[allow(dead_code)]
pub async fn deactivate_user(state: &AppState, user_id: &str) {
    let patch = json!({ "is_active": false })
        .as_object()
        .cloned()
        .unwrap();
    let updated = state
        .db
        .patch_user(&Filter::by_id(user_id), patch)
        .await
        .unwrap();
    assert!(updated.is_some_and(|user| !user.is_active));
}
