// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes.

use axum::{
    extract::State,
    routing::{get, patch},
    Extension, Json, Router,
};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::user::{ChangePasswordRequest, ProfileUpdate};
use crate::models::{PublicProfile, User, UserProfile};
use crate::routes::auth::MessageResponse;
use crate::validation::{PathId, ValidatedJson};
use crate::AppState;

/// Profile lookup by id, no session required.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/users/{id}", get(get_public_profile))
}

/// Caller's own profile (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/users/me",
            get(get_me).put(update_me).delete(delete_me),
        )
        .route("/api/users/me/password", patch(change_password))
}

async fn load_user(state: &AppState, user: &AuthUser) -> Result<User> {
    state
        .db
        .get_user(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

async fn get_public_profile(
    State(state): State<Arc<AppState>>,
    PathId(id): PathId,
) -> Result<Json<PublicProfile>> {
    let user = state
        .db
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user.public_profile()))
}

async fn get_me(Extension(user): Extension<AuthUser>) -> Json<UserProfile> {
    Json(user.profile)
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(update): ValidatedJson<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    let mut current = load_user(&state, &user).await?;
    update.apply(&mut current);
    let saved = state.credentials.save(current).await?;
    tracing::info!(user_id = %saved.id, "Profile updated");
    Ok(Json(saved.profile()))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let current = load_user(&state, &user).await?;
    state
        .credentials
        .change_password(current, &req.old_password, req.password)
        .await?;
    Ok(Json(MessageResponse::ok("Password updated")))
}

/// Delete the caller's account and everything they own.
async fn delete_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessageResponse>> {
    tracing::info!(user_id = %user.id, "User-initiated account deletion");

    let current = load_user(&state, &user).await?;
    let removed = state.db.delete_user_data(&current).await?;

    tracing::info!(user_id = %user.id, documents = removed, "Account deleted");
    Ok(Json(MessageResponse::ok("Account and all data deleted")))
}
