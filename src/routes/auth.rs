// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and password reset routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::user::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::models::{User, UserProfile};
use crate::validation::ValidatedJson;
use crate::AppState;

/// Returned by forgot-password whether or not the account exists.
const RESET_REQUESTED_MESSAGE: &str =
    "If an account exists for that email, a reset link has been sent";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password/{token}", post(reset_password))
}

/// Session established by register or login.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
        }
    }
}

fn session_for(state: &AppState, user: &User) -> Result<SessionResponse> {
    let token = state
        .tokens
        .issue(&user.id)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to issue session token: {e}")))?;
    Ok(SessionResponse {
        user: user.profile(),
        token,
    })
}

async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let now = Utc::now();
    let draft = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name,
        lastname: req.lastname,
        email: req.email,
        age: req.age,
        avatar: None,
        password_hash: req.password,
        is_active: true,
        reset_token_hash: None,
        reset_token_expires_at: None,
        created_at: now,
        updated_at: now,
    };

    let user = state.credentials.create(draft).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(session_for(&state, &user)?)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let user = state
        .credentials
        .authenticate(&req.email, &req.password)
        .await?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(session_for(&state, &user)?))
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(ticket) = state.credentials.request_reset(&req.email).await? {
        state.mailer.send_password_reset(&ticket);
    }
    Ok(Json(MessageResponse::ok(RESET_REQUESTED_MESSAGE)))
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    if token.trim().is_empty() {
        return Err(AppError::InvalidResetToken);
    }
    state.credentials.consume_reset(&token, req.password).await?;
    Ok(Json(MessageResponse::ok(
        "Password has been reset. You can now log in",
    )))
}
