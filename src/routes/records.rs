// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strength record routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{NewRecord, StrengthRecord};
use crate::services::records::{LeaderboardEntry, SavedRecord};
use crate::validation::{PathId, ValidatedJson};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/records", get(list_records).post(create_record))
        .route("/api/records/leaderboard", get(get_leaderboard))
        .route("/api/records/{id}", delete(delete_record))
}

async fn create_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<NewRecord>,
) -> Result<(StatusCode, Json<SavedRecord>)> {
    let saved = state.records.save_record(&user.id, input).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn list_records(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<StrengthRecord>>> {
    Ok(Json(state.records.list_records(&user.id).await?))
}

async fn get_leaderboard(State(state): State<Arc<AppState>>) -> Result<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(state.records.leaderboard().await?))
}

async fn delete_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    PathId(id): PathId,
) -> Result<StatusCode> {
    state.records.delete_record(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
