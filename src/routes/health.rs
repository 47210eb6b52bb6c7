// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health snapshot routes (body metrics, not the liveness probe).

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{HealthSnapshot, NewHealthSnapshot};
use crate::validation::{PathId, ValidatedJson};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(list_snapshots).post(create_snapshot))
        .route("/api/health/{id}", delete(delete_snapshot))
}

async fn create_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<NewHealthSnapshot>,
) -> Result<(StatusCode, Json<HealthSnapshot>)> {
    let snapshot =
        input.into_snapshot(uuid::Uuid::new_v4().to_string(), user.id.clone(), Utc::now());
    state.db.insert_health_snapshot(&snapshot).await?;
    tracing::info!(user_id = %user.id, snapshot_id = %snapshot.id, "Health snapshot saved");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<HealthSnapshot>>> {
    let mut snapshots = state.db.health_for_user(&user.id).await?;
    snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    Ok(Json(snapshots))
}

async fn delete_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    PathId(id): PathId,
) -> Result<StatusCode> {
    if !state.db.delete_health_snapshot(&id, &user.id).await? {
        return Err(AppError::NotFound("Health snapshot not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
