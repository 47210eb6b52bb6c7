// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout session routes and training analytics.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{NewWorkout, Workout};
use crate::services::analytics::{TotalVolume, WorkoutStats};
use crate::validation::{PathId, ValidatedJson};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/workouts", get(list_workouts).post(create_workout))
        .route("/api/workouts/stats", get(get_stats))
        .route("/api/workouts/total-volume", get(get_total_volume))
        .route(
            "/api/workouts/{id}",
            get(get_workout).delete(delete_workout),
        )
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<NewWorkout>,
) -> Result<(StatusCode, Json<Workout>)> {
    let workout = input.into_workout(uuid::Uuid::new_v4().to_string(), user.id.clone(), Utc::now());
    state.db.insert_workout(&workout).await?;

    tracing::info!(
        user_id = %user.id,
        workout_id = %workout.id,
        exercises = workout.exercises.len(),
        "Workout logged"
    );
    Ok((StatusCode::CREATED, Json(workout)))
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Workout>>> {
    let mut workouts = state.db.workouts_for_user(&user.id).await?;
    workouts.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    Ok(Json(workouts))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    PathId(id): PathId,
) -> Result<Json<Workout>> {
    state
        .db
        .get_workout(&id, &user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    PathId(id): PathId,
) -> Result<StatusCode> {
    if !state.db.delete_workout(&id, &user.id).await? {
        return Err(AppError::NotFound("Workout not found".to_string()));
    }
    tracing::info!(user_id = %user.id, workout_id = %id, "Workout deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<WorkoutStats>> {
    Ok(Json(state.analytics.stats(&user.id).await?))
}

async fn get_total_volume(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TotalVolume>> {
    Ok(Json(state.analytics.total_volume(&user.id).await?))
}
