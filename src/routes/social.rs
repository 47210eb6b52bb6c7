// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social feed routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{NewPost, PostChanges};
use crate::services::feed::{FeedPost, FeedQuery, LikeToggle};
use crate::validation::{PathId, ValidatedJson, ValidatedQuery};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/social", get(list_posts).post(create_post))
        .route(
            "/api/social/{id}",
            patch(patch_post).put(replace_post).delete(delete_post),
        )
        .route("/api/social/{id}/like", patch(toggle_like))
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(query): ValidatedQuery<FeedQuery>,
) -> Result<Json<Vec<FeedPost>>> {
    Ok(Json(state.feed.list_posts(&user.id, &query).await?))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<NewPost>,
) -> Result<(StatusCode, Json<FeedPost>)> {
    let post = state.feed.create_post(&user.author(), input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Full replacement: every field is required.
async fn replace_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    PathId(id): PathId,
    ValidatedJson(input): ValidatedJson<NewPost>,
) -> Result<Json<FeedPost>> {
    let post = state
        .feed
        .update_post(&user.author(), &id, PostChanges::from(input))
        .await?;
    Ok(Json(post))
}

async fn patch_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    PathId(id): PathId,
    ValidatedJson(changes): ValidatedJson<PostChanges>,
) -> Result<Json<FeedPost>> {
    Ok(Json(state.feed.update_post(&user.author(), &id, changes).await?))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    PathId(id): PathId,
) -> Result<StatusCode> {
    state.feed.delete_post(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    PathId(id): PathId,
) -> Result<Json<LikeToggle>> {
    Ok(Json(state.feed.toggle_like(&user.id, &id).await?))
}
