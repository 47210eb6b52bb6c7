// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP surface: router assembly, CORS and the liveness endpoint.

pub mod auth;
pub mod health;
pub mod records;
pub mod social;
pub mod users;
pub mod workouts;

use crate::config::StoreBackend;
use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::extract::State;
use axum::http::{header, request::Parts, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Body of `GET /health`.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// `memory` or `firestore`
    pub store: String,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = match state.config.store_backend {
        StoreBackend::Memory => "memory",
        StoreBackend::Firestore => "firestore",
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.to_string(),
    })
}

/// Origins allowed to call the API with credentials: the configured web
/// client plus local dev servers.
fn cors_layer(frontend_url: String) -> CorsLayer {
    let is_allowed = move |origin: &HeaderValue, _: &Parts| {
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        origin == frontend_url
            || ["http://localhost", "http://127.0.0.1"]
                .iter()
                .any(|local| origin.starts_with(local))
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(is_allowed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Assemble the EvolutFit API.
///
/// `/health`, `/auth/*` and public profile lookups are open. Everything else
/// under `/api` passes the session guard, which injects the caller as an
/// `AuthUser` extension.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.frontend_url.clone());

    let open = Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes())
        .merge(users::public_routes());

    let guarded = Router::new()
        .merge(users::routes())
        .merge(workouts::routes())
        .merge(records::routes())
        .merge(health::routes())
        .merge(social::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(open)
        .merge(guarded)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
