// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EvolutFit API Server
//!
//! Fitness tracking backend: accounts, workouts, strength records,
//! health snapshots and a social feed.

use evolutfit::{config::Config, db::Database, services::Mailer, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long shutdown waits for reset emails still being relayed.
const MAIL_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        store = ?config.store_backend,
        "Starting EvolutFit API"
    );

    // Open the document store
    let db = Database::connect(&config).await?;
    tracing::info!("Document store ready");

    let mailer = Mailer::from_config(&config);

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, mailer));

    // Build router
    let app = evolutfit::routes::create_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await?;

    let delivered = state.mailer.flush(MAIL_DRAIN_TIMEOUT).await;
    tracing::info!(delivered, "Pending mail flushed");
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("evolutfit=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
