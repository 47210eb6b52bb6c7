// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EvolutFit: fitness tracking backend.
//!
//! Accounts and sessions, workout logging, strength records with a global
//! leaderboard, health snapshots, and a social feed with likes.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validation;

use config::Config;
use db::Database;
use services::{AnalyticsEngine, CredentialStore, FeedEngine, Mailer, RecordEngine, TokenService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub records: RecordEngine,
    pub feed: FeedEngine,
    pub analytics: AnalyticsEngine,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(config: Config, db: Database, mailer: Mailer) -> Self {
        Self {
            tokens: TokenService::new(&config.jwt_signing_key),
            credentials: CredentialStore::new(db.clone(), config.bcrypt_cost),
            records: RecordEngine::new(db.clone()),
            feed: FeedEngine::new(db.clone()),
            analytics: AnalyticsEngine::new(db.clone()),
            mailer,
            db,
            config,
        }
    }
}
