// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup; secrets stay in memory for the process lifetime.

use std::env;

/// Minimum accepted length of the JWT signing key, in bytes.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store (development and tests)
    Memory,
    /// Google Cloud Firestore (or its emulator)
    Firestore,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "firestore" => Ok(StoreBackend::Firestore),
            _ => Err(ConfigError::Invalid("STORE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS and password-reset links
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Document store backend
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// bcrypt work factor for credential hashing
    pub bcrypt_cost: u32,
    /// HTTP mail relay endpoint; reset mail is only logged when unset
    pub mail_relay_url: Option<String>,
    /// Sender address for outgoing mail
    pub mail_from: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Deterministic configuration for tests.
    ///
    /// Uses the in-memory store and bcrypt's minimum cost so hashing stays fast.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            bcrypt_cost: 4,
            mail_relay_url: None,
            mail_from: "no-reply@evolutfit.app".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
            .trim()
            .as_bytes()
            .to_vec();
        if jwt_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid("JWT_SIGNING_KEY"));
        }

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Memory,
        };

        let gcp_project_id = match (store_backend, env::var("GCP_PROJECT_ID")) {
            (_, Ok(project)) => project,
            (StoreBackend::Firestore, Err(_)) => {
                return Err(ConfigError::Missing("GCP_PROJECT_ID"))
            }
            (StoreBackend::Memory, Err(_)) => "local-dev".to_string(),
        };

        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(bcrypt::DEFAULT_COST)
            .clamp(4, 31);

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string())
                .trim_end_matches('/')
                .to_string(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            gcp_project_id,
            bcrypt_cost,
            mail_relay_url: env::var("MAIL_RELAY_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@evolutfit.app".to_string()),
            jwt_signing_key,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
