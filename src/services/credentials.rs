// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential storage and the password lifecycle.
//!
//! [`CredentialStore::seal`] is the only code path that produces a stored
//! credential. Registration, profile saves, password changes and resets all
//! go through it immediately before persistence.
//!
//! Reset flow: `NoResetPending -> ResetPending(hash, expiry) -> NoResetPending`.
//! Only the SHA-256 digest of a reset token is stored; the raw token leaves
//! the process once, inside the reset email.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use bcrypt::BcryptError;
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task;

use crate::db::{repository::to_document, Database, Filter};
use crate::error::AppError;
use crate::models::User;

/// Reset token lifetime.
pub const RESET_TOKEN_TTL_HOURS: i64 = 1;
/// 256-bit reset tokens.
const RESET_TOKEN_BYTES: usize = 32;
const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];
const BCRYPT_HASH_LEN: usize = 60;
/// Longest password bcrypt hashes in full (72 bytes with the NUL terminator).
pub const MAX_PASSWORD_BYTES: usize = 71;

/// Whether `value` already has bcrypt's modular-crypt shape.
pub fn is_password_hash(value: &str) -> bool {
    value.len() == BCRYPT_HASH_LEN && BCRYPT_PREFIXES.iter().any(|p| value.starts_with(p))
}

/// Storage form of a reset token (hex SHA-256).
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Fresh random reset token, base64url without padding.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// A pending reset to deliver out of band. Never serialized.
pub struct ResetTicket {
    pub email: String,
    pub name: String,
    pub token: String,
}

impl std::fmt::Debug for ResetTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTicket")
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Hashed-credential lifecycle over the users collection.
#[derive(Clone)]
pub struct CredentialStore {
    db: Database,
    cost: u32,
    /// Hash verified against when the email is unknown, to keep login timing uniform
    dummy_hash: Arc<OnceCell<String>>,
}

impl CredentialStore {
    pub fn new(db: Database, cost: u32) -> Self {
        Self {
            db,
            cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    async fn bcrypt_hash(&self, plaintext: String) -> Result<String, AppError> {
        let cost = self.cost;
        let outcome = task::spawn_blocking(move || bcrypt::non_truncating_hash(plaintext, cost))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing task failed: {e}")))?;

        match outcome {
            Ok(hash) => Ok(hash),
            Err(BcryptError::Truncation(_)) => Err(AppError::invalid_field(
                "password",
                format!("Password must be at most {MAX_PASSWORD_BYTES} bytes"),
            )),
            Err(e) => Err(AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}"))),
        }
    }

    /// Produce the stored form of a credential.
    ///
    /// A value that already looks like a bcrypt hash is returned unchanged.
    /// Request contracts reject hash-shaped passwords, so only stored
    /// credentials take that branch.
    pub async fn seal(&self, credential: String) -> Result<String, AppError> {
        if is_password_hash(&credential) {
            return Ok(credential);
        }
        self.bcrypt_hash(credential).await
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// Malformed hashes and inputs longer than bcrypt reads never match.
    pub async fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, AppError> {
        let plaintext = plaintext.to_string();
        let stored_hash = stored_hash.to_string();
        let outcome = task::spawn_blocking(move || {
            bcrypt::non_truncating_verify(plaintext, &stored_hash)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification task failed: {e}")))?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(BcryptError::Truncation(_)) => Ok(false),
            Err(e) => {
                tracing::warn!(error = %e, "Stored credential is not a valid bcrypt hash");
                Ok(false)
            }
        }
    }

    /// Persist a new identity. `draft.password_hash` holds the plaintext.
    pub async fn create(&self, mut draft: User) -> Result<User, AppError> {
        draft.password_hash = self.seal(draft.password_hash).await?;
        self.db.create_user(&draft).await?;
        Ok(draft)
    }

    /// Persist a modified identity, sealing the credential first.
    ///
    /// Fails with `Conflict` if the stored identity changed since `user` was
    /// read, and `NotFound` if it no longer exists.
    pub async fn save(&self, mut user: User) -> Result<User, AppError> {
        let expected = user.updated_at;
        user.password_hash = self.seal(user.password_hash).await?;
        user.updated_at = Utc::now();

        match self.db.replace_user(&user, expected).await? {
            Some(saved) => Ok(saved),
            None if self.db.get_user(&user.id).await?.is_some() => Err(AppError::Conflict(
                "Profile was modified concurrently; retry".to_string(),
            )),
            None => Err(AppError::NotFound("User not found".to_string())),
        }
    }

    /// Resolve an email/password pair to an active identity.
    ///
    /// Unknown email, wrong password and inactive identity are all `Unauthorized`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let Some(user) = self.db.get_user_by_email(email).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.bcrypt_hash("evolutfit-dummy-credential".to_string()))
                .await?;
            let _ = self.verify(password, dummy).await?;
            tracing::info!("Login failed: unknown email");
            return Err(AppError::Unauthorized);
        };

        if !self.verify(password, &user.password_hash).await? {
            tracing::info!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::Unauthorized);
        }
        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login refused: inactive identity");
            return Err(AppError::Unauthorized);
        }
        Ok(user)
    }

    /// Replace the credential after re-verifying the current one.
    pub async fn change_password(
        &self,
        mut user: User,
        old_password: &str,
        new_password: String,
    ) -> Result<User, AppError> {
        if !self.verify(old_password, &user.password_hash).await? {
            return Err(AppError::Unauthorized);
        }
        user.password_hash = new_password;
        let saved = self.save(user).await?;
        tracing::info!(user_id = %saved.id, "Password changed");
        Ok(saved)
    }

    /// Start a reset for `email`.
    ///
    /// Returns the ticket to deliver when an active identity exists. The token
    /// is generated and digested either way so both branches cost the same.
    pub async fn request_reset(&self, email: &str) -> Result<Option<ResetTicket>, AppError> {
        let token = generate_reset_token();
        let token_hash = hash_reset_token(&token);

        let user = match self.db.get_user_by_email(email).await? {
            Some(user) if user.is_active => user,
            _ => {
                tracing::info!("Password reset requested for unknown email");
                return Ok(None);
            }
        };

        let now = Utc::now();
        let patch = to_document(&json!({
            "reset_token_hash": token_hash,
            "reset_token_expires_at": now + Duration::hours(RESET_TOKEN_TTL_HOURS),
            "updated_at": now,
        }))?;
        if self
            .db
            .patch_user(&Filter::by_id(&user.id), patch)
            .await?
            .is_none()
        {
            return Ok(None);
        }

        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(Some(ResetTicket {
            email: user.email,
            name: user.name,
            token,
        }))
    }

    /// Complete a reset: set the new credential and clear the token in one write.
    ///
    /// Wrong, expired and already-used tokens all fail with `InvalidResetToken`.
    pub async fn consume_reset(&self, token: &str, new_password: String) -> Result<User, AppError> {
        let token_hash = hash_reset_token(token);
        let Some(user) = self.db.find_user_by_reset_hash(&token_hash).await? else {
            return Err(AppError::InvalidResetToken);
        };

        let now = Utc::now();
        match user.reset_token_expires_at {
            Some(expires_at) if expires_at > now => {}
            _ => return Err(AppError::InvalidResetToken),
        }

        let sealed = self.seal(new_password).await?;
        let patch = to_document(&json!({
            "password_hash": sealed,
            "reset_token_hash": Value::Null,
            "reset_token_expires_at": Value::Null,
            "updated_at": now,
        }))?;

        // Conditional on the digest so two concurrent consumers cannot both win.
        let filter = Filter::by_id(&user.id).eq("reset_token_hash", token_hash.as_str());
        let updated = self
            .db
            .patch_user(&filter, patch)
            .await?
            .ok_or(AppError::InvalidResetToken)?;

        tracing::info!(user_id = %updated.id, "Password reset completed");
        Ok(updated)
    }
}
