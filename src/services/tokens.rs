// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying only the identity ID. They are never
//! persisted; validity is the signature plus the `exp` claim.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Fixed session validity window.
pub const SESSION_TTL_DAYS: i64 = 30;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("identity id is required")]
    MissingSubject,
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies bearer session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(signing_key: &[u8]) -> Self {
        // Only HS256 is accepted; `none` and asymmetric algorithms fail the header check.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(signing_key),
            decoding: DecodingKey::from_secret(signing_key),
            validation,
        }
    }

    /// Issue a token for `identity_id` valid for [`SESSION_TTL_DAYS`].
    pub fn issue(&self, identity_id: &str) -> Result<String, TokenError> {
        self.issue_at(identity_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, identity_id: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        if identity_id.trim().is_empty() {
            return Err(TokenError::MissingSubject);
        }

        let claims = Claims {
            sub: identity_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry; returns the identity ID.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(TokenError::Invalid);
        }
        Ok(data.claims.sub)
    }
}
