// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::services::credentials::{is_password_hash, MAX_PASSWORD_BYTES};
use crate::validation::coerce;

fn default_active() -> bool {
    true
}

/// A new plaintext password must be hashable in full and must not already
/// look like a stored credential.
fn validate_plaintext_password(value: &str) -> Result<(), validator::ValidationError> {
    if value.len() > MAX_PASSWORD_BYTES {
        return Err(validator::ValidationError::new("password_too_long").with_message(
            format!("Password must be at most {MAX_PASSWORD_BYTES} bytes").into(),
        ));
    }
    if is_password_hash(value) {
        return Err(validator::ValidationError::new("password_hash_shape")
            .with_message("Password cannot have the format of a stored hash".into()));
    }
    Ok(())
}

/// Identity document stored in the `users` collection.
///
/// Never serialized to clients directly; use [`UserProfile`],
/// [`PublicProfile`] or [`AuthorSummary`].
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID (also used as document ID)
    pub id: String,
    pub name: String,
    pub lastname: String,
    /// Lowercased, trimmed, unique
    pub email: String,
    pub age: u32,
    /// Avatar URL
    #[serde(default)]
    pub avatar: Option<String>,
    /// bcrypt hash; plaintext only transiently before the save guard runs
    pub password_hash: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// SHA-256 hex digest of the pending reset token
    #[serde(default)]
    pub reset_token_hash: Option<String>,
    #[serde(default)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("is_active", &self.is_active)
            .field("password_hash", &"<redacted>")
            .field("reset_pending", &self.reset_token_hash.is_some())
            .finish()
    }
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            lastname: self.lastname.clone(),
            email: self.email.clone(),
            age: self.age,
            avatar: self.avatar.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            lastname: self.lastname.clone(),
            avatar: self.avatar.clone(),
            created_at: self.created_at,
        }
    }

    pub fn author_summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            lastname: self.lastname.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// The caller's own profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub age: u32,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields visible to any caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
    pub lastname: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Minimal author projection joined into feed items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
    pub lastname: String,
    pub avatar: Option<String>,
}

impl From<&UserProfile> for AuthorSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            lastname: profile.lastname.clone(),
            avatar: profile.avatar.clone(),
        }
    }
}

// ─── Request Contracts ───────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "coerce::trimmed")]
    #[validate(length(min = 2, max = 50, message = "Name must be 2-50 characters"))]
    pub name: String,
    #[serde(deserialize_with = "coerce::trimmed")]
    #[validate(length(min = 2, max = 50, message = "Last name must be 2-50 characters"))]
    pub lastname: String,
    #[serde(deserialize_with = "coerce::email")]
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[serde(deserialize_with = "coerce::integer")]
    #[validate(range(min = 14, max = 100, message = "Age must be between 14 and 100"))]
    pub age: u32,
    #[validate(
        length(min = 6, max = 100, message = "Password must be 6-100 characters"),
        custom(function = "validate_plaintext_password")
    )]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(deserialize_with = "coerce::email")]
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Partial profile update. Email and credentials are not updatable here.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "require_profile_change"))]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "coerce::optional_trimmed")]
    #[validate(length(min = 2, max = 50, message = "Name must be 2-50 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_trimmed")]
    #[validate(length(min = 2, max = 50, message = "Last name must be 2-50 characters"))]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_integer")]
    #[validate(range(min = 14, max = 100, message = "Age must be between 14 and 100"))]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "coerce::optional_trimmed")]
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: Option<String>,
}

fn require_profile_change(update: &ProfileUpdate) -> Result<(), validator::ValidationError> {
    if update.name.is_none()
        && update.lastname.is_none()
        && update.age.is_none()
        && update.avatar.is_none()
    {
        return Err(validator::ValidationError::new("empty_update")
            .with_message("At least one field must be provided".into()));
    }
    Ok(())
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(lastname) = self.lastname {
            user.lastname = lastname;
        }
        if let Some(age) = self.age {
            user.age = age;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar);
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    #[validate(
        length(min = 8, max = 100, message = "Password must be 8-100 characters"),
        custom(function = "validate_plaintext_password")
    )]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    #[serde(deserialize_with = "coerce::email")]
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    #[validate(
        length(min = 6, max = 100, message = "Password must be 6-100 characters"),
        custom(function = "validate_plaintext_password")
    )]
    pub password: String,
}
