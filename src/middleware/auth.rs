// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session guard for protected routes.

use crate::error::AppError;
use crate::models::{AuthorSummary, UserProfile};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated identity resolved by [`require_auth`].
///
/// Handlers receive it through `Extension<AuthUser>` and pass it explicitly
/// to the engines. Carries no credential material.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub profile: UserProfile,
}

impl AuthUser {
    pub fn author(&self) -> AuthorSummary {
        AuthorSummary::from(&self.profile)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that requires a valid session token for a live, active identity.
///
/// Every failure is the same generic 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let user_id = state.tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        AppError::Unauthorized
    })?;

    let user = match state.db.get_user(&user_id).await? {
        Some(user) if user.is_active => user,
        _ => {
            tracing::debug!(user_id = %user_id, "Session names a missing or inactive identity");
            return Err(AppError::Unauthorized);
        }
    };

    request.extensions_mut().insert(AuthUser {
        id: user.id.clone(),
        profile: user.profile(),
    });

    Ok(next.run(request).await)
}
