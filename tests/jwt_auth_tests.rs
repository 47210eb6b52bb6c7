// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token tests through the public service API.

use chrono::{Duration, Utc};
use evolutfit::services::{TokenError, TokenService};

const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!!";

#[test]
fn test_issue_and_verify_roundtrip() {
    let tokens = TokenService::new(KEY);
    let token = tokens.issue("user-1").unwrap();
    assert_eq!(tokens.verify(&token).unwrap(), "user-1");
}

#[test]
fn test_token_expires_after_thirty_days() {
    let tokens = TokenService::new(KEY);

    let fresh = tokens
        .issue_at("user-1", Utc::now() - Duration::days(29))
        .unwrap();
    assert_eq!(tokens.verify(&fresh).unwrap(), "user-1");

    let stale = tokens
        .issue_at("user-1", Utc::now() - Duration::days(31))
        .unwrap();
    assert_eq!(tokens.verify(&stale), Err(TokenError::Expired));
}

#[test]
fn test_empty_subject_rejected() {
    let tokens = TokenService::new(KEY);
    assert_eq!(tokens.issue(""), Err(TokenError::MissingSubject));
}

#[test]
fn test_token_from_other_service_rejected() {
    let ours = TokenService::new(KEY);
    let theirs = TokenService::new(b"another_key_with_at_least_32_byt");

    let token = theirs.issue("user-1").unwrap();
    assert_eq!(ours.verify(&token), Err(TokenError::Invalid));
}

#[test]
fn test_truncated_token_rejected() {
    let tokens = TokenService::new(KEY);
    let token = tokens.issue("user-1").unwrap();
    let truncated = &token[..token.len() - 4];
    assert_eq!(tokens.verify(truncated), Err(TokenError::Invalid));
}
