// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request validation tests: error shape, unknown fields, empty bodies, ids.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{create_test_app, error_paths, read_json, register_user, send_json};

#[tokio::test]
async fn test_register_reports_every_field() {
    let (app, _) = create_test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "name": " A ",
            "lastname": "B",
            "email": "not-an-email",
            "age": 12,
            "password": "123",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "validation_error");
    assert_eq!(
        error_paths(&body),
        vec!["age", "email", "lastname", "name", "password"]
    );
}

#[tokio::test]
async fn test_unknown_field_names_the_field() {
    let (app, _) = create_test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "name": "Ana",
            "lastname": "García",
            "email": "ana@example.com",
            "age": 30,
            "password": "secret123",
            "is_active": false,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&body), vec!["is_active"]);
}

#[tokio::test]
async fn test_missing_field_names_the_field() {
    let (app, _) = create_test_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ana@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&body), vec!["password"]);
}

#[tokio::test]
async fn test_empty_and_malformed_bodies() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(error_paths(&body), vec!["body"]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"email\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_malformed_id_rejected_before_lookup() {
    let (app, _) = create_test_app();
    let (_, token) = register_user(&app, "Ana", "a@x.com").await;

    for (method, uri) in [
        ("GET", "/api/users/not-a-uuid"),
        ("DELETE", "/api/records/123"),
        ("GET", "/api/workouts/abc"),
        ("PATCH", "/api/social/xyz/like"),
    ] {
        let (status, body) = send_json(&app, method, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(error_paths(&body), vec!["id"]);
    }
}

#[tokio::test]
async fn test_unknown_user_profile() {
    let (app, _) = create_test_app();

    let (status, body) = send_json(
        &app,
        "GET",
        "/api/users/0b6c1a52-7d0e-4c31-9f56-2a3b4c5d6e7f",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(error_paths(&body), vec!["general"]);
}

#[tokio::test]
async fn test_post_validation() {
    let (app, _) = create_test_app();
    let (_, token) = register_user(&app, "Ana", "a@x.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/social",
        Some(&token),
        Some(json!({
            "title": "Hey",
            "content": "short",
            "muscle_groups": ["Pecho", "Cardio"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_paths(&body),
        vec!["content", "muscle_groups", "title"]
    );

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/social",
        Some(&token),
        Some(json!({
            "title": "Too many tags",
            "content": "Six tags is more than allowed.",
            "muscle_groups": ["Pecho", "Espalda", "Deltoides", "Bíceps", "Tríceps", "Abdomen"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_password_change_requires_eight_characters() {
    let (app, _) = create_test_app();
    let (_, token) = register_user(&app, "Ana", "a@x.com").await;

    let (status, body) = send_json(
        &app,
        "PATCH",
        "/api/users/me/password",
        Some(&token),
        Some(json!({ "old_password": "secret123", "password": "short1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&body), vec!["password"]);
}
