// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social feed, post ownership and like toggle tests.

use axum::http::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

mod common;
use common::{create_test_app, register_user, send_json};

fn post_body(title: &str, tags: &[&str]) -> Value {
    json!({
        "title": title,
        "content": "Today I finally hit a new squat best.",
        "muscle_groups": tags,
    })
}

async fn create_post(app: &axum::Router, token: &str, title: &str, tags: &[&str]) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/social",
        Some(token),
        Some(post_body(title, tags)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    // Distinct creation timestamps keep recency ordering deterministic.
    tokio::time::sleep(Duration::from_millis(2)).await;
    body["id"].as_str().unwrap().to_string()
}

fn titles(feed: &Value) -> Vec<String> {
    feed.as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_like_toggle_scenario() {
    let (app, _) = create_test_app();
    let (_, a) = register_user(&app, "Ana", "a@x.com").await;
    let (_, b) = register_user(&app, "Bob", "b@x.com").await;

    let post_id = create_post(&app, &a, "Leg day recap", &["Cuádriceps"]).await;
    let uri = format!("/api/social/{post_id}/like");

    let (status, first) = send_json(&app, "PATCH", &uri, Some(&b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, json!({ "likes": 1, "is_liked": true }));

    let (_, second) = send_json(&app, "PATCH", &uri, Some(&b), None).await;
    assert_eq!(second, json!({ "likes": 0, "is_liked": false }));
}

#[tokio::test]
async fn test_concurrent_likes_from_many_users() {
    let (app, _) = create_test_app();
    let (_, author) = register_user(&app, "Ana", "author@x.com").await;
    let post_id = create_post(&app, &author, "Pull day recap", &["Espalda"]).await;

    let mut tokens = Vec::new();
    for i in 0..8 {
        let (_, token) = register_user(&app, "Fan", &format!("fan{i}@x.com")).await;
        tokens.push(token);
    }

    let uri = format!("/api/social/{post_id}/like");
    let handles: Vec<_> = tokens
        .into_iter()
        .map(|token| {
            let app = app.clone();
            let uri = uri.clone();
            tokio::spawn(async move { send_json(&app, "PATCH", &uri, Some(&token), None).await })
        })
        .collect();
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let (_, feed) = send_json(&app, "GET", "/api/social", Some(&author), None).await;
    assert_eq!(feed[0]["likes"], 8);
    assert_eq!(feed[0]["is_liked"], false);
}

#[tokio::test]
async fn test_like_missing_post() {
    let (app, _) = create_test_app();
    let (_, token) = register_user(&app, "Ana", "a@x.com").await;

    let (status, _) = send_json(
        &app,
        "PATCH",
        "/api/social/6f1c2a4e-1111-4222-8333-444455556666/like",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feed_carries_author_and_viewer_state() {
    let (app, _) = create_test_app();
    let (ana_id, ana) = register_user(&app, "Ana", "a@x.com").await;
    let (_, bob) = register_user(&app, "Bob", "b@x.com").await;

    let post_id = create_post(&app, &ana, "Chest day notes", &["Pecho", "Pecho", "Tríceps"]).await;
    send_json(
        &app,
        "PATCH",
        &format!("/api/social/{post_id}/like"),
        Some(&bob),
        None,
    )
    .await;

    let (_, bob_feed) = send_json(&app, "GET", "/api/social", Some(&bob), None).await;
    let item = &bob_feed[0];
    assert_eq!(item["author"]["id"], ana_id.as_str());
    assert_eq!(item["author"]["name"], "Ana");
    assert!(item["author"].get("email").is_none());
    assert_eq!(item["muscle_groups"], json!(["Pecho", "Tríceps"]));
    assert_eq!(item["likes"], 1);
    assert_eq!(item["is_liked"], true);

    let (_, ana_feed) = send_json(&app, "GET", "/api/social", Some(&ana), None).await;
    assert_eq!(ana_feed[0]["is_liked"], false);
}

#[tokio::test]
async fn test_feed_sort_filter_and_search() {
    let (app, _) = create_test_app();
    let (_, ana) = register_user(&app, "Ana", "a@x.com").await;
    let (_, bob) = register_user(&app, "Bob", "b@x.com").await;

    create_post(&app, &ana, "First chest post", &["Pecho"]).await;
    let popular = create_post(&app, &ana, "Second back post", &["Espalda"]).await;
    create_post(&app, &ana, "Third chest post", &["Pecho"]).await;

    send_json(
        &app,
        "PATCH",
        &format!("/api/social/{popular}/like"),
        Some(&bob),
        None,
    )
    .await;

    let (_, recent) = send_json(&app, "GET", "/api/social", Some(&ana), None).await;
    assert_eq!(
        titles(&recent),
        vec!["Third chest post", "Second back post", "First chest post"]
    );

    let (_, oldest) = send_json(&app, "GET", "/api/social?sort=oldest", Some(&ana), None).await;
    assert_eq!(titles(&oldest)[0], "First chest post");

    // Popular ties fall back to newest first.
    let (_, popular_feed) =
        send_json(&app, "GET", "/api/social?sort=popular", Some(&ana), None).await;
    assert_eq!(
        titles(&popular_feed),
        vec!["Second back post", "Third chest post", "First chest post"]
    );

    let (_, chest) = send_json(&app, "GET", "/api/social?muscle=Pecho", Some(&ana), None).await;
    assert_eq!(titles(&chest), vec!["Third chest post", "First chest post"]);

    let (_, search) = send_json(&app, "GET", "/api/social?search=BACK", Some(&ana), None).await;
    assert_eq!(titles(&search), vec!["Second back post"]);
}

#[tokio::test]
async fn test_feed_query_validation() {
    let (app, _) = create_test_app();
    let (_, token) = register_user(&app, "Ana", "a@x.com").await;

    for uri in [
        "/api/social?sort=random",
        "/api/social?muscle=Cardio",
        "/api/social?page=0",
        "/api/social?limit=101",
        "/api/social?limit=abc",
    ] {
        let (status, body) = send_json(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} -> {body}");
        assert_eq!(body["status"], "error");
    }
}

#[tokio::test]
async fn test_posts_of_deleted_authors_are_hidden() {
    let (app, _) = create_test_app();
    let (_, ana) = register_user(&app, "Ana", "a@x.com").await;
    let (_, bob) = register_user(&app, "Bob", "b@x.com").await;

    create_post(&app, &ana, "Ana was here", &["Pecho"]).await;
    create_post(&app, &bob, "Bob was here", &["Pecho"]).await;
    send_json(&app, "DELETE", "/api/users/me", Some(&bob), None).await;

    let (_, feed) = send_json(&app, "GET", "/api/social", Some(&ana), None).await;
    assert_eq!(titles(&feed), vec!["Ana was here"]);
}

#[tokio::test]
async fn test_post_edit_and_delete_are_author_scoped() {
    let (app, _) = create_test_app();
    let (_, ana) = register_user(&app, "Ana", "a@x.com").await;
    let (_, bob) = register_user(&app, "Bob", "b@x.com").await;

    let post_id = create_post(&app, &ana, "Original title", &["Pecho"]).await;
    let uri = format!("/api/social/{post_id}");

    // Another user's post looks absent.
    let (status, _) = send_json(
        &app,
        "PATCH",
        &uri,
        Some(&bob),
        Some(json!({ "title": "Hijacked title" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send_json(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, patched) = send_json(
        &app,
        "PATCH",
        &uri,
        Some(&ana),
        Some(json!({ "title": "  Edited title  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Edited title");
    assert_eq!(patched["muscle_groups"], json!(["Pecho"]));

    let (status, replaced) = send_json(
        &app,
        "PUT",
        &uri,
        Some(&ana),
        Some(post_body("Replaced title", &["Espalda"])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["title"], "Replaced title");
    assert_eq!(replaced["muscle_groups"], json!(["Espalda"]));

    // PUT requires the full payload.
    let (status, _) = send_json(
        &app,
        "PUT",
        &uri,
        Some(&ana),
        Some(json!({ "title": "Only a title" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // PATCH requires at least one field.
    let (status, _) = send_json(&app, "PATCH", &uri, Some(&ana), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, "DELETE", &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, feed) = send_json(&app, "GET", "/api/social", Some(&ana), None).await;
    assert_eq!(feed, json!([]));
}
