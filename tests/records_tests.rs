// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strength record and leaderboard tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;
use common::{create_test_app, error_paths, register_user, send_json};

const BENCH: &str = "Press de Banca Plano";
const SQUAT: &str = "Sentadilla Libre con Barra";

fn record_body(exercise: &str, group: &str, weight: f64, reps: u32) -> Value {
    json!({
        "exercise_name": exercise,
        "muscle_group": group,
        "weight_used": weight,
        "reps_done": reps,
    })
}

#[tokio::test]
async fn test_personal_record_flag() {
    let (app, _) = create_test_app();
    let (_, token) = register_user(&app, "Ana", "ana@example.com").await;

    let (status, first) = send_json(
        &app,
        "POST",
        "/api/records",
        Some(&token),
        Some(record_body(BENCH, "Pecho", 100.0, 5)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["is_new_record"], true);
    let brzycki = first["brzycki_result"].as_f64().unwrap();
    assert!((brzycki - 100.0 / 0.8888).abs() < 1e-9);
    let epley = first["epley_result"].as_f64().unwrap();
    assert!((epley - 116.666_666).abs() < 1e-3);

    let (status, second) = send_json(
        &app,
        "POST",
        "/api/records",
        Some(&token),
        Some(record_body(BENCH, "Pecho", 90.0, 5)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["is_new_record"], false);
    assert!(second["brzycki_result"].as_f64().unwrap() < brzycki);

    // Equal to the best is not a new record.
    let (_, tie) = send_json(
        &app,
        "POST",
        "/api/records",
        Some(&token),
        Some(record_body(BENCH, "Pecho", 100.0, 5)),
    )
    .await;
    assert_eq!(tie["is_new_record"], false);
}

#[tokio::test]
async fn test_personal_record_is_per_user() {
    let (app, _) = create_test_app();
    let (_, ana) = register_user(&app, "Ana", "ana@example.com").await;
    let (_, bob) = register_user(&app, "Bob", "bob@example.com").await;

    send_json(
        &app,
        "POST",
        "/api/records",
        Some(&ana),
        Some(record_body(BENCH, "Pecho", 140.0, 3)),
    )
    .await;
    let (_, body) = send_json(
        &app,
        "POST",
        "/api/records",
        Some(&bob),
        Some(record_body(BENCH, "Pecho", 60.0, 8)),
    )
    .await;
    assert_eq!(body["is_new_record"], true);
}

#[tokio::test]
async fn test_client_supplied_results_rejected() {
    let (app, _) = create_test_app();
    let (_, token) = register_user(&app, "Ana", "ana@example.com").await;

    let mut body = record_body(BENCH, "Pecho", 100.0, 5);
    body["brzycki_result"] = json!(999.0);
    let (status, _) = send_json(&app, "POST", "/api/records", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_record_input_bounds() {
    let (app, _) = create_test_app();
    let (_, token) = register_user(&app, "Ana", "ana@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/records",
        Some(&token),
        Some(record_body(BENCH, "Pecho", 0.0, 21)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let paths = error_paths(&body);
    assert!(paths.contains(&"weight_used".to_string()));
    assert!(paths.contains(&"reps_done".to_string()));

    // Exercise from another muscle group.
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/records",
        Some(&token),
        Some(record_body(SQUAT, "Pecho", 100.0, 5)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Future date.
    let mut future = record_body(BENCH, "Pecho", 100.0, 5);
    future["date"] = json!("2999-01-01");
    let (status, body) = send_json(&app, "POST", "/api/records", Some(&token), Some(future)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_paths(&body).contains(&"date".to_string()));
}

#[tokio::test]
async fn test_numeric_strings_are_coerced() {
    let (app, _) = create_test_app();
    let (_, token) = register_user(&app, "Ana", "ana@example.com").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/records",
        Some(&token),
        Some(json!({
            "exercise_name": BENCH,
            "muscle_group": "Pecho",
            "weight_used": "100",
            "reps_done": "5",
            "date": "2024-03-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["weight_used"], 100.0);
    assert_eq!(body["reps_done"], 5);
    assert!(body["achieved_at"].as_str().unwrap().starts_with("2024-03-01"));
}

#[tokio::test]
async fn test_leaderboard_best_per_exercise() {
    let (app, _) = create_test_app();
    let (_, ana) = register_user(&app, "Ana", "ana@example.com").await;
    let (bob_id, bob) = register_user(&app, "Bob", "bob@example.com").await;

    for (token, exercise, group, weight, reps) in [
        (&ana, BENCH, "Pecho", 100.0, 5),
        (&bob, BENCH, "Pecho", 120.0, 3),
        (&ana, SQUAT, "Cuádriceps", 140.0, 5),
    ] {
        let (status, _) = send_json(
            &app,
            "POST",
            "/api/records",
            Some(token),
            Some(record_body(exercise, group, weight, reps)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, board) = send_json(&app, "GET", "/api/records/leaderboard", Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = board.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    // Ordered by exercise name.
    assert_eq!(entries[0]["exercise_name"], BENCH);
    assert_eq!(entries[1]["exercise_name"], SQUAT);

    // 120x3 (Brzycki ~127.1) beats 100x5 (~112.5).
    assert_eq!(entries[0]["user"]["id"], bob_id.as_str());
    assert_eq!(entries[0]["user"]["name"], "Bob");
    assert!(entries[0]["user"].get("email").is_none());
}

#[tokio::test]
async fn test_leaderboard_skips_deleted_owners() {
    let (app, _) = create_test_app();
    let (_, ana) = register_user(&app, "Ana", "ana@example.com").await;
    let (_, bob) = register_user(&app, "Bob", "bob@example.com").await;

    send_json(
        &app,
        "POST",
        "/api/records",
        Some(&bob),
        Some(record_body(BENCH, "Pecho", 150.0, 1)),
    )
    .await;
    send_json(&app, "DELETE", "/api/users/me", Some(&bob), None).await;

    let (_, board) = send_json(&app, "GET", "/api/records/leaderboard", Some(&ana), None).await;
    assert_eq!(board, json!([]));
}

#[tokio::test]
async fn test_list_and_delete_records_owner_scoped() {
    let (app, _) = create_test_app();
    let (_, ana) = register_user(&app, "Ana", "ana@example.com").await;
    let (_, bob) = register_user(&app, "Bob", "bob@example.com").await;

    let (_, older) = send_json(
        &app,
        "POST",
        "/api/records",
        Some(&ana),
        Some(json!({
            "exercise_name": BENCH,
            "muscle_group": "Pecho",
            "weight_used": 80,
            "reps_done": 5,
            "date": "2024-01-01",
        })),
    )
    .await;
    let (_, newer) = send_json(
        &app,
        "POST",
        "/api/records",
        Some(&ana),
        Some(record_body(BENCH, "Pecho", 85.0, 5)),
    )
    .await;

    let (_, list) = send_json(&app, "GET", "/api/records", Some(&ana), None).await;
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![newer["id"].as_str().unwrap(), older["id"].as_str().unwrap()]);

    let (_, bob_list) = send_json(&app, "GET", "/api/records", Some(&bob), None).await;
    assert_eq!(bob_list, json!([]));

    // Someone else's record looks absent.
    let uri = format!("/api/records/{}", older["id"].as_str().unwrap());
    let (status, _) = send_json(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, "DELETE", &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(&app, "DELETE", &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
