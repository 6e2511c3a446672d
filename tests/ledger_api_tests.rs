// SPDX-License-Identifier: MIT

//! End-to-end ledger scenarios through the real router.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{auth_token, body_json, create_test_app, send_json};

#[tokio::test]
async fn completing_a_task_credits_the_caller() {
    let (app, state) = create_test_app();
    let token = auth_token(&state, "worker@example.com");

    let response = send_json(
        &app,
        &token,
        "POST",
        "/api/tasks",
        Some(json!({"title": "Clean desk", "points": 10})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await;
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["done"], false);
    assert_eq!(task["importance"], "normal");

    let response = send_json(
        &app,
        &token,
        "POST",
        &format!("/api/tasks/{}/complete", task_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], true);
    assert_eq!(result["balance"], 10);

    let me = body_json(send_json(&app, &token, "GET", "/api/me", None).await).await;
    assert_eq!(me["points"], 10);
}

#[tokio::test]
async fn completing_twice_credits_once() {
    let (app, state) = create_test_app();
    let token = auth_token(&state, "eager@example.com");

    let task = body_json(
        send_json(
            &app,
            &token,
            "POST",
            "/api/tasks",
            Some(json!({"title": "Water plants", "points": 7})),
        )
        .await,
    )
    .await;
    let uri = format!("/api/tasks/{}/complete", task["id"].as_str().unwrap());

    let first = body_json(send_json(&app, &token, "POST", &uri, None).await).await;
    assert_eq!(first["success"], true);

    let second = body_json(send_json(&app, &token, "POST", &uri, None).await).await;
    assert_eq!(second["success"], false);
    assert_eq!(second["message"], "task already completed");

    let me = body_json(send_json(&app, &token, "GET", "/api/me", None).await).await;
    assert_eq!(me["points"], 7);
}

#[tokio::test]
async fn underfunded_purchase_leaves_balance_untouched() {
    let (app, state) = create_test_app();
    let token = auth_token(&state, "saver@example.com");

    // Earn 10 points.
    let task = body_json(
        send_json(
            &app,
            &token,
            "POST",
            "/api/tasks",
            Some(json!({"title": "Small chore", "points": 10})),
        )
        .await,
    )
    .await;
    send_json(
        &app,
        &token,
        "POST",
        &format!("/api/tasks/{}/complete", task["id"].as_str().unwrap()),
        None,
    )
    .await;

    // A 20-point reward is out of reach.
    let reward = body_json(
        send_json(
            &app,
            &token,
            "POST",
            "/api/rewards",
            Some(json!({"title": "Movie night", "points": 20})),
        )
        .await,
    )
    .await;

    let response = send_json(
        &app,
        &token,
        "POST",
        &format!("/api/rewards/{}/buy", reward["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert_eq!(result["message"], "insufficient balance");

    let me = body_json(send_json(&app, &token, "GET", "/api/me", None).await).await;
    assert_eq!(me["points"], 10);
}

#[tokio::test]
async fn affordable_purchase_debits_the_cost() {
    let (app, state) = create_test_app();
    let token = auth_token(&state, "spender@example.com");

    let task = body_json(
        send_json(
            &app,
            &token,
            "POST",
            "/api/tasks",
            Some(json!({"title": "Big project", "points": 50, "importance": "uber_high"})),
        )
        .await,
    )
    .await;
    send_json(
        &app,
        &token,
        "POST",
        &format!("/api/tasks/{}/complete", task["id"].as_str().unwrap()),
        None,
    )
    .await;

    let reward = body_json(
        send_json(
            &app,
            &token,
            "POST",
            "/api/rewards",
            Some(json!({"title": "Coffee", "points": 30})),
        )
        .await,
    )
    .await;

    let result = body_json(
        send_json(
            &app,
            &token,
            "POST",
            &format!("/api/rewards/{}/buy", reward["id"].as_str().unwrap()),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(result["success"], true);
    assert_eq!(result["balance"], 20);
}

#[tokio::test]
async fn completing_unknown_task_is_a_negative_result_not_an_error() {
    let (app, state) = create_test_app();
    let token = auth_token(&state, "lost@example.com");

    let response = send_json(&app, &token, "POST", "/api/tasks/no-such-id/complete", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert_eq!(result["message"], "task not found");
}

#[tokio::test]
async fn buying_unknown_reward_is_a_negative_result() {
    let (app, state) = create_test_app();
    let token = auth_token(&state, "lost@example.com");

    let response = send_json(&app, &token, "POST", "/api/rewards/no-such-id/buy", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert_eq!(result["message"], "reward not found");
}

#[tokio::test]
async fn crud_edit_and_delete_round_trip() {
    let (app, state) = create_test_app();
    let token = auth_token(&state, "admin@example.com");

    let task = body_json(
        send_json(
            &app,
            &token,
            "POST",
            "/api/tasks",
            Some(json!({"title": "Draft", "points": 1, "importance": "low"})),
        )
        .await,
    )
    .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let edited = body_json(
        send_json(
            &app,
            &token,
            "PATCH",
            &format!("/api/tasks/{}", task_id),
            Some(json!({"title": "Final", "points": 3})),
        )
        .await,
    )
    .await;
    assert_eq!(edited["title"], "Final");
    assert_eq!(edited["points"], 3);
    assert_eq!(edited["importance"], "low");

    let listed = body_json(send_json(&app, &token, "GET", "/api/tasks", None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = send_json(
        &app,
        &token,
        "DELETE",
        &format!("/api/tasks/{}", task_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_json(
        &app,
        &token,
        "PATCH",
        &format!("/api/tasks/{}", task_id),
        Some(json!({"title": "Ghost"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let (app, state) = create_test_app();
    let token = auth_token(&state, "admin@example.com");

    let response = send_json(
        &app,
        &token,
        "POST",
        "/api/tasks",
        Some(json!({"title": "", "points": 5})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
