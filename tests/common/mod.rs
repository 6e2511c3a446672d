// SPDX-License-Identifier: MIT

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use questboard::config::Config;
use questboard::middleware::auth::create_token;
use questboard::routes::create_router;
use questboard::store::MemoryStore;
use questboard::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config, store));
    (create_router(state.clone()), state)
}

/// Mint a bearer token accepted by the test app.
#[allow(dead_code)]
pub fn auth_token(state: &AppState, email: &str) -> String {
    create_token(email, &state.config.jwt_signing_key).expect("Failed to create test token")
}

/// Send an authenticated JSON request and return the response.
#[allow(dead_code)]
pub async fn send_json(
    app: &axum::Router,
    token: &str,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
