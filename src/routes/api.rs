// SPDX-License-Identifier: MIT

//! Current-user route.

use crate::error::{AppError, Result};
use crate::middleware::auth::Principal;
use crate::store::LedgerStore;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

/// Current user response.
#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub points: u64,
}

/// Get the authenticated caller's user record. The identity comes from
/// the principal, never from a caller-supplied argument.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<MeResponse>> {
    let user = state
        .store
        .get_user(&principal.user_id)
        .await?
        .ok_or_else(|| {
            AppError::InvariantViolation(format!(
                "principal {} has no user record",
                principal.user_id
            ))
        })?;

    Ok(Json(MeResponse {
        user_id: user.id,
        email: user.email,
        points: user.points,
    }))
}
