// SPDX-License-Identifier: MIT

//! Reward CRUD and purchase routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::Principal;
use crate::models::{Reward, RewardPatch};
use crate::services::ActionResult;
use crate::store::LedgerStore;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rewards", get(list_rewards).post(add_reward))
        .route("/api/rewards/{id}", patch(edit_reward).delete(delete_reward))
        .route("/api/rewards/{id}/buy", post(buy_reward))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddRewardRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub points: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditRewardRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub points: Option<u64>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

async fn list_rewards(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Reward>>> {
    Ok(Json(state.store.list_rewards().await?))
}

async fn add_reward(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddRewardRequest>,
) -> Result<Json<Reward>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let reward = Reward::new(payload.title, payload.points);
    state.store.insert_reward(&reward).await?;

    tracing::debug!(reward_id = %reward.id, cost = reward.points, "Reward created");
    Ok(Json(reward))
}

async fn edit_reward(
    State(state): State<Arc<AppState>>,
    Path(reward_id): Path<String>,
    Json(payload): Json<EditRewardRequest>,
) -> Result<Json<Reward>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let patch = RewardPatch {
        title: payload.title,
        points: payload.points,
    };

    state
        .store
        .update_reward(&reward_id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Reward {} not found", reward_id)))
}

async fn delete_reward(
    State(state): State<Arc<AppState>>,
    Path(reward_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.store.delete_reward(&reward_id).await? {
        return Err(AppError::NotFound(format!(
            "Reward {} not found",
            reward_id
        )));
    }
    Ok(Json(DeleteResponse { success: true }))
}

/// Buy a reward. Insufficient balance is a 200 with `success: false`
/// and the balance left untouched.
async fn buy_reward(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(reward_id): Path<String>,
) -> Result<Json<ActionResult>> {
    let result = state.ledger.buy_reward(&reward_id, &principal).await?;
    Ok(Json(result))
}
