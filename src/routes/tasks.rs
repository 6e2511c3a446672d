// SPDX-License-Identifier: MIT

//! Task CRUD and completion routes.
//!
//! CRUD here has no ledger side effects; only `/complete` touches the
//! points balance, and that goes through `LedgerService`.

use crate::error::{AppError, Result};
use crate::middleware::auth::Principal;
use crate::models::{Importance, Task, TaskPatch};
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
        .route("/api/tasks", get(list_tasks).post(add_task))
        .route("/api/tasks/{id}", patch(edit_task).delete(delete_task))
        .route("/api/tasks/{id}/complete", post(complete_task))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddTaskRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub points: u64,
    #[serde(default)]
    pub importance: Importance,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditTaskRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub points: Option<u64>,
    pub importance: Option<Importance>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>> {
    Ok(Json(state.store.list_tasks().await?))
}

async fn add_task(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddTaskRequest>,
) -> Result<Json<Task>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let task = Task::new(payload.title, payload.points, payload.importance);
    state.store.insert_task(&task).await?;

    tracing::debug!(task_id = %task.id, points = task.points, "Task created");
    Ok(Json(task))
}

async fn edit_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(payload): Json<EditTaskRequest>,
) -> Result<Json<Task>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let patch = TaskPatch {
        title: payload.title,
        points: payload.points,
        importance: payload.importance,
    };

    state
        .store
        .update_task(&task_id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task_id)))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.store.delete_task(&task_id).await? {
        return Err(AppError::NotFound(format!("Task {} not found", task_id)));
    }
    Ok(Json(DeleteResponse { success: true }))
}

/// Complete a task, crediting its points to the caller at most once.
/// Negative outcomes (unknown task, already done) are 200s with
/// `success: false`, not transport errors.
async fn complete_task(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(task_id): Path<String>,
) -> Result<Json<ActionResult>> {
    let result = state.ledger.complete_task(&task_id, &principal).await?;
    Ok(Json(result))
}
