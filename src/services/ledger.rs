// SPDX-License-Identifier: MIT

//! Points ledger: task completion credits and reward purchase debits.
//!
//! Business-rule failures (missing task/reward, already completed,
//! insufficient balance) come back as negative `ActionResult`s, never as
//! errors; only authentication and system faults propagate as `AppError`.

use crate::error::AppError;
use crate::middleware::auth::Principal;
use crate::store::{CompletionOutcome, DebitOutcome, LedgerStore};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a ledger mutation.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    /// Current balance after the operation, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
}

impl ActionResult {
    fn ok(message: impl Into<String>, balance: u64) -> Self {
        Self {
            success: true,
            message: message.into(),
            balance: Some(balance),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            balance: None,
        }
    }
}

/// The ledger handlers. Thin on purpose: the conditional semantics live
/// in the store operations, this layer maps outcomes to API results.
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Mark a task done exactly once and credit its points to the caller.
    pub async fn complete_task(
        &self,
        task_id: &str,
        principal: &Principal,
    ) -> Result<ActionResult, AppError> {
        match self.store.complete_task(task_id, &principal.user_id).await? {
            CompletionOutcome::Credited { new_balance } => {
                tracing::info!(
                    task_id,
                    user_id = %principal.user_id,
                    new_balance,
                    "Task completed"
                );
                Ok(ActionResult::ok("task completed", new_balance))
            }
            CompletionOutcome::AlreadyDone => Ok(ActionResult::failed("task already completed")),
            CompletionOutcome::TaskNotFound => Ok(ActionResult::failed("task not found")),
            // Unreachable when the principal came from the resolver,
            // which provisions the user record it names.
            CompletionOutcome::UserMissing => Err(AppError::InvariantViolation(format!(
                "principal {} has no user record",
                principal.user_id
            ))),
        }
    }

    /// Debit the caller's balance for a reward, only if it covers the cost.
    pub async fn buy_reward(
        &self,
        reward_id: &str,
        principal: &Principal,
    ) -> Result<ActionResult, AppError> {
        let Some(reward) = self.store.get_reward(reward_id).await? else {
            return Ok(ActionResult::failed("reward not found"));
        };

        match self.store.debit_points(&principal.user_id, reward.points).await? {
            DebitOutcome::Debited { new_balance } => {
                tracing::info!(
                    reward_id,
                    user_id = %principal.user_id,
                    cost = reward.points,
                    new_balance,
                    "Reward purchased"
                );
                Ok(ActionResult::ok("reward purchased", new_balance))
            }
            DebitOutcome::InsufficientBalance { .. } => {
                Ok(ActionResult::failed("insufficient balance"))
            }
            DebitOutcome::UserMissing => Err(AppError::InvariantViolation(format!(
                "principal {} has no user record",
                principal.user_id
            ))),
        }
    }
}
