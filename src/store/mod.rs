// SPDX-License-Identifier: MIT

//! Ledger store boundary.
//!
//! Everything the handlers need from persistence, expressed as a trait so
//! the production Firestore backend and the in-memory test double are
//! interchangeable. The balance-touching operations are single conditional
//! operations: the store either applies the whole read-modify-write or
//! none of it, which is what makes concurrent completions and purchases
//! safe and whole-request retries harmless.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Reward, RewardPatch, Task, TaskPatch, User};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TASKS: &str = "tasks";
    pub const REWARDS: &str = "rewards";
}

/// Result of a conditional task completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The done flag flipped false → true and the credit landed.
    Credited { new_balance: u64 },
    /// The task was already done; no credit applied.
    AlreadyDone,
    TaskNotFound,
    /// Principal resolved but no backing user record exists.
    UserMissing,
}

/// Result of a conditional balance debit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebitOutcome {
    Debited { new_balance: u64 },
    /// Balance was below the cost; nothing changed.
    InsufficientBalance { balance: u64 },
    UserMissing,
}

/// Document persistence as seen by the handlers.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    /// Look up a user by email, creating one with balance 0 if absent.
    ///
    /// Must be atomic per email: concurrent first-logins with the same
    /// new email return the same single record.
    async fn find_or_create_user(&self, email: &str) -> Result<User, AppError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    // ─── Tasks ───────────────────────────────────────────────────

    async fn get_task(&self, task_id: &str) -> Result<Option<Task>, AppError>;
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError>;
    async fn insert_task(&self, task: &Task) -> Result<(), AppError>;
    /// Apply a partial update; `None` if the task does not exist.
    async fn update_task(&self, task_id: &str, patch: TaskPatch)
        -> Result<Option<Task>, AppError>;
    /// Returns false if the task did not exist.
    async fn delete_task(&self, task_id: &str) -> Result<bool, AppError>;

    /// Mark the task done and credit its points to the user, as one
    /// conditional operation guarded by the done flag.
    async fn complete_task(
        &self,
        task_id: &str,
        user_id: &str,
    ) -> Result<CompletionOutcome, AppError>;

    // ─── Rewards ─────────────────────────────────────────────────

    async fn get_reward(&self, reward_id: &str) -> Result<Option<Reward>, AppError>;
    async fn list_rewards(&self) -> Result<Vec<Reward>, AppError>;
    async fn insert_reward(&self, reward: &Reward) -> Result<(), AppError>;
    async fn update_reward(
        &self,
        reward_id: &str,
        patch: RewardPatch,
    ) -> Result<Option<Reward>, AppError>;
    async fn delete_reward(&self, reward_id: &str) -> Result<bool, AppError>;

    /// Debit `cost` from the user's balance only if balance ≥ cost.
    async fn debit_points(&self, user_id: &str, cost: u64) -> Result<DebitOutcome, AppError>;
}
