// SPDX-License-Identifier: MIT

//! In-memory ledger store for tests and local development.
//!
//! Backed by `DashMap`. Every conditional operation does its whole
//! read-modify-write while holding the relevant entry lock and never
//! awaits while holding it, so the per-entity serializability the
//! handlers rely on holds here exactly as it does for the Firestore
//! transactions in production.

use crate::error::AppError;
use crate::models::{Reward, RewardPatch, Task, TaskPatch, User};
use crate::store::{CompletionOutcome, DebitOutcome, LedgerStore};
use async_trait::async_trait;
use dashmap::DashMap;

/// In-process store. Users are keyed by email so lookup-or-create is a
/// single `entry` call and duplicate provisioning is structurally
/// impossible.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    tasks: DashMap<String, Task>,
    rewards: DashMap<String, Reward>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn find_or_create_user(&self, email: &str) -> Result<User, AppError> {
        let user = self
            .users
            .entry(email.to_string())
            .or_insert_with(|| User::provision(email));
        Ok(user.clone())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().id == user_id)
            .map(|entry| entry.value().clone()))
    }

    async fn get_task(&self, task_id: &str) -> Result<Option<Task>, AppError> {
        Ok(self.tasks.get(task_id).map(|entry| entry.value().clone()))
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self.tasks.iter().map(|e| e.value().clone()).collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn update_task(
        &self,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let Some(mut entry) = self.tasks.get_mut(task_id) else {
            return Ok(None);
        };
        let task = entry.value_mut();
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(points) = patch.points {
            task.points = points;
        }
        if let Some(importance) = patch.importance {
            task.importance = importance;
        }
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, task_id: &str) -> Result<bool, AppError> {
        Ok(self.tasks.remove(task_id).is_some())
    }

    async fn complete_task(
        &self,
        task_id: &str,
        user_id: &str,
    ) -> Result<CompletionOutcome, AppError> {
        // Users are never deleted, so checking for the user before the
        // flip cannot strand a flipped task without its credit.
        if self.users.iter().all(|entry| entry.value().id != user_id) {
            return Ok(CompletionOutcome::UserMissing);
        }

        // The entry lock serializes concurrent completions of one task;
        // only the caller that sees done == false flips it and credits.
        let points = {
            let Some(mut entry) = self.tasks.get_mut(task_id) else {
                return Ok(CompletionOutcome::TaskNotFound);
            };
            let task = entry.value_mut();
            if task.done {
                return Ok(CompletionOutcome::AlreadyDone);
            }
            task.done = true;
            task.points
        };

        let mut user_entry = self
            .users
            .iter_mut()
            .find(|entry| entry.value().id == user_id)
            .ok_or_else(|| {
                AppError::InvariantViolation(format!("user {user_id} vanished mid-credit"))
            })?;
        let user = user_entry.value_mut();
        user.points += points;
        Ok(CompletionOutcome::Credited {
            new_balance: user.points,
        })
    }

    async fn get_reward(&self, reward_id: &str) -> Result<Option<Reward>, AppError> {
        Ok(self.rewards.get(reward_id).map(|entry| entry.value().clone()))
    }

    async fn list_rewards(&self) -> Result<Vec<Reward>, AppError> {
        let mut rewards: Vec<Reward> = self.rewards.iter().map(|e| e.value().clone()).collect();
        rewards.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rewards)
    }

    async fn insert_reward(&self, reward: &Reward) -> Result<(), AppError> {
        self.rewards.insert(reward.id.clone(), reward.clone());
        Ok(())
    }

    async fn update_reward(
        &self,
        reward_id: &str,
        patch: RewardPatch,
    ) -> Result<Option<Reward>, AppError> {
        let Some(mut entry) = self.rewards.get_mut(reward_id) else {
            return Ok(None);
        };
        let reward = entry.value_mut();
        if let Some(title) = patch.title {
            reward.title = title;
        }
        if let Some(points) = patch.points {
            reward.points = points;
        }
        Ok(Some(reward.clone()))
    }

    async fn delete_reward(&self, reward_id: &str) -> Result<bool, AppError> {
        Ok(self.rewards.remove(reward_id).is_some())
    }

    async fn debit_points(&self, user_id: &str, cost: u64) -> Result<DebitOutcome, AppError> {
        // Check and debit under the entry lock: two concurrent purchases
        // that are jointly unaffordable cannot both pass the balance check.
        let Some(mut entry) = self
            .users
            .iter_mut()
            .find(|entry| entry.value().id == user_id)
        else {
            return Ok(DebitOutcome::UserMissing);
        };
        let user = entry.value_mut();
        if user.points < cost {
            return Ok(DebitOutcome::InsufficientBalance {
                balance: user.points,
            });
        }
        user.points -= cost;
        Ok(DebitOutcome::Debited {
            new_balance: user.points,
        })
    }
}
