// SPDX-License-Identifier: MIT

//! Firestore ledger store.
//!
//! Document layout:
//! - `users/{url-encoded email}` — one document per email, so duplicate
//!   provisioning is structurally impossible; the opaque `id` field is
//!   what principals and the API carry around.
//! - `tasks/{uuid}`, `rewards/{uuid}`.
//!
//! The balance-touching operations use `run_transaction`, whose closure
//! receives a transaction-bound client: reads issued through it join the
//! transaction's read set, so a commit fails (and retries against fresh
//! data) if the done flag or the balance changed underneath us. A plain
//! `begin_transaction` with reads on the outer client would stage blind
//! writes with no conflict check, which is exactly the lost-update shape
//! these operations exist to rule out.

use crate::error::AppError;
use crate::models::{Reward, RewardPatch, Task, TaskPatch, User};
use crate::store::{collections, CompletionOutcome, DebitOutcome, LedgerStore};
use async_trait::async_trait;

/// Firestore-backed store.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Connect to Firestore.
    ///
    /// For local development with the emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::connect_emulator(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Connect to the emulator with a dummy token source, avoiding local
    /// credential lookups entirely.
    async fn connect_emulator(project_id: &str) -> Result<Self, AppError> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| AppError::Store(format!("Failed to connect to emulator: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore (emulator)");

        Ok(Self { client })
    }

    /// Users are keyed by their url-encoded email.
    fn user_doc_id(email: &str) -> String {
        urlencoding::encode(email).into_owned()
    }

    /// Fetch a user by the opaque `id` field through the given client.
    /// Inside `run_transaction` the query joins the transaction when the
    /// transaction-bound client is passed.
    async fn query_user(
        db: &firestore::FirestoreDb,
        user_id: &str,
    ) -> firestore::FirestoreResult<Option<User>> {
        let user_id = user_id.to_string();
        let mut matches: Vec<User> = db
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("id").eq(user_id.clone())]))
            .limit(1)
            .obj()
            .query()
            .await?;
        Ok(matches.pop())
    }
}

#[async_trait]
impl LedgerStore for FirestoreStore {
    // ─── Users ───────────────────────────────────────────────────

    async fn find_or_create_user(&self, email: &str) -> Result<User, AppError> {
        let email = email.to_string();

        // The existence read joins the transaction, so of two concurrent
        // first-logins only one create commits; the loser's retry
        // re-reads and returns the winner's record.
        let user = self
            .client
            .run_transaction(|db, transaction| {
                let email = email.clone();
                Box::pin(async move {
                    let doc_id = FirestoreStore::user_doc_id(&email);
                    let existing: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&doc_id)
                        .await?;

                    if let Some(user) = existing {
                        return Ok(user);
                    }

                    let user = User::provision(&email);
                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&doc_id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok(user)
                })
            })
            .await
            .map_err(|e| AppError::Store(format!("User provisioning failed: {}", e)))?;

        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Self::query_user(&self.client, user_id)
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    // ─── Tasks ───────────────────────────────────────────────────

    async fn get_task(&self, task_id: &str) -> Result<Option<Task>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::TASKS)
            .obj()
            .one(task_id)
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::TASKS)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::TASKS)
            .document_id(&task.id)
            .object(task)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(())
    }

    async fn update_task(
        &self,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        // Plain read-modify-write: edits carry no ledger invariant.
        let Some(mut task) = self.get_task(task_id).await? else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(points) = patch.points {
            task.points = points;
        }
        if let Some(importance) = patch.importance {
            task.importance = importance;
        }
        self.insert_task(&task).await?;
        Ok(Some(task))
    }

    async fn delete_task(&self, task_id: &str) -> Result<bool, AppError> {
        if self.get_task(task_id).await?.is_none() {
            return Ok(false);
        }
        self.client
            .fluent()
            .delete()
            .from(collections::TASKS)
            .document_id(task_id)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(true)
    }

    async fn complete_task(
        &self,
        task_id: &str,
        user_id: &str,
    ) -> Result<CompletionOutcome, AppError> {
        let task_id = task_id.to_string();
        let user_id = user_id.to_string();

        let outcome = self
            .client
            .run_transaction(|db, transaction| {
                let task_id = task_id.clone();
                let user_id = user_id.clone();
                Box::pin(async move {
                    let task: Option<Task> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::TASKS)
                        .obj()
                        .one(&task_id)
                        .await?;

                    let Some(task) = task else {
                        return Ok(CompletionOutcome::TaskNotFound);
                    };
                    if task.done {
                        return Ok(CompletionOutcome::AlreadyDone);
                    }

                    let Some(user) = FirestoreStore::query_user(&db, &user_id).await? else {
                        return Ok(CompletionOutcome::UserMissing);
                    };

                    let done_task = Task {
                        done: true,
                        ..task.clone()
                    };
                    let credited_user = User {
                        points: user.points + task.points,
                        ..user
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::TASKS)
                        .document_id(&done_task.id)
                        .object(&done_task)
                        .add_to_transaction(transaction)?;

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(FirestoreStore::user_doc_id(&credited_user.email))
                        .object(&credited_user)
                        .add_to_transaction(transaction)?;

                    Ok(CompletionOutcome::Credited {
                        new_balance: credited_user.points,
                    })
                })
            })
            .await
            .map_err(|e| AppError::Store(format!("Completion transaction failed: {}", e)))?;

        if let CompletionOutcome::Credited { new_balance } = &outcome {
            tracing::info!(
                task_id = %task_id,
                user_id = %user_id,
                new_balance,
                "Task completed and credited"
            );
        }

        Ok(outcome)
    }

    // ─── Rewards ─────────────────────────────────────────────────

    async fn get_reward(&self, reward_id: &str) -> Result<Option<Reward>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::REWARDS)
            .obj()
            .one(reward_id)
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn list_rewards(&self) -> Result<Vec<Reward>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::REWARDS)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn insert_reward(&self, reward: &Reward) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::REWARDS)
            .document_id(&reward.id)
            .object(reward)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(())
    }

    async fn update_reward(
        &self,
        reward_id: &str,
        patch: RewardPatch,
    ) -> Result<Option<Reward>, AppError> {
        let Some(mut reward) = self.get_reward(reward_id).await? else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            reward.title = title;
        }
        if let Some(points) = patch.points {
            reward.points = points;
        }
        self.insert_reward(&reward).await?;
        Ok(Some(reward))
    }

    async fn delete_reward(&self, reward_id: &str) -> Result<bool, AppError> {
        if self.get_reward(reward_id).await?.is_none() {
            return Ok(false);
        }
        self.client
            .fluent()
            .delete()
            .from(collections::REWARDS)
            .document_id(reward_id)
            .execute()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(true)
    }

    async fn debit_points(&self, user_id: &str, cost: u64) -> Result<DebitOutcome, AppError> {
        let user_id = user_id.to_string();

        // The balance read joins the transaction: of two concurrent
        // debits that are jointly unaffordable, the second commit
        // conflicts, retries, re-reads the drained balance, and refuses.
        let outcome = self
            .client
            .run_transaction(|db, transaction| {
                let user_id = user_id.clone();
                Box::pin(async move {
                    let Some(user) = FirestoreStore::query_user(&db, &user_id).await? else {
                        return Ok(DebitOutcome::UserMissing);
                    };

                    if user.points < cost {
                        return Ok(DebitOutcome::InsufficientBalance {
                            balance: user.points,
                        });
                    }

                    let debited = User {
                        points: user.points - cost,
                        ..user
                    };

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(FirestoreStore::user_doc_id(&debited.email))
                        .object(&debited)
                        .add_to_transaction(transaction)?;

                    Ok(DebitOutcome::Debited {
                        new_balance: debited.points,
                    })
                })
            })
            .await
            .map_err(|e| AppError::Store(format!("Debit transaction failed: {}", e)))?;

        if let DebitOutcome::Debited { new_balance } = &outcome {
            tracing::info!(
                user_id = %user_id,
                cost,
                new_balance,
                "Balance debited"
            );
        }

        Ok(outcome)
    }
}
