// SPDX-License-Identifier: MIT

//! Concurrency properties of the ledger.
//!
//! These drive the service against the in-memory store from many tasks
//! at once; the conditional store operations must keep the ledger
//! consistent without any cooperation from the callers.

use questboard::middleware::auth::Principal;
use questboard::models::{Importance, Reward, Task};
use questboard::services::LedgerService;
use questboard::store::{LedgerStore, MemoryStore};
use std::sync::Arc;

const NUM_CONCURRENT: usize = 10;

fn principal_for(user: &questboard::models::User) -> Principal {
    Principal {
        user_id: user.id.clone(),
        email: user.email.clone(),
        claims: None,
    }
}

#[tokio::test]
async fn concurrent_completions_credit_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    let ledger = LedgerService::new(store.clone());
    let user = store.find_or_create_user("race@example.com").await.unwrap();
    let principal = principal_for(&user);

    let task = Task::new("Contested".to_string(), 25, Importance::High);
    store.insert_task(&task).await.unwrap();

    let mut handles = vec![];
    for _ in 0..NUM_CONCURRENT {
        let ledger = ledger.clone();
        let principal = principal.clone();
        let task_id = task.id.clone();
        handles.push(tokio::spawn(async move {
            ledger.complete_task(&task_id, &principal).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        let result = handle.await.expect("Task join failed").expect("Ledger op failed");
        if result.success {
            successes += 1;
        }
    }

    assert_eq!(successes, 1, "Exactly one completion must credit");
    let user = store.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(user.points, 25);
}

#[tokio::test]
async fn jointly_unaffordable_purchases_cannot_both_succeed() {
    let store = Arc::new(MemoryStore::new());
    let ledger = LedgerService::new(store.clone());
    let user = store.find_or_create_user("race@example.com").await.unwrap();
    let principal = principal_for(&user);

    // Fund the balance to 100.
    let task = Task::new("Payday".to_string(), 100, Importance::Normal);
    store.insert_task(&task).await.unwrap();
    ledger.complete_task(&task.id, &principal).await.unwrap();

    // Two rewards at 60 each: affordable alone, not together.
    let first = Reward::new("First".to_string(), 60);
    let second = Reward::new("Second".to_string(), 60);
    store.insert_reward(&first).await.unwrap();
    store.insert_reward(&second).await.unwrap();

    let buy = |reward_id: String| {
        let ledger = ledger.clone();
        let principal = principal.clone();
        tokio::spawn(async move { ledger.buy_reward(&reward_id, &principal).await })
    };

    let (a, b) = tokio::join!(buy(first.id.clone()), buy(second.id.clone()));
    let a = a.unwrap().unwrap();
    let b = b.unwrap().unwrap();

    assert_ne!(
        a.success, b.success,
        "Exactly one of the two purchases must succeed"
    );
    let loser = if a.success { &b } else { &a };
    assert_eq!(loser.message, "insufficient balance");

    let user = store.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(user.points, 40);
}

#[tokio::test]
async fn concurrent_first_logins_provision_one_user() {
    let store = Arc::new(MemoryStore::new());

    let mut handles = vec![];
    for _ in 0..NUM_CONCURRENT {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.find_or_create_user("new@example.com").await
        }));
    }

    let mut ids = vec![];
    for handle in handles {
        let user = handle.await.expect("Task join failed").expect("Provisioning failed");
        assert_eq!(user.points, 0);
        ids.push(user.id);
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 1, "All logins must resolve to one user record");
}

#[tokio::test]
async fn sequential_purchases_drain_the_balance_serially() {
    let store = Arc::new(MemoryStore::new());
    let ledger = LedgerService::new(store.clone());
    let user = store.find_or_create_user("steady@example.com").await.unwrap();
    let principal = principal_for(&user);

    let task = Task::new("Fund".to_string(), 90, Importance::Normal);
    store.insert_task(&task).await.unwrap();
    ledger.complete_task(&task.id, &principal).await.unwrap();

    let reward = Reward::new("Snack".to_string(), 40);
    store.insert_reward(&reward).await.unwrap();

    let first = ledger.buy_reward(&reward.id, &principal).await.unwrap();
    assert_eq!(first.balance, Some(50));
    let second = ledger.buy_reward(&reward.id, &principal).await.unwrap();
    assert_eq!(second.balance, Some(10));
    let third = ledger.buy_reward(&reward.id, &principal).await.unwrap();
    assert!(!third.success);

    let user = store.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(user.points, 10);
}
