// SPDX-License-Identifier: MIT

//! Questboard: a gamified task tracker backend.
//!
//! Users complete tasks to earn points and spend points on rewards. The
//! interesting parts are identity resolution (bearer token → lazily
//! provisioned user) and the points ledger, whose mutations are single
//! conditional store operations so balances never go negative and a task
//! never credits twice.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use config::Config;
use services::LedgerService;
use std::sync::Arc;
use store::LedgerStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn LedgerStore>,
    pub ledger: LedgerService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn LedgerStore>) -> Self {
        let ledger = LedgerService::new(store.clone());
        Self {
            config,
            store,
            ledger,
        }
    }
}
