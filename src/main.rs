// SPDX-License-Identifier: MIT

//! Questboard API Server

use questboard::{
    config::{Config, StoreBackend},
    store::{FirestoreStore, LedgerStore, MemoryStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Questboard API");

    if config.auth_bypass {
        // Config::from_env already refused this in production; still make
        // it impossible to miss in the logs.
        tracing::warn!(
            operator = %config.auth_bypass_email,
            "AUTH BYPASS ENABLED: credential verification is OFF, all requests act as the operator"
        );
    }

    let store: Arc<dyn LedgerStore> = match config.store_backend {
        StoreBackend::Firestore => {
            let store = FirestoreStore::new(&config.gcp_project_id)
                .await
                .expect("Failed to connect to Firestore");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; all data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = Arc::new(AppState::new(config.clone(), store));
    let app = questboard::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("questboard=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
