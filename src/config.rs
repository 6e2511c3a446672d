//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup and carried in `AppState`; nothing reads the
//! environment after boot.

use std::env;

/// Deployment posture. Controls which auth shortcuts are even loadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Production,
    Development,
}

/// Which persistence backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Firestore (production). Uses `GCP_PROJECT_ID`, or the emulator
    /// when `FIRESTORE_EMULATOR_HOST` is set.
    Firestore,
    /// In-process memory store for local development and tests.
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// JWT verification key for bearer tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Production vs development posture
    pub deployment: DeploymentMode,
    /// Skip credential verification and act as `auth_bypass_email`.
    /// Only loadable in a development deployment; see `from_env`.
    pub auth_bypass: bool,
    /// Fixed operator identity used when `auth_bypass` is on
    pub auth_bypass_email: String,
    /// Persistence backend selection
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore backend)
    pub gcp_project_id: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Refuses to load `AUTH_BYPASS` under a production deployment so the
    /// bypass can never ride along into a production posture by accident.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let deployment = match env::var("DEPLOYMENT").as_deref() {
            Ok("development") => DeploymentMode::Development,
            Ok("production") | Err(_) => DeploymentMode::Production,
            Ok(other) => return Err(ConfigError::Invalid("DEPLOYMENT", other.to_string())),
        };

        let auth_bypass = matches!(env::var("AUTH_BYPASS").as_deref(), Ok("1") | Ok("true"));
        if auth_bypass && deployment == DeploymentMode::Production {
            return Err(ConfigError::BypassInProduction);
        }

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("firestore") | Err(_) => StoreBackend::Firestore,
            Ok(other) => return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        };

        // A typo'd PORT is a hard error, not a silent fallback to 8080.
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw.clone()))?,
            Err(_) => 8080,
        };

        Ok(Self {
            port,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            deployment,
            auth_bypass,
            auth_bypass_email: env::var("AUTH_BYPASS_EMAIL")
                .unwrap_or_else(|_| "operator@localhost".to_string()),
            store_backend,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            deployment: DeploymentMode::Development,
            auth_bypass: false,
            auth_bypass_email: "operator@localhost".to_string(),
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),

    #[error("AUTH_BYPASS is not allowed in a production deployment")]
    BypassInProduction,
}
