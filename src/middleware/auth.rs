// SPDX-License-Identifier: MIT

//! Identity resolution: bearer token → `Principal`.
//!
//! Every protected request passes through here before any handler logic
//! runs. The resolver verifies the JWT, extracts the email claim, and
//! looks up or lazily provisions the user record. Handlers downstream
//! always see the same `Principal` shape regardless of whether the
//! token path or the dev bypass produced it.

use crate::config::Config;
use crate::error::AppError;
use crate::store::LedgerStore;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Email identifying the user. Optional in the wire format so a
    /// token without it fails our check, not deserialization.
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// The resolved caller. Request-scoped; never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Stable identifier of the backing user record
    pub user_id: String,
    pub email: String,
    /// Raw verified claims; `None` when the dev bypass produced the
    /// principal.
    pub claims: Option<Claims>,
}

/// Resolve an optional bearer credential to a `Principal`.
///
/// Any verification failure — missing token, bad signature, expired,
/// malformed, missing email claim — is reported uniformly as
/// `Unauthenticated`. Lazily provisions a user record (balance 0) on
/// first sight of a new email.
pub async fn resolve_principal(
    config: &Config,
    store: &dyn LedgerStore,
    token: Option<&str>,
) -> Result<Principal, AppError> {
    if config.auth_bypass {
        // Explicit development-only switch; Config::from_env refuses to
        // load it in a production deployment.
        tracing::debug!(email = %config.auth_bypass_email, "Auth bypass: using operator identity");
        let user = store.find_or_create_user(&config.auth_bypass_email).await?;
        return Ok(Principal {
            user_id: user.id,
            email: user.email,
            claims: None,
        });
    }

    let token = token.ok_or(AppError::Unauthenticated)?;

    let key = DecodingKey::from_secret(&config.jwt_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data =
        decode::<Claims>(token, &key, &validation).map_err(|_| AppError::Unauthenticated)?;

    let email = token_data
        .claims
        .email
        .clone()
        .ok_or(AppError::Unauthenticated)?;

    let user = store.find_or_create_user(&email).await?;

    Ok(Principal {
        user_id: user.id,
        email: user.email,
        claims: Some(token_data.claims),
    })
}

/// Middleware that requires an authenticated principal.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let principal = resolve_principal(&state.config, state.store.as_ref(), token).await?;
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Mint a bearer token for an email. Used by tests and local tooling;
/// the service itself only verifies tokens.
pub fn create_token(email: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        email: Some(email.to_string()),
        iat: now,
        exp: now + 30 * 24 * 60 * 60, // 30 days
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
