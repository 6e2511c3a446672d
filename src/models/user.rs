//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// A user's ledger record, stored in the `users` collection.
///
/// Created lazily on first successful authentication for a given email
/// and never deleted. The points balance is unsigned so it can never
/// go negative; debits are additionally guarded by a conditional update
/// in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque stable identifier (UUID v4 string)
    pub id: String,
    /// Email address the user authenticated with (unique)
    pub email: String,
    /// Current points balance
    pub points: u64,
    /// When the user was first provisioned (RFC 3339)
    pub created_at: String,
}

impl User {
    /// A fresh user record with a zero balance.
    pub fn provision(email: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            points: 0,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
