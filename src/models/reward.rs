//! Reward model for storage and API.

use serde::{Deserialize, Serialize};

/// A reward stored in the `rewards` collection.
///
/// Buying a reward debits the user's balance; the reward document itself
/// is unchanged by a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    /// Document identifier (UUID v4 string)
    pub id: String,
    pub title: String,
    /// Point cost debited on purchase
    pub points: u64,
    pub created_at: String,
}

impl Reward {
    pub fn new(title: String, points: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            points,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Partial update for a reward. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RewardPatch {
    pub title: Option<String>,
    pub points: Option<u64>,
}
