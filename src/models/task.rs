//! Task model for storage and API.

use serde::{Deserialize, Serialize};

/// How urgent a task is. Purely informational; does not affect the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
    UberHigh,
}

/// A task stored in the `tasks` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Document identifier (UUID v4 string)
    pub id: String,
    pub title: String,
    /// Points credited to the completing user
    pub points: u64,
    pub importance: Importance,
    /// Whether the task has been completed. The false → true transition
    /// guards the point credit, so a task can credit at most once.
    pub done: bool,
    pub created_at: String,
}

impl Task {
    pub fn new(title: String, points: u64, importance: Importance) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            points,
            importance,
            done: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Partial update for a task. `None` fields are left untouched.
/// The done flag is deliberately absent: it only moves through the
/// completion path so the credit stays tied to the flip.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub points: Option<u64>,
    pub importance: Option<Importance>,
}
