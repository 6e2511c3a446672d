//! Data models shared between the store and the API.

pub mod reward;
pub mod task;
pub mod user;

pub use reward::{Reward, RewardPatch};
pub use task::{Importance, Task, TaskPatch};
pub use user::User;
