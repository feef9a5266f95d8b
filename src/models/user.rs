use bson::DateTime;
use serde::{Deserialize, Serialize};

/// One document per user in the `users` collection. The username is the
/// lookup key and carries a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub todos: Vec<Task>,
    #[serde(default)]
    pub completed: Vec<Task>,
    pub created_at: DateTime,
}

/// A single task. The id is assigned once at creation and is unique only
/// within the account's current `todos` list (see `Storage::add_todo`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime,
    /// Stamped when the task moves to `completed`; absent before that.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime>,
}

/// Which of the two per-account lists an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskList {
    Todos,
    Completed,
}

impl TaskList {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todos" => Some(Self::Todos),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todos => "todos",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub todo_count: usize,
    pub completed_count: usize,
}
