//! Tab data structure.
//!
//! A tab is a named category that exclusively owns its tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId};

/// Identifier of a tab, unique across the store.
pub type TabId = u64;

/// A named group of tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub archived: Vec<Task>,
    /// Next identifier handed to a new task. Never decreases.
    pub next_task_id: TaskId,
}

impl Tab {
    pub(crate) fn new(id: TabId, name: String, created_at: DateTime<Utc>) -> Self {
        Tab {
            id,
            name,
            created_at,
            tasks: Vec::new(),
            archived: Vec::new(),
            next_task_id: 1,
        }
    }

    /// Get an active task by ID.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Whether `name` refers to this tab under the case-insensitive rule.
    pub fn has_name(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }
}

/// Comparison key for tab names: trimmed and lowercased.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
