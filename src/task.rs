//! Task data structure and related functionality.
//!
//! A `Task` is a single work item owned by exactly one tab. Its identifier is
//! only unique within that tab.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::State;

/// Identifier of a task, unique within its owning tab.
pub type TaskId = u64;

/// One work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub state: State,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// A dated record of what changed on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub changes: Vec<String>,
}

impl HistoryEntry {
    /// Changes joined the way the history listing shows them.
    pub fn summary(&self) -> String {
        self.changes.join(" | ")
    }
}

/// Partial update of a task. `None` leaves a field alone.
///
/// For `comment`, `Some` with blank text clears the comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub state: Option<State>,
    pub comment: Option<String>,
}

impl TaskUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.state.is_none() && self.comment.is_none()
    }
}

/// Criteria for `Store::filter_tasks`. Empty criteria match every task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub state: Option<State>,
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
}

impl TaskFilter {
    pub fn by_state(state: State) -> Self {
        TaskFilter { state: Some(state), title_contains: None }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(state) = self.state {
            if task.state != state {
                return false;
            }
        }
        match self.title_contains.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                task.title.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => true,
        }
    }
}

/// Trim a comment and map blank text to "no comment".
pub fn normalise_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}
