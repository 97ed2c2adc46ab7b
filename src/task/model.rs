#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Toggle between done and not-done. An in-progress task counts as
    /// not-done, so toggling it completes it rather than visiting Pending.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Completed => Self::Pending,
            Self::Pending | Self::InProgress => Self::Completed,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    #[must_use]
    pub fn cycled(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// Display-time predicate selecting tasks by status category.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::InProgress,
        StatusFilter::Completed,
    ];

    /// Lenient parse. Unrecognized values select the unfiltered set.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" | "todo" => Self::Pending,
            "in-progress" | "in progress" | "inprogress" | "active" => Self::InProgress,
            "completed" | "done" => Self::Completed,
            _ => Self::All,
        }
    }

    #[must_use]
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == TaskStatus::Pending,
            Self::InProgress => status == TaskStatus::InProgress,
            Self::Completed => status == TaskStatus::Completed,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Task {
    #[must_use]
    pub fn new_id() -> String {
        let id = Uuid::new_v4().simple().to_string();
        id.chars().take(8).collect()
    }
}

/// Input for task creation. The UI layer enforces a non-empty title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
}

/// Partial update. `None` fields are left untouched; id and created_at are
/// never part of a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }
}

#[must_use]
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_completed_and_pending() {
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        // Toggling twice from Pending returns to Pending.
        assert_eq!(TaskStatus::Pending.toggled().toggled(), TaskStatus::Pending);
    }

    #[test]
    fn toggle_completes_in_progress_tasks() {
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
    }

    #[test]
    fn filter_parse_is_lenient() {
        assert_eq!(StatusFilter::parse("completed"), StatusFilter::Completed);
        assert_eq!(StatusFilter::parse("In Progress"), StatusFilter::InProgress);
        assert_eq!(StatusFilter::parse("PENDING"), StatusFilter::Pending);
        assert_eq!(StatusFilter::parse("all"), StatusFilter::All);
        // Unknown values fall back to the unfiltered set.
        assert_eq!(StatusFilter::parse("bogus"), StatusFilter::All);
        assert_eq!(StatusFilter::parse(""), StatusFilter::All);
    }

    #[test]
    fn generated_ids_are_short_tokens() {
        let id = Task::new_id();
        assert_eq!(id.chars().count(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
