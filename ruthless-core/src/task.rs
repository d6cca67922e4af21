//! Task model for the punitive board engine.
//!
//! Tasks are plain serializable data. Lifecycle rules live in `board` and
//! `sync`; nothing here has side effects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Completed,
    Overdue,
    Abandoned,
}

impl TaskStatus {
    /// Completed, overdue and abandoned tasks are resolved.
    pub fn is_resolved(self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }

    /// Overdue or abandoned: counts against the failure rate and ends up in
    /// the shame history when deleted.
    pub fn is_failure(self) -> bool {
        matches!(self, TaskStatus::Overdue | TaskStatus::Abandoned)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Overdue => "OVERDUE",
            TaskStatus::Abandoned => "ABANDONED",
        }
    }
}

/// Display-only. Never feeds into scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A fresh pending task with a generated id.
    pub fn new(title: impl Into<String>, deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            deadline,
            priority: Priority::Medium,
            status: TaskStatus::Pending,
            created_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Whole days elapsed since the deadline; zero when not yet due.
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        if now <= self.deadline {
            return 0;
        }
        (now - self.deadline).num_days()
    }
}

/// Payload for creating a task. Title and deadline are required but optional
/// here so that a missing field surfaces as a validation error instead of a
/// decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            title: Some(title.into()),
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// Validate and build a pending task created at `now`.
    pub fn into_task(self, now: DateTime<Utc>) -> Result<Task, BoardError> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BoardError::Validation("title and deadline required".to_string()))?;
        let deadline = self
            .deadline
            .ok_or_else(|| BoardError::Validation("title and deadline required".to_string()))?;

        let mut task = Task::new(title, deadline, now).with_priority(self.priority.unwrap_or_default());
        if let Some(description) = self.description {
            task.description = description;
        }
        Ok(task)
    }
}

/// Partial update. Every present field overwrites the task's value; there is
/// no transition guard on `status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn deadline(deadline: DateTime<Utc>) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}
