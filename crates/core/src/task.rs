//! Task entity model, kanban status and priority cycles, and tag sets.

use chrono::NaiveDateTime;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::dates::{nullable, opt_datetime, patch_datetime};
use crate::error::CoreError;
use crate::types::{new_id, EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Kanban column of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    /// Board column order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

    /// The status after this one, wrapping from `Done` back to `Todo`.
    pub fn next(self) -> Self {
        match self {
            TaskStatus::Todo => TaskStatus::Doing,
            TaskStatus::Doing => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Task priority. Serialized as `none`, `very_high`, `high`, `normal`,
/// `low`, `very_low`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[serde(rename = "none")]
    Unset,
    VeryHigh,
    High,
    #[default]
    Normal,
    Low,
    VeryLow,
}

impl Priority {
    /// Order in which the board's priority tag advances on click.
    pub const CYCLE: [Priority; 6] = [
        Priority::Unset,
        Priority::VeryHigh,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::VeryLow,
    ];

    pub fn next(self) -> Self {
        let idx = Self::CYCLE
            .iter()
            .position(|p| *p == self)
            .unwrap_or_default();
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Insertion-ordered set of non-blank, trimmed tags.
///
/// Deserialization goes through [`TagSet::add`], so stored snapshots are
/// cleaned on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct TagSet(IndexSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Blank input is ignored; duplicates keep their first position.
    /// Returns `true` if the tag was newly inserted.
    pub fn add(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        self.0.insert(tag.to_string())
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        self.0.shift_remove(tag)
    }

    /// Remove the most recently added tag.
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.add(tag.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// Metadata of a file attached to a task. File contents are not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
}

/// A task record, stored under its project in `tasks_by_project_v1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub project_id: EntityId,
    pub title: String,
    #[serde(default)]
    pub assignee: Option<String>,
    /// People kept in the loop, in entry order.
    #[serde(default)]
    pub cc: Vec<String>,
    /// Rich-text body (HTML).
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "opt_datetime")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "opt_datetime")]
    pub due: Option<NaiveDateTime>,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task. Only `title` is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub assignee: Option<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "opt_datetime")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "opt_datetime")]
    pub due: Option<NaiveDateTime>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update merged into an existing task. `None` fields are untouched;
/// for the doubly optional ones an explicit `null` clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub assignee: Option<Option<String>>,
    pub cc: Option<Vec<String>>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "patch_datetime")]
    pub start: Option<Option<NaiveDateTime>>,
    #[serde(default, deserialize_with = "patch_datetime")]
    pub due: Option<Option<NaiveDateTime>>,
    pub tags: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Task title is required".into()));
    }
    Ok(())
}

/// Blank assignees are treated as "no assignee".
fn normalize_assignee(assignee: Option<String>) -> Option<String> {
    assignee
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}

impl Task {
    /// Build a new task under `project_id`.
    ///
    /// Defaults: `status = todo`, `priority = normal`, and
    /// `created_at == updated_at == now`.
    pub fn create(project_id: &str, input: NewTask, now: Timestamp) -> Result<Self, CoreError> {
        validate_title(&input.title)?;

        Ok(Self {
            id: new_id(),
            project_id: project_id.to_string(),
            title: input.title.trim().to_string(),
            assignee: normalize_assignee(input.assignee),
            cc: input.cc,
            description: input.description.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            start: input.start,
            due: input.due,
            tags: input.tags.iter().collect(),
            attachments: input.attachments,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge a patch and refresh `updated_at`. On validation failure the
    /// task is left unchanged.
    pub fn apply(&mut self, patch: TaskPatch, now: Timestamp) -> Result<(), CoreError> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }

        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = normalize_assignee(assignee);
        }
        if let Some(cc) = patch.cc {
            self.cc = cc;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(due) = patch.due {
            self.due = due;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags.iter().collect();
        }
        if let Some(attachments) = patch.attachments {
            self.attachments = attachments;
        }
        self.updated_at = now;
        Ok(())
    }

    /// `true` when the due date has passed and the task is not done.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.status != TaskStatus::Done && self.due.is_some_and(|due| due < now)
    }
}
