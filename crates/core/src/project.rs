//! Project entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{opt_date, patch_date};
use crate::error::CoreError;
use crate::types::{new_id, EntityId, Timestamp};

/// Color assigned when the creator does not pick one.
pub const DEFAULT_PROJECT_COLOR: &str = "#2ecc71";

fn default_color() -> String {
    DEFAULT_PROJECT_COLOR.to_string()
}

/// Dashboard counters shown on a project card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub tasks: u32,
    pub unread: u32,
    pub upcoming: u32,
    /// Completion percentage, `0..=100`.
    pub progress: u8,
}

/// A project record as persisted under the `projects` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub stats: ProjectStats,
}

/// DTO for creating a new project. Only `name` is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "opt_date")]
    pub due_date: Option<NaiveDate>,
}

impl NewProject {
    /// Shorthand for a project with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update merged into the project with the matching `id`.
///
/// `None` fields are left untouched. The dates are doubly optional so an
/// explicit `null` (or `""`) clears them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default)]
    pub id: EntityId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "patch_date")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "patch_date")]
    pub due_date: Option<Option<NaiveDate>>,
    pub pinned: Option<bool>,
    pub stats: Option<ProjectStats>,
}

impl Project {
    /// Build a fresh project from creation input.
    ///
    /// Assigns a new id and `created_at`, default description, color and
    /// stats, and `pinned = false`. A blank name is rejected.
    pub fn create(input: NewProject, now: Timestamp) -> Result<Self, CoreError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Project name is required".into()));
        }

        Ok(Self {
            id: new_id(),
            name: name.to_string(),
            description: input.description.unwrap_or_default(),
            color: input
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(default_color),
            created_at: now,
            start_date: input.start_date,
            due_date: input.due_date,
            pinned: false,
            stats: ProjectStats::default(),
        })
    }

    /// Merge a patch into this project. The `id` is never changed.
    pub fn apply(&mut self, patch: &ProjectPatch) -> Result<(), CoreError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(CoreError::Validation("Project name is required".into()));
            }
        }

        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(pinned) = patch.pinned {
            self.pinned = pinned;
        }
        if let Some(stats) = patch.stats {
            self.stats = stats;
        }
        Ok(())
    }

    /// Percentage of the scheduled period that has elapsed on `today`.
    ///
    /// Returns 0 unless both `start_date` and `due_date` are set. The result
    /// is clamped to `0..=100`.
    pub fn schedule_progress(&self, today: NaiveDate) -> u8 {
        let (Some(start), Some(due)) = (self.start_date, self.due_date) else {
            return 0;
        };

        let span = (due - start).num_days();
        if span <= 0 {
            return if today >= due { 100 } else { 0 };
        }

        let elapsed = (today - start).num_days();
        let pct = (elapsed as f64 / span as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }
}
