//! The pair of stores a process works against.
//!
//! Task mutations that go through the workspace check that the owning project
//! exists and keep the project's `stats` counters in step with its board.

use chrono::NaiveDateTime;
use syncup_core::board::{member_workload, BoardSummary, MemberStats};
use syncup_core::error::CoreError;
use syncup_core::project::{Project, ProjectPatch};
use syncup_core::task::{NewTask, Priority, Task, TaskPatch, TaskStatus};

use crate::config::StoreConfig;
use crate::error::{StorageError, StoreError};
use crate::kv::SharedStore;
use crate::projects::ProjectStore;
use crate::tasks::TaskStore;

pub struct Workspace {
    projects: ProjectStore,
    tasks: TaskStore,
    cascade_deletes: bool,
}

impl Workspace {
    /// Hydrate both stores from one storage handle.
    pub fn open(storage: SharedStore, config: &StoreConfig) -> Self {
        let projects = ProjectStore::load(storage.clone());
        let tasks = TaskStore::load(storage);

        let orphaned: Vec<&str> = tasks
            .project_ids()
            .filter(|id| projects.get(id).is_none())
            .collect();
        if !orphaned.is_empty() {
            tracing::warn!(
                count = orphaned.len(),
                "Task snapshot holds tasks for projects that no longer exist"
            );
        }

        Self {
            projects,
            tasks,
            cascade_deletes: config.cascade_deletes,
        }
    }

    /// Open the storage backend described by `config` and hydrate from it.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StorageError> {
        let storage = config.open_storage()?;
        Ok(Self::open(storage, config))
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut ProjectStore {
        &mut self.projects
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskStore {
        &mut self.tasks
    }

    pub fn cascade_deletes(&self) -> bool {
        self.cascade_deletes
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Look up a project, failing with `NotFound` if it does not exist.
    pub fn project(&self, id: &str) -> Result<&Project, CoreError> {
        self.projects.get(id).ok_or_else(|| CoreError::NotFound {
            entity: "Project",
            id: id.to_string(),
        })
    }

    /// Remove a project and, with cascading on, every task it owns.
    ///
    /// The two snapshots are written one after the other; a failure on the
    /// second leaves the project gone and its tasks orphaned.
    pub fn remove_project(&mut self, id: &str) -> Result<(), StoreError> {
        self.projects.remove(id)?;
        if self.cascade_deletes {
            let removed = self.tasks.remove_project(id)?;
            tracing::info!(project_id = %id, tasks_removed = removed, "Project tasks removed");
        }
        Ok(())
    }

    /// Recompute `stats.tasks` and `stats.progress` from the project's tasks.
    /// Unknown projects are ignored.
    pub fn refresh_stats(&mut self, project_id: &str) -> Result<(), StoreError> {
        let Some(project) = self.projects.get(project_id) else {
            return Ok(());
        };
        let summary = self.board(project_id);
        let mut stats = project.stats;
        stats.tasks = summary.total;
        stats.progress = summary.progress;
        if stats == project.stats {
            return Ok(());
        }

        self.projects.update(&ProjectPatch {
            id: project_id.to_string(),
            stats: Some(stats),
            ..ProjectPatch::default()
        })
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Create a task under an existing project.
    pub fn create_task(&mut self, project_id: &str, input: NewTask) -> Result<Task, StoreError> {
        self.project(project_id)?;
        let task = self.tasks.create(project_id, input)?;
        self.refresh_stats(project_id)?;
        Ok(task)
    }

    pub fn update_task(
        &mut self,
        project_id: &str,
        id: &str,
        patch: TaskPatch,
    ) -> Result<(), StoreError> {
        self.tasks.update(project_id, id, patch)?;
        self.refresh_stats(project_id)
    }

    pub fn remove_task(&mut self, project_id: &str, id: &str) -> Result<(), StoreError> {
        self.tasks.remove(project_id, id)?;
        self.refresh_stats(project_id)
    }

    pub fn cycle_status(
        &mut self,
        project_id: &str,
        id: &str,
    ) -> Result<Option<TaskStatus>, StoreError> {
        let next = self.tasks.cycle_status(project_id, id)?;
        self.refresh_stats(project_id)?;
        Ok(next)
    }

    pub fn cycle_priority(
        &mut self,
        project_id: &str,
        id: &str,
    ) -> Result<Option<Priority>, StoreError> {
        self.tasks.cycle_priority(project_id, id)
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn board(&self, project_id: &str) -> BoardSummary {
        BoardSummary::from_tasks(self.tasks.list_by_project(project_id))
    }

    pub fn workload(&self, project_id: &str, now: NaiveDateTime) -> Vec<MemberStats> {
        member_workload(self.tasks.list_by_project(project_id), now)
    }
}
