//! Task store: tasks grouped by owning project id.

use std::collections::BTreeMap;

use chrono::Utc;
use syncup_core::task::{NewTask, Priority, Task, TaskPatch, TaskStatus};
use syncup_core::types::EntityId;

use crate::error::{StorageError, StoreError};
use crate::kv::{load_json, save_json, SharedStore, TASKS_KEY};

/// Persisted shape of the task snapshot.
pub type TasksByProject = BTreeMap<EntityId, Vec<Task>>;

/// In-memory `projectId -> [Task]` mapping with write-through persistence.
///
/// Every mutation rewrites the whole mapping, so the cost of a write grows
/// with the total number of tasks across all projects.
pub struct TaskStore {
    storage: SharedStore,
    by_project: TasksByProject,
}

impl TaskStore {
    pub fn load(storage: SharedStore) -> Self {
        let by_project: TasksByProject = load_json(storage.as_ref(), TASKS_KEY);
        tracing::debug!(projects = by_project.len(), "Task store loaded");
        Self {
            storage,
            by_project,
        }
    }

    /// Tasks of a project in creation order; empty for unknown projects.
    pub fn list_by_project(&self, project_id: &str) -> &[Task] {
        self.by_project
            .get(project_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get(&self, project_id: &str, id: &str) -> Option<&Task> {
        self.list_by_project(project_id).iter().find(|t| t.id == id)
    }

    /// Total number of tasks across all projects.
    pub fn len(&self) -> usize {
        self.by_project.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create(&mut self, project_id: &str, input: NewTask) -> Result<Task, StoreError> {
        let task = Task::create(project_id, input, Utc::now())?;
        self.by_project
            .entry(project_id.to_string())
            .or_default()
            .push(task.clone());
        tracing::info!(project_id, task_id = %task.id, "Task created");
        self.persist()?;
        Ok(task)
    }

    /// Merge `patch` into a task and refresh its `updated_at`.
    pub fn update(&mut self, project_id: &str, id: &str, patch: TaskPatch) -> Result<(), StoreError> {
        if let Some(task) = self.find_mut(project_id, id) {
            task.apply(patch, Utc::now())?;
            tracing::debug!(project_id, task_id = %id, "Task updated");
        }
        self.persist()?;
        Ok(())
    }

    pub fn remove(&mut self, project_id: &str, id: &str) -> Result<(), StoreError> {
        if let Some(list) = self.by_project.get_mut(project_id) {
            list.retain(|t| t.id != id);
        }
        tracing::debug!(project_id, task_id = %id, "Task removed");
        self.persist()?;
        Ok(())
    }

    /// Drop every task of a project. Returns how many were removed.
    pub fn remove_project(&mut self, project_id: &str) -> Result<usize, StoreError> {
        let removed = self
            .by_project
            .remove(project_id)
            .map(|list| list.len())
            .unwrap_or_default();
        self.persist()?;
        Ok(removed)
    }

    /// Advance a task to the next board column. Returns the new status, or
    /// `None` if the task does not exist.
    pub fn cycle_status(
        &mut self,
        project_id: &str,
        id: &str,
    ) -> Result<Option<TaskStatus>, StoreError> {
        let Some(next) = self.get(project_id, id).map(|t| t.status.next()) else {
            return Ok(None);
        };
        self.update(
            project_id,
            id,
            TaskPatch {
                status: Some(next),
                ..TaskPatch::default()
            },
        )?;
        Ok(Some(next))
    }

    /// Advance a task to the next priority in the cycle.
    pub fn cycle_priority(
        &mut self,
        project_id: &str,
        id: &str,
    ) -> Result<Option<Priority>, StoreError> {
        let Some(next) = self.get(project_id, id).map(|t| t.priority.next()) else {
            return Ok(None);
        };
        self.update(
            project_id,
            id,
            TaskPatch {
                priority: Some(next),
                ..TaskPatch::default()
            },
        )?;
        Ok(Some(next))
    }

    /// Ids of projects that currently own at least one task.
    pub fn project_ids(&self) -> impl Iterator<Item = &str> {
        self.by_project
            .iter()
            .filter(|(_, tasks)| !tasks.is_empty())
            .map(|(id, _)| id.as_str())
    }

    fn find_mut(&mut self, project_id: &str, id: &str) -> Option<&mut Task> {
        self.by_project
            .get_mut(project_id)
            .and_then(|list| list.iter_mut().find(|t| t.id == id))
    }

    fn persist(&self) -> Result<(), StorageError> {
        save_json(self.storage.as_ref(), TASKS_KEY, &self.by_project)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::kv::{KeyValueStore, MemoryStore};

    fn store() -> (TaskStore, MemoryStore) {
        let backend = MemoryStore::new();
        (TaskStore::load(Arc::new(backend.clone())), backend)
    }

    #[test]
    fn unknown_project_lists_empty() {
        let (tasks, _) = store();
        assert!(tasks.list_by_project("missingId").is_empty());
        assert!(tasks.is_empty());
    }

    #[test]
    fn update_merges_and_refreshes_updated_at() {
        let (mut tasks, _) = store();
        let task = tasks.create("P1", NewTask::titled("Write docs")).unwrap();

        tasks
            .update(
                "P1",
                &task.id,
                TaskPatch {
                    assignee: Some(Some("mina".into())),
                    ..TaskPatch::default()
                },
            )
            .unwrap();

        let stored = tasks.get("P1", &task.id).unwrap();
        assert_eq!(stored.assignee.as_deref(), Some("mina"));
        assert_eq!(stored.title, "Write docs");
        assert!(stored.updated_at >= task.updated_at);
        assert_eq!(stored.created_at, task.created_at);
    }

    #[test]
    fn update_in_wrong_project_is_a_no_op() {
        let (mut tasks, _) = store();
        let task = tasks.create("P1", NewTask::titled("Write docs")).unwrap();

        tasks
            .update(
                "P2",
                &task.id,
                TaskPatch {
                    title: Some("Hijacked".into()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();

        assert_eq!(tasks.get("P1", &task.id).unwrap().title, "Write docs");
        assert!(tasks.list_by_project("P2").is_empty());
    }

    #[test]
    fn remove_deletes_only_the_target() {
        let (mut tasks, _) = store();
        let a = tasks.create("P1", NewTask::titled("a")).unwrap();
        let b = tasks.create("P1", NewTask::titled("b")).unwrap();

        tasks.remove("P1", &a.id).unwrap();

        let remaining: Vec<_> = tasks.list_by_project("P1").iter().map(|t| &t.id).collect();
        assert_eq!(remaining, vec![&b.id]);
    }

    #[test]
    fn cycle_status_three_times_returns_to_start() {
        let (mut tasks, _) = store();
        let id = tasks.create("P1", NewTask::titled("a")).unwrap().id;

        assert_eq!(tasks.cycle_status("P1", &id).unwrap(), Some(TaskStatus::Doing));
        assert_eq!(tasks.cycle_status("P1", &id).unwrap(), Some(TaskStatus::Done));
        assert_eq!(tasks.cycle_status("P1", &id).unwrap(), Some(TaskStatus::Todo));
        assert_eq!(tasks.cycle_status("P1", "missing").unwrap(), None);
    }

    #[test]
    fn cycle_priority_six_times_returns_to_start() {
        let (mut tasks, _) = store();
        let id = tasks.create("P1", NewTask::titled("a")).unwrap().id;

        let mut last = None;
        for _ in 0..6 {
            last = tasks.cycle_priority("P1", &id).unwrap();
        }
        assert_eq!(last, Some(Priority::Normal));
    }

    #[test]
    fn remove_project_drops_all_its_tasks() {
        let (mut tasks, backend) = store();
        tasks.create("P1", NewTask::titled("a")).unwrap();
        tasks.create("P1", NewTask::titled("b")).unwrap();
        tasks.create("P2", NewTask::titled("c")).unwrap();

        assert_eq!(tasks.remove_project("P1").unwrap(), 2);
        assert_eq!(tasks.project_ids().collect::<Vec<_>>(), vec!["P2"]);

        let reloaded = TaskStore::load(Arc::new(backend));
        assert!(reloaded.list_by_project("P1").is_empty());
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn corrupted_snapshot_loads_empty() {
        let backend = MemoryStore::new();
        backend.save(TASKS_KEY, "{not json").unwrap();
        let tasks = TaskStore::load(Arc::new(backend));
        assert!(tasks.is_empty());
    }
}
