//! Project store: the list of projects plus the "current project" pointer.

use chrono::Utc;
use syncup_core::project::{NewProject, Project, ProjectPatch};

use crate::error::{StorageError, StoreError};
use crate::kv::{load_json, save_json, SharedStore, CURRENT_PROJECT_KEY, PROJECTS_KEY};

/// In-memory project list with write-through persistence.
///
/// Mutations addressing an unknown id change nothing but still rewrite the
/// snapshot.
pub struct ProjectStore {
    storage: SharedStore,
    projects: Vec<Project>,
    current_id: Option<String>,
}

impl ProjectStore {
    /// Hydrate from storage. Missing or corrupted snapshots load as empty.
    pub fn load(storage: SharedStore) -> Self {
        let projects: Vec<Project> = load_json(storage.as_ref(), PROJECTS_KEY);
        let current_id = match storage.load(CURRENT_PROJECT_KEY) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read current project pointer");
                None
            }
        };

        tracing::debug!(count = projects.len(), "Project store loaded");
        Self {
            storage,
            projects,
            current_id,
        }
    }

    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Pinned projects, in list order.
    pub fn pinned(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| p.pinned)
    }

    /// Projects that are not pinned, in list order.
    pub fn others(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| !p.pinned)
    }

    /// Create and append a project.
    pub fn create(&mut self, input: NewProject) -> Result<Project, StoreError> {
        let project = Project::create(input, Utc::now())?;
        self.projects.push(project.clone());
        tracing::info!(project_id = %project.id, name = %project.name, "Project created");
        self.persist()?;
        Ok(project)
    }

    /// Merge `patch` into the project with `patch.id`.
    pub fn update(&mut self, patch: &ProjectPatch) -> Result<(), StoreError> {
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == patch.id) {
            project.apply(patch)?;
            tracing::debug!(project_id = %patch.id, "Project updated");
        }
        self.persist()?;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() != before {
            tracing::info!(project_id = %id, "Project removed");
        }
        self.persist()?;
        Ok(())
    }

    /// Toggle the `pinned` flag.
    pub fn pin(&mut self, id: &str) -> Result<(), StoreError> {
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.pinned = !project.pinned;
            tracing::debug!(project_id = %id, pinned = project.pinned, "Project pin toggled");
        }
        self.persist()?;
        Ok(())
    }

    /// Point "current project" at `id`. The pointer is stored on its own key
    /// and is not checked against the list.
    pub fn select(&mut self, id: &str) -> Result<(), StoreError> {
        if id.is_empty() {
            return Ok(());
        }
        self.current_id = Some(id.to_string());
        self.storage.save(CURRENT_PROJECT_KEY, id)?;
        tracing::debug!(project_id = %id, "Current project selected");
        Ok(())
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// The selected project, if it still exists.
    pub fn current(&self) -> Option<&Project> {
        self.current_id.as_deref().and_then(|id| self.get(id))
    }

    fn persist(&self) -> Result<(), StorageError> {
        save_json(self.storage.as_ref(), PROJECTS_KEY, &self.projects)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use syncup_core::error::CoreError;

    use super::*;
    use crate::kv::MemoryStore;

    fn store() -> (ProjectStore, MemoryStore) {
        let backend = MemoryStore::new();
        (ProjectStore::load(Arc::new(backend.clone())), backend)
    }

    #[test]
    fn create_appends_and_persists() {
        let (mut projects, backend) = store();
        let created = projects.create(NewProject::named("Demo")).unwrap();

        assert_eq!(projects.list().len(), 1);
        let saved: Vec<Project> =
            serde_json::from_str(&backend.get(PROJECTS_KEY).unwrap()).unwrap();
        assert_eq!(saved, vec![created]);
    }

    #[test]
    fn create_with_blank_name_changes_nothing() {
        let (mut projects, backend) = store();
        let result = projects.create(NewProject::named(""));

        assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));
        assert!(projects.list().is_empty());
        assert_eq!(backend.get(PROJECTS_KEY), None);
    }

    #[test]
    fn pin_twice_restores_original_value() {
        let (mut projects, _) = store();
        let id = projects.create(NewProject::named("Demo")).unwrap().id;

        projects.pin(&id).unwrap();
        assert!(projects.get(&id).unwrap().pinned);
        assert_eq!(projects.pinned().count(), 1);
        assert_eq!(projects.others().count(), 0);

        projects.pin(&id).unwrap();
        assert!(!projects.get(&id).unwrap().pinned);
    }

    #[test]
    fn unknown_ids_are_silent_no_ops() {
        let (mut projects, _) = store();
        projects.create(NewProject::named("Demo")).unwrap();
        let before = projects.list().to_vec();

        projects.pin("missing").unwrap();
        projects.remove("missing").unwrap();
        projects
            .update(&ProjectPatch {
                id: "missing".into(),
                name: Some("Renamed".into()),
                ..ProjectPatch::default()
            })
            .unwrap();

        assert_eq!(projects.list(), before.as_slice());
    }

    #[test]
    fn select_persists_pointer_independently() {
        let (mut projects, backend) = store();
        let id = projects.create(NewProject::named("Demo")).unwrap().id;

        projects.select(&id).unwrap();
        assert_eq!(backend.get(CURRENT_PROJECT_KEY).as_deref(), Some(id.as_str()));
        assert_eq!(projects.current().map(|p| p.name.as_str()), Some("Demo"));

        let reloaded = ProjectStore::load(Arc::new(backend));
        assert_eq!(reloaded.current_id(), Some(id.as_str()));
    }

    #[test]
    fn current_is_none_after_selected_project_is_removed() {
        let (mut projects, _) = store();
        let id = projects.create(NewProject::named("Demo")).unwrap().id;
        projects.select(&id).unwrap();
        projects.remove(&id).unwrap();

        assert_eq!(projects.current_id(), Some(id.as_str()));
        assert!(projects.current().is_none());
    }
}
