//! Project tracking within a client.

use std::sync::Arc;

use opsdesk_core::{ClientId, NewProject, Project, ProjectId, ProjectPatch, ProjectStatus};

use crate::background::{self, WriteFailureHook};
use crate::session::Session;
use crate::store::{ProjectStore, StoreError};

/// Owner of the in-memory project snapshot for one session.
pub struct ProjectManager<S> {
    store: Arc<S>,
    session: Session,
    projects: Vec<Project>,
    on_write_failure: WriteFailureHook,
}

impl<S: ProjectStore + 'static> ProjectManager<S> {
    /// Fetch the session's projects and build a manager around them.
    ///
    /// # Errors
    /// Fails when the initial list cannot be fetched.
    pub async fn load(store: Arc<S>, session: Session) -> Result<Self, StoreError> {
        let projects = store.list_projects(session.user).await?;
        Ok(Self {
            store,
            session,
            projects,
            on_write_failure: background::log_failures(),
        })
    }

    /// Replace the default write-failure hook.
    #[must_use]
    pub fn with_write_failure_hook(mut self, hook: WriteFailureHook) -> Self {
        self.on_write_failure = hook;
        self
    }

    /// The current snapshot, in the order received from the store.
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Look up one project by id.
    #[must_use]
    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Projects belonging to one client, in snapshot order.
    #[must_use]
    pub fn for_client(&self, client: ClientId) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| p.client_id == client)
            .collect()
    }

    /// Projects still in flight, in snapshot order.
    #[must_use]
    pub fn active(&self) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .collect()
    }

    /// Discard local state and re-fetch the authoritative snapshot.
    ///
    /// # Errors
    /// Fails when the list cannot be fetched; local state is kept.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        self.projects = self.store.list_projects(self.session.user).await?;
        Ok(())
    }

    /// Create a project. Waits for the store because the id and creation
    /// timestamp are generated there.
    ///
    /// # Errors
    /// Surfaces insert failures (including an unknown client) with no
    /// local change.
    pub async fn add(&mut self, new: NewProject) -> Result<Project, StoreError> {
        let project = self.store.insert_project(self.session.user, new).await?;
        self.projects.push(project.clone());
        Ok(project)
    }

    /// Apply a patch locally and persist it in the background. Unknown
    /// ids are a silent no-op.
    pub fn update(&mut self, id: ProjectId, patch: ProjectPatch) {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return;
        };
        project.apply(&patch);
        let store = Arc::clone(&self.store);
        let user = self.session.user;
        background::spawn_write(&self.on_write_failure, "projects.update", async move {
            store.update_project(user, id, patch).await
        });
    }

    /// Remove a project locally and delete it in the background. Tasks
    /// pointing at it keep their reference until their next edit.
    pub fn delete(&mut self, id: ProjectId) {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return;
        }
        let store = Arc::clone(&self.store);
        let user = self.session.user;
        background::spawn_write(&self.on_write_failure, "projects.delete", async move {
            store.delete_project(user, id).await
        });
    }
}
