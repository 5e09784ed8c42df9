//! Storage abstraction the lifecycle managers talk to.
//!
//! One trait per collection, async so writes can be pushed into the
//! background. Methods return `impl Future + Send`, which keeps the
//! futures spawnable on a runtime. [`MemStore`] implements every trait
//! and serves as the reference backend in tests.

use std::future::Future;

use opsdesk_core::{
    Client, ClientId, ClientPatch, NewClient, NewProject, NewTask, Note, NoteId, Project,
    ProjectId, ProjectPatch, Task, TaskId, TaskNote, TaskPatch, UserId,
};
use opsdesk_store_mem::{MemStore, MemStoreError};
use thiserror::Error;
use time::OffsetDateTime;

/// Errors surfaced by any store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The targeted record does not exist (for this user).
    #[error("record not found: {0}")]
    NotFound(String),

    /// The backend rejected the write (validation, constraint).
    #[error("store rejected the write: {0}")]
    Rejected(String),

    /// The backend could not be reached or failed mid-flight.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<MemStoreError> for StoreError {
    fn from(err: MemStoreError) -> Self {
        match err {
            MemStoreError::RowNotFound { .. } => Self::NotFound(err.to_string()),
            MemStoreError::Constraint(_) => Self::Rejected(err.to_string()),
            MemStoreError::Injected(_) => Self::Unavailable(err.to_string()),
        }
    }
}

/// Result alias for store-facing operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence operations for the clients collection.
pub trait ClientStore: Send + Sync {
    /// List `user`'s clients, creation-ascending.
    fn list_clients(&self, user: UserId) -> impl Future<Output = Result<Vec<Client>>> + Send;

    /// Insert a client, returning the stored record with its generated
    /// id and timestamp.
    fn insert_client(
        &self,
        user: UserId,
        new: NewClient,
    ) -> impl Future<Output = Result<Client>> + Send;

    /// Apply a patch to a stored client.
    fn update_client(
        &self,
        user: UserId,
        id: ClientId,
        patch: ClientPatch,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a client; the backend cascades to its dependents.
    fn delete_client(&self, user: UserId, id: ClientId) -> impl Future<Output = Result<()>> + Send;
}

/// Persistence operations for the projects collection.
pub trait ProjectStore: Send + Sync {
    /// List `user`'s projects, creation-ascending.
    fn list_projects(&self, user: UserId) -> impl Future<Output = Result<Vec<Project>>> + Send;

    /// Insert a project, returning the stored record.
    fn insert_project(
        &self,
        user: UserId,
        new: NewProject,
    ) -> impl Future<Output = Result<Project>> + Send;

    /// Apply a patch to a stored project.
    fn update_project(
        &self,
        user: UserId,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a project.
    fn delete_project(
        &self,
        user: UserId,
        id: ProjectId,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Persistence operations for the tasks collection.
pub trait TaskStore: Send + Sync {
    /// List `user`'s tasks, creation-ascending.
    fn list_tasks(&self, user: UserId) -> impl Future<Output = Result<Vec<Task>>> + Send;

    /// Insert a task, returning the stored record.
    fn insert_task(&self, user: UserId, new: NewTask) -> impl Future<Output = Result<Task>> + Send;

    /// Apply a patch to a stored task.
    fn update_task(
        &self,
        user: UserId,
        id: TaskId,
        patch: TaskPatch,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Flip the completion pair (`done`, `completed_at`) on a stored
    /// task; the two must agree.
    fn set_task_done(
        &self,
        user: UserId,
        id: TaskId,
        done: bool,
        completed_at: Option<OffsetDateTime>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a task and its attached notes.
    fn delete_task(&self, user: UserId, id: TaskId) -> impl Future<Output = Result<()>> + Send;
}

/// Persistence operations for standalone notes and per-task notes.
pub trait NoteStore: Send + Sync {
    /// List `user`'s notes, newest first.
    fn list_notes(&self, user: UserId) -> impl Future<Output = Result<Vec<Note>>> + Send;

    /// Insert a note, returning the stored record.
    fn insert_note(
        &self,
        user: UserId,
        content: String,
    ) -> impl Future<Output = Result<Note>> + Send;

    /// Replace a note's content; the backend bumps `updated_at`.
    fn update_note(
        &self,
        user: UserId,
        id: NoteId,
        content: String,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a note.
    fn delete_note(&self, user: UserId, id: NoteId) -> impl Future<Output = Result<()>> + Send;

    /// List the notes attached to `task`, newest first.
    fn list_task_notes(
        &self,
        user: UserId,
        task: TaskId,
    ) -> impl Future<Output = Result<Vec<TaskNote>>> + Send;

    /// Attach a note to `task`, returning the stored record.
    fn insert_task_note(
        &self,
        user: UserId,
        task: TaskId,
        content: String,
    ) -> impl Future<Output = Result<TaskNote>> + Send;
}

impl ClientStore for MemStore {
    fn list_clients(&self, user: UserId) -> impl Future<Output = Result<Vec<Client>>> + Send {
        async move { MemStore::list_clients(self, user).map_err(Into::into) }
    }

    fn insert_client(
        &self,
        user: UserId,
        new: NewClient,
    ) -> impl Future<Output = Result<Client>> + Send {
        async move { MemStore::insert_client(self, user, new).map_err(Into::into) }
    }

    fn update_client(
        &self,
        user: UserId,
        id: ClientId,
        patch: ClientPatch,
    ) -> impl Future<Output = Result<()>> + Send {
        async move { MemStore::update_client(self, user, id, &patch).map_err(Into::into) }
    }

    fn delete_client(&self, user: UserId, id: ClientId) -> impl Future<Output = Result<()>> + Send {
        async move { MemStore::delete_client(self, user, id).map_err(Into::into) }
    }
}

impl ProjectStore for MemStore {
    fn list_projects(&self, user: UserId) -> impl Future<Output = Result<Vec<Project>>> + Send {
        async move { MemStore::list_projects(self, user).map_err(Into::into) }
    }

    fn insert_project(
        &self,
        user: UserId,
        new: NewProject,
    ) -> impl Future<Output = Result<Project>> + Send {
        async move { MemStore::insert_project(self, user, new).map_err(Into::into) }
    }

    fn update_project(
        &self,
        user: UserId,
        id: ProjectId,
        patch: ProjectPatch,
    ) -> impl Future<Output = Result<()>> + Send {
        async move { MemStore::update_project(self, user, id, &patch).map_err(Into::into) }
    }

    fn delete_project(
        &self,
        user: UserId,
        id: ProjectId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move { MemStore::delete_project(self, user, id).map_err(Into::into) }
    }
}

impl TaskStore for MemStore {
    fn list_tasks(&self, user: UserId) -> impl Future<Output = Result<Vec<Task>>> + Send {
        async move { MemStore::list_tasks(self, user).map_err(Into::into) }
    }

    fn insert_task(&self, user: UserId, new: NewTask) -> impl Future<Output = Result<Task>> + Send {
        async move { MemStore::insert_task(self, user, new).map_err(Into::into) }
    }

    fn update_task(
        &self,
        user: UserId,
        id: TaskId,
        patch: TaskPatch,
    ) -> impl Future<Output = Result<()>> + Send {
        async move { MemStore::update_task(self, user, id, &patch).map_err(Into::into) }
    }

    fn set_task_done(
        &self,
        user: UserId,
        id: TaskId,
        done: bool,
        completed_at: Option<OffsetDateTime>,
    ) -> impl Future<Output = Result<()>> + Send {
        async move { MemStore::set_task_done(self, user, id, done, completed_at).map_err(Into::into) }
    }

    fn delete_task(&self, user: UserId, id: TaskId) -> impl Future<Output = Result<()>> + Send {
        async move { MemStore::delete_task(self, user, id).map_err(Into::into) }
    }
}

impl NoteStore for MemStore {
    fn list_notes(&self, user: UserId) -> impl Future<Output = Result<Vec<Note>>> + Send {
        async move { MemStore::list_notes(self, user).map_err(Into::into) }
    }

    fn insert_note(
        &self,
        user: UserId,
        content: String,
    ) -> impl Future<Output = Result<Note>> + Send {
        async move { MemStore::insert_note(self, user, content).map_err(Into::into) }
    }

    fn update_note(
        &self,
        user: UserId,
        id: NoteId,
        content: String,
    ) -> impl Future<Output = Result<()>> + Send {
        async move { MemStore::update_note(self, user, id, content).map_err(Into::into) }
    }

    fn delete_note(&self, user: UserId, id: NoteId) -> impl Future<Output = Result<()>> + Send {
        async move { MemStore::delete_note(self, user, id).map_err(Into::into) }
    }

    fn list_task_notes(
        &self,
        user: UserId,
        task: TaskId,
    ) -> impl Future<Output = Result<Vec<TaskNote>>> + Send {
        async move { MemStore::list_task_notes(self, user, task).map_err(Into::into) }
    }

    fn insert_task_note(
        &self,
        user: UserId,
        task: TaskId,
        content: String,
    ) -> impl Future<Output = Result<TaskNote>> + Send {
        async move { MemStore::insert_task_note(self, user, task, content).map_err(Into::into) }
    }
}
