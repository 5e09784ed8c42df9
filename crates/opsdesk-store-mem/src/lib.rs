//! In-memory record store with the semantics of the remote backend.
//!
//! Rows are scoped to their owning user, ids and timestamps are assigned
//! on insert, foreign keys are checked, and deleting a client cascades to
//! its projects and tasks. The store also supports injecting one-shot
//! write failures so callers can exercise their optimistic-update and
//! partial-failure paths.

/// Error types.
pub mod error;

pub use error::MemStoreError;

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use opsdesk_core::{
    Client, ClientId, ClientPatch, NewClient, NewProject, NewTask, Note, NoteId, Project,
    ProjectId, ProjectPatch, Task, TaskId, TaskNote, TaskNoteId, TaskPatch, UserId,
};
use time::OffsetDateTime;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, MemStoreError>;

#[derive(Default)]
struct Tables {
    clients: Vec<Client>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    notes: Vec<Note>,
    task_notes: Vec<TaskNote>,
    fail_ops: HashSet<String>,
}

/// The in-memory record store.
///
/// Interior mutability keeps the surface identical to a remote client:
/// shared references, every operation fallible.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Tables>,
}

fn guard(store: &Mutex<Tables>) -> MutexGuard<'_, Tables> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

fn check_injected(tables: &mut Tables, op: &str) -> StoreResult<()> {
    if tables.fail_ops.remove(op) {
        tracing::debug!(op, "injected store failure");
        return Err(MemStoreError::Injected(op.to_owned()));
    }
    Ok(())
}

impl MemStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot failure for the named operation (for example
    /// `"update_task"`). The next matching write fails; later ones
    /// succeed again.
    pub fn fail_once(&self, op: impl Into<String>) {
        guard(&self.inner).fail_ops.insert(op.into());
    }
}

// Clients.
impl MemStore {
    /// All clients owned by `user`, creation-ascending.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn list_clients(&self, user: UserId) -> StoreResult<Vec<Client>> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "list_clients")?;
        let mut rows: Vec<Client> = tables
            .clients
            .iter()
            .filter(|c| c.user_id == user)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.created_at, c.id));
        Ok(rows)
    }

    /// Insert a client row, assigning id and creation timestamp.
    ///
    /// # Errors
    /// Rejects negative revenue values.
    pub fn insert_client(&self, user: UserId, new: NewClient) -> StoreResult<Client> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "insert_client")?;
        if new.monthly_revenue < 0.0 || new.total_revenue < 0.0 {
            return Err(MemStoreError::Constraint("revenue must be non-negative"));
        }
        let client = Client {
            id: ClientId::new(),
            user_id: user,
            name: new.name,
            status: new.status,
            contract_type: new.contract_type,
            monthly_revenue: new.monthly_revenue,
            total_revenue: new.total_revenue,
            notes: new.notes,
            color: new.color,
            created_at: OffsetDateTime::now_utc(),
        };
        tracing::debug!(id = %client.id, "insert client");
        tables.clients.push(client.clone());
        Ok(client)
    }

    /// Apply a patch to a client row.
    ///
    /// # Errors
    /// Fails when the row is missing or a revenue value is negative.
    pub fn update_client(&self, user: UserId, id: ClientId, patch: &ClientPatch) -> StoreResult<()> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "update_client")?;
        if patch.monthly_revenue.is_some_and(|v| v < 0.0)
            || patch.total_revenue.is_some_and(|v| v < 0.0)
        {
            return Err(MemStoreError::Constraint("revenue must be non-negative"));
        }
        let row = tables
            .clients
            .iter_mut()
            .find(|c| c.user_id == user && c.id == id)
            .ok_or_else(|| MemStoreError::RowNotFound {
                table: "clients",
                id: id.to_string(),
            })?;
        row.apply(patch);
        tracing::debug!(%id, "update client");
        Ok(())
    }

    /// Delete a client and cascade to its projects, tasks, and task
    /// notes. Deleting an absent row is an acknowledged no-op.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn delete_client(&self, user: UserId, id: ClientId) -> StoreResult<()> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "delete_client")?;
        tables.clients.retain(|c| !(c.user_id == user && c.id == id));
        tables
            .projects
            .retain(|p| !(p.user_id == user && p.client_id == id));
        let dropped: Vec<TaskId> = tables
            .tasks
            .iter()
            .filter(|t| t.user_id == user && t.client_id == id)
            .map(|t| t.id)
            .collect();
        tables
            .tasks
            .retain(|t| !(t.user_id == user && t.client_id == id));
        tables.task_notes.retain(|n| !dropped.contains(&n.task_id));
        tracing::debug!(%id, cascaded_tasks = dropped.len(), "delete client");
        Ok(())
    }
}

// Projects.
impl MemStore {
    /// All projects owned by `user`, creation-ascending.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn list_projects(&self, user: UserId) -> StoreResult<Vec<Project>> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "list_projects")?;
        let mut rows: Vec<Project> = tables
            .projects
            .iter()
            .filter(|p| p.user_id == user)
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.created_at, p.id));
        Ok(rows)
    }

    /// Insert a project row.
    ///
    /// # Errors
    /// Fails when the referenced client does not exist.
    pub fn insert_project(&self, user: UserId, new: NewProject) -> StoreResult<Project> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "insert_project")?;
        if !tables
            .clients
            .iter()
            .any(|c| c.user_id == user && c.id == new.client_id)
        {
            return Err(MemStoreError::Constraint(
                "project references a missing client",
            ));
        }
        let project = Project {
            id: ProjectId::new(),
            user_id: user,
            client_id: new.client_id,
            name: new.name,
            status: new.status,
            due_date: new.due_date,
            created_at: OffsetDateTime::now_utc(),
        };
        tracing::debug!(id = %project.id, "insert project");
        tables.projects.push(project.clone());
        Ok(project)
    }

    /// Apply a patch to a project row.
    ///
    /// # Errors
    /// Fails when the row is missing.
    pub fn update_project(
        &self,
        user: UserId,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> StoreResult<()> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "update_project")?;
        let row = tables
            .projects
            .iter_mut()
            .find(|p| p.user_id == user && p.id == id)
            .ok_or_else(|| MemStoreError::RowNotFound {
                table: "projects",
                id: id.to_string(),
            })?;
        row.apply(patch);
        tracing::debug!(%id, "update project");
        Ok(())
    }

    /// Delete a project. Tasks pointing at it keep a dangling reference,
    /// which readers tolerate as an unresolved join.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn delete_project(&self, user: UserId, id: ProjectId) -> StoreResult<()> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "delete_project")?;
        tables
            .projects
            .retain(|p| !(p.user_id == user && p.id == id));
        tracing::debug!(%id, "delete project");
        Ok(())
    }
}

// Tasks.
impl MemStore {
    /// All tasks owned by `user`, creation-ascending.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn list_tasks(&self, user: UserId) -> StoreResult<Vec<Task>> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "list_tasks")?;
        let mut rows: Vec<Task> = tables
            .tasks
            .iter()
            .filter(|t| t.user_id == user)
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.created_at, t.id));
        Ok(rows)
    }

    /// Insert a task row with completion fields cleared.
    ///
    /// # Errors
    /// Fails when the client is missing or the project belongs to a
    /// different client.
    pub fn insert_task(&self, user: UserId, new: NewTask) -> StoreResult<Task> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "insert_task")?;
        check_task_refs(&tables, user, new.client_id, new.project_id)?;
        let task = Task {
            id: TaskId::new(),
            user_id: user,
            client_id: new.client_id,
            project_id: new.project_id,
            title: new.title,
            due_date: new.due_date,
            priority: new.priority,
            done: false,
            status: new.status,
            recurrence: new.recurrence,
            completed_at: None,
            parent_task_id: new.parent_task_id,
            scheduled_date: new.scheduled_date,
            created_at: OffsetDateTime::now_utc(),
        };
        tracing::debug!(id = %task.id, "insert task");
        tables.tasks.push(task.clone());
        Ok(task)
    }

    /// Apply a patch to a task row.
    ///
    /// # Errors
    /// Fails when the row is missing or a patched reference would point
    /// at a missing client or a project of another client.
    pub fn update_task(&self, user: UserId, id: TaskId, patch: &TaskPatch) -> StoreResult<()> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "update_task")?;
        let row = tables
            .tasks
            .iter()
            .find(|t| t.user_id == user && t.id == id)
            .ok_or_else(|| MemStoreError::RowNotFound {
                table: "tasks",
                id: id.to_string(),
            })?;
        let mut updated = row.clone();
        updated.apply(patch);
        if patch.client_id.is_some() || !patch.project_id.is_keep() {
            check_task_refs(&tables, user, updated.client_id, updated.project_id)?;
        }
        if let Some(row) = tables
            .tasks
            .iter_mut()
            .find(|t| t.user_id == user && t.id == id)
        {
            *row = updated;
        }
        tracing::debug!(%id, "update task");
        Ok(())
    }

    /// Flip the completion pair on a task row.
    ///
    /// # Errors
    /// Fails when the row is missing or `done` and `completed_at`
    /// disagree.
    pub fn set_task_done(
        &self,
        user: UserId,
        id: TaskId,
        done: bool,
        completed_at: Option<OffsetDateTime>,
    ) -> StoreResult<()> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "set_task_done")?;
        if done != completed_at.is_some() {
            return Err(MemStoreError::Constraint(
                "done and completed_at must agree",
            ));
        }
        let row = tables
            .tasks
            .iter_mut()
            .find(|t| t.user_id == user && t.id == id)
            .ok_or_else(|| MemStoreError::RowNotFound {
                table: "tasks",
                id: id.to_string(),
            })?;
        row.done = done;
        row.completed_at = completed_at;
        tracing::debug!(%id, done, "set task done");
        Ok(())
    }

    /// Delete a task and its attached notes.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn delete_task(&self, user: UserId, id: TaskId) -> StoreResult<()> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "delete_task")?;
        tables.tasks.retain(|t| !(t.user_id == user && t.id == id));
        tables.task_notes.retain(|n| n.task_id != id);
        tracing::debug!(%id, "delete task");
        Ok(())
    }
}

// Notes.
impl MemStore {
    /// All standalone notes owned by `user`, newest first.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn list_notes(&self, user: UserId) -> StoreResult<Vec<Note>> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "list_notes")?;
        let mut rows: Vec<Note> = tables
            .notes
            .iter()
            .filter(|n| n.user_id == user)
            .cloned()
            .collect();
        rows.sort_by_key(|n| std::cmp::Reverse((n.created_at, n.id)));
        Ok(rows)
    }

    /// Insert a note row.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn insert_note(&self, user: UserId, content: String) -> StoreResult<Note> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "insert_note")?;
        let now = OffsetDateTime::now_utc();
        let note = Note {
            id: NoteId::new(),
            user_id: user,
            content,
            created_at: now,
            updated_at: now,
        };
        tracing::debug!(id = %note.id, "insert note");
        tables.notes.push(note.clone());
        Ok(note)
    }

    /// Replace a note's content, bumping its update timestamp.
    ///
    /// # Errors
    /// Fails when the row is missing.
    pub fn update_note(&self, user: UserId, id: NoteId, content: String) -> StoreResult<()> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "update_note")?;
        let row = tables
            .notes
            .iter_mut()
            .find(|n| n.user_id == user && n.id == id)
            .ok_or_else(|| MemStoreError::RowNotFound {
                table: "notes",
                id: id.to_string(),
            })?;
        row.content = content;
        row.updated_at = OffsetDateTime::now_utc();
        tracing::debug!(%id, "update note");
        Ok(())
    }

    /// Delete a note. Deleting an absent row is an acknowledged no-op.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn delete_note(&self, user: UserId, id: NoteId) -> StoreResult<()> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "delete_note")?;
        tables.notes.retain(|n| !(n.user_id == user && n.id == id));
        tracing::debug!(%id, "delete note");
        Ok(())
    }

    /// Notes attached to `task`, newest first.
    ///
    /// # Errors
    /// Fails only via injected failures.
    pub fn list_task_notes(&self, user: UserId, task: TaskId) -> StoreResult<Vec<TaskNote>> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "list_task_notes")?;
        let mut rows: Vec<TaskNote> = tables
            .task_notes
            .iter()
            .filter(|n| n.user_id == user && n.task_id == task)
            .cloned()
            .collect();
        rows.sort_by_key(|n| std::cmp::Reverse((n.created_at, n.id)));
        Ok(rows)
    }

    /// Attach a note to a task.
    ///
    /// # Errors
    /// Fails when the task does not exist.
    pub fn insert_task_note(
        &self,
        user: UserId,
        task: TaskId,
        content: String,
    ) -> StoreResult<TaskNote> {
        let mut tables = guard(&self.inner);
        check_injected(&mut tables, "insert_task_note")?;
        if !tables
            .tasks
            .iter()
            .any(|t| t.user_id == user && t.id == task)
        {
            return Err(MemStoreError::Constraint(
                "task note references a missing task",
            ));
        }
        let note = TaskNote {
            id: TaskNoteId::new(),
            task_id: task,
            user_id: user,
            content,
            created_at: OffsetDateTime::now_utc(),
        };
        tracing::debug!(id = %note.id, %task, "insert task note");
        tables.task_notes.push(note.clone());
        Ok(note)
    }
}

fn check_task_refs(
    tables: &Tables,
    user: UserId,
    client: ClientId,
    project: Option<ProjectId>,
) -> StoreResult<()> {
    if !tables
        .clients
        .iter()
        .any(|c| c.user_id == user && c.id == client)
    {
        return Err(MemStoreError::Constraint("task references a missing client"));
    }
    if let Some(project) = project {
        let owner = tables
            .projects
            .iter()
            .find(|p| p.user_id == user && p.id == project)
            .map(|p| p.client_id);
        if owner != Some(client) {
            return Err(MemStoreError::Constraint(
                "task project must belong to the task's client",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdesk_core::{FieldPatch, Priority};
    use time::macros::date;

    fn seeded() -> (MemStore, UserId, Client) {
        let store = MemStore::new();
        let user = UserId::new();
        let client = match store.insert_client(user, NewClient::new("Acme")) {
            Ok(client) => client,
            Err(err) => panic!("seed client: {err}"),
        };
        (store, user, client)
    }

    #[test]
    fn rows_are_scoped_to_their_user() {
        let (store, user, _client) = seeded();
        let stranger = UserId::new();
        assert_eq!(store.list_clients(user).map(|v| v.len()).ok(), Some(1));
        assert_eq!(store.list_clients(stranger).map(|v| v.len()).ok(), Some(0));
    }

    #[test]
    fn insert_rejects_negative_revenue() {
        let store = MemStore::new();
        let user = UserId::new();
        let mut new = NewClient::new("Acme");
        new.monthly_revenue = -1.0;
        assert!(matches!(
            store.insert_client(user, new),
            Err(MemStoreError::Constraint(_))
        ));
    }

    #[test]
    fn task_insert_checks_references() {
        let (store, user, client) = seeded();
        let missing_client = store.insert_task(user, NewTask::new(ClientId::new(), "x"));
        assert!(matches!(
            missing_client,
            Err(MemStoreError::Constraint(_))
        ));

        // A project of another client is rejected too.
        let other = match store.insert_client(user, NewClient::new("Globex")) {
            Ok(client) => client,
            Err(err) => panic!("seed other client: {err}"),
        };
        let project = match store.insert_project(user, NewProject::new(other.id, "Site")) {
            Ok(project) => project,
            Err(err) => panic!("seed project: {err}"),
        };
        let mut cross = NewTask::new(client.id, "x");
        cross.project_id = Some(project.id);
        assert!(matches!(
            store.insert_task(user, cross),
            Err(MemStoreError::Constraint(_))
        ));
    }

    #[test]
    fn deleting_a_client_cascades() {
        let (store, user, client) = seeded();
        let project = match store.insert_project(user, NewProject::new(client.id, "Site")) {
            Ok(project) => project,
            Err(err) => panic!("seed project: {err}"),
        };
        let mut new = NewTask::new(client.id, "Wireframes");
        new.project_id = Some(project.id);
        let task = match store.insert_task(user, new) {
            Ok(task) => task,
            Err(err) => panic!("seed task: {err}"),
        };
        assert!(store.insert_task_note(user, task.id, "kickoff".into()).is_ok());

        assert!(store.delete_client(user, client.id).is_ok());
        assert_eq!(store.list_projects(user).map(|v| v.len()).ok(), Some(0));
        assert_eq!(store.list_tasks(user).map(|v| v.len()).ok(), Some(0));
        assert_eq!(
            store.list_task_notes(user, task.id).map(|v| v.len()).ok(),
            Some(0)
        );
    }

    #[test]
    fn set_task_done_requires_agreement() {
        let (store, user, client) = seeded();
        let task = match store.insert_task(user, NewTask::new(client.id, "x")) {
            Ok(task) => task,
            Err(err) => panic!("seed task: {err}"),
        };
        assert!(matches!(
            store.set_task_done(user, task.id, true, None),
            Err(MemStoreError::Constraint(_))
        ));
        assert!(
            store
                .set_task_done(user, task.id, true, Some(OffsetDateTime::now_utc()))
                .is_ok()
        );
    }

    #[test]
    fn injected_failures_fire_once() {
        let (store, user, client) = seeded();
        store.fail_once("insert_task");
        assert!(matches!(
            store.insert_task(user, NewTask::new(client.id, "x")),
            Err(MemStoreError::Injected(_))
        ));
        assert!(store.insert_task(user, NewTask::new(client.id, "x")).is_ok());
    }

    #[test]
    fn update_task_applies_typed_patches() {
        let (store, user, client) = seeded();
        let task = match store.insert_task(user, NewTask::new(client.id, "Draft")) {
            Ok(task) => task,
            Err(err) => panic!("seed task: {err}"),
        };
        let patch = TaskPatch {
            title: Some("Draft v2".into()),
            due_date: FieldPatch::Set(date!(2024 - 03 - 08)),
            priority: Some(Priority::High),
            ..TaskPatch::default()
        };
        assert!(store.update_task(user, task.id, &patch).is_ok());
        let rows = store.list_tasks(user).unwrap_or_default();
        assert_eq!(rows[0].title, "Draft v2");
        assert_eq!(rows[0].due_date, Some(date!(2024 - 03 - 08)));
        assert_eq!(rows[0].priority, Priority::High);
    }

    #[test]
    fn notes_list_newest_first() {
        let store = MemStore::new();
        let user = UserId::new();
        assert!(store.insert_note(user, "first".into()).is_ok());
        assert!(store.insert_note(user, "second".into()).is_ok());
        let notes = store.list_notes(user).unwrap_or_default();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].content, "second");
    }
}
