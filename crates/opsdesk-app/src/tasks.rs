//! Task lifecycle: create, update, complete (with recurrence), revert,
//! delete, plus the derived task views.

use std::cmp::Ordering;
use std::sync::Arc;

use opsdesk_core::{
    FieldPatch, NewTask, Recurrence, Task, TaskId, TaskPatch, TaskStatus, recur, sort,
};
use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::background::{self, WriteFailureHook};
use crate::session::Session;
use crate::store::{StoreError, TaskStore};

/// Errors surfaced by task operations.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Tasks must have a non-blank title.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// No task with this id in the local snapshot.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// The store rejected or lost a write.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The task was completed and persisted, but inserting the next
    /// recurrence instance failed. Without surfacing this, the
    /// recurrence chain would silently end here.
    #[error("task {completed} completed but its successor was not persisted")]
    SuccessorLost {
        /// The task that was completed.
        completed: TaskId,
        /// Why the successor insert failed.
        #[source]
        source: StoreError,
    },
}

/// Outcome of [`TaskManager::complete`].
#[derive(Debug)]
pub enum Completion {
    /// Completed; no successor was due.
    Done,
    /// Completed and the next recurrence instance was created.
    Recurred {
        /// The freshly stored successor task.
        successor: Task,
    },
    /// The task was already completed; nothing changed and no second
    /// successor was generated.
    AlreadyDone,
}

/// Owner of the in-memory task snapshot for one session.
///
/// Mutations follow the two-phase shape used across the managers: the
/// local snapshot changes synchronously so dependent views re-render
/// immediately, and the store write runs in the background. Failed
/// background writes are reported through the hook, never rolled back.
pub struct TaskManager<S> {
    store: Arc<S>,
    session: Session,
    tasks: Vec<Task>,
    on_write_failure: WriteFailureHook,
}

impl<S: TaskStore + 'static> TaskManager<S> {
    /// Fetch the session's tasks and build a manager around them.
    ///
    /// # Errors
    /// Fails when the initial list cannot be fetched.
    pub async fn load(store: Arc<S>, session: Session) -> Result<Self, StoreError> {
        let tasks = store.list_tasks(session.user).await?;
        Ok(Self {
            store,
            session,
            tasks,
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
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up one task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Discard local state and re-fetch the authoritative snapshot.
    ///
    /// # Errors
    /// Fails when the list cannot be fetched; local state is kept.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        self.tasks = self.store.list_tasks(self.session.user).await?;
        Ok(())
    }

    /// Create a task. Waits for the store because the id and creation
    /// timestamp are generated there.
    ///
    /// # Errors
    /// Rejects blank titles before any store call; surfaces insert
    /// failures with no local change.
    pub async fn add(&mut self, new: NewTask) -> Result<Task, TaskError> {
        if new.title.trim().is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let task = self.store.insert_task(self.session.user, new).await?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Apply a patch locally and persist it in the background. Unknown
    /// ids are a silent no-op.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        task.apply(&patch);
        let store = Arc::clone(&self.store);
        let user = self.session.user;
        background::spawn_write(&self.on_write_failure, "tasks.update", async move {
            store.update_task(user, id, patch).await
        });
    }

    /// Change the working status. Accepted on completed tasks as well,
    /// where it touches neither `done` nor `completed_at`.
    pub fn set_status(&mut self, id: TaskId, status: TaskStatus) {
        self.update(
            id,
            TaskPatch {
                status: Some(status),
                ..TaskPatch::default()
            },
        );
    }

    /// Place the task on a planner day, or pull it back to the backlog
    /// with `None`.
    pub fn schedule(&mut self, id: TaskId, date: Option<Date>) {
        self.update(
            id,
            TaskPatch {
                scheduled_date: FieldPatch::from(date),
                ..TaskPatch::default()
            },
        );
    }

    /// Complete a task and, for a repeating task with a due date, create
    /// the next occurrence as one logical operation.
    ///
    /// The successor carries the same client, project, title, priority,
    /// and cadence; its due date is the old one advanced by the cadence;
    /// its `parent_task_id` points at the first task of the chain. A
    /// repeating task without a due date completes without a successor.
    ///
    /// # Errors
    /// Surfaces a failed completion write (local state stays completed),
    /// and reports a failed successor insert as
    /// [`TaskError::SuccessorLost`] rather than dropping it silently.
    pub async fn complete(&mut self, id: TaskId) -> Result<Completion, TaskError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Err(TaskError::UnknownTask(id));
        };
        if task.done {
            return Ok(Completion::AlreadyDone);
        }
        let completed_at = OffsetDateTime::now_utc();
        task.done = true;
        task.completed_at = Some(completed_at);
        let origin = task.clone();

        self.store
            .set_task_done(self.session.user, id, true, Some(completed_at))
            .await?;

        let Some(due) = origin.due_date else {
            // Recurrence with no due date never advances.
            return Ok(Completion::Done);
        };
        if origin.recurrence == Recurrence::None {
            return Ok(Completion::Done);
        }

        let mut next = NewTask::new(origin.client_id, origin.title);
        next.project_id = origin.project_id;
        next.due_date = Some(recur::next_due_date(due, origin.recurrence));
        next.priority = origin.priority;
        next.recurrence = origin.recurrence;
        next.parent_task_id = Some(origin.parent_task_id.unwrap_or(id));
        match self.store.insert_task(self.session.user, next).await {
            Ok(successor) => {
                self.tasks.push(successor.clone());
                Ok(Completion::Recurred { successor })
            }
            Err(source) => Err(TaskError::SuccessorLost {
                completed: id,
                source,
            }),
        }
    }

    /// Revert a completed task to pending. Idempotent: reverting a
    /// pending task changes nothing and issues no write. An already
    /// generated successor is never retracted.
    pub fn uncomplete(&mut self, id: TaskId) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        if !task.done {
            return;
        }
        task.done = false;
        task.completed_at = None;
        let store = Arc::clone(&self.store);
        let user = self.session.user;
        background::spawn_write(&self.on_write_failure, "tasks.uncomplete", async move {
            store.set_task_done(user, id, false, None).await
        });
    }

    /// Remove a task locally and delete it in the background.
    pub fn delete(&mut self, id: TaskId) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return;
        }
        let store = Arc::clone(&self.store);
        let user = self.session.user;
        background::spawn_write(&self.on_write_failure, "tasks.delete", async move {
            store.delete_task(user, id).await
        });
    }

    /// Pending tasks in the canonical order: overdue first, then due
    /// date ascending with undated last, then priority.
    #[must_use]
    pub fn pending_sorted(&self, today: Date) -> Vec<Task> {
        let pending: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.is_pending())
            .cloned()
            .collect();
        sort::sort_tasks(&pending, today)
    }

    /// Completed tasks, most recently completed first.
    #[must_use]
    pub fn completed_recent_first(&self) -> Vec<Task> {
        let mut done: Vec<Task> = self.tasks.iter().filter(|t| t.done).cloned().collect();
        done.sort_by(|a, b| match (a.completed_at, b.completed_at) {
            (Some(a_ts), Some(b_ts)) => b_ts.cmp(&a_ts),
            _ => Ordering::Equal,
        });
        done
    }

    /// Pending tasks already past their due date, soonest-due first.
    #[must_use]
    pub fn overdue(&self, today: Date) -> Vec<Task> {
        let mut late: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.is_pending() && t.is_overdue(today))
            .cloned()
            .collect();
        late.sort_by_key(|t| t.due_date);
        late
    }

    /// The single task to work on next: head of the sorted pending list.
    #[must_use]
    pub fn next_up(&self, today: Date) -> Option<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.is_pending())
            .min_by(|a, b| sort::compare_tasks(a, b, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdesk_core::{NewClient, Priority, UserId};
    use opsdesk_store_mem::MemStore;
    use std::sync::Mutex;
    use time::macros::date;

    fn fixture() -> (Arc<MemStore>, Session, opsdesk_core::ClientId) {
        let store = Arc::new(MemStore::new());
        let session = Session::new(UserId::new());
        let client = store
            .insert_client(session.user, NewClient::new("Acme"))
            .map_or_else(|err| panic!("seed client: {err}"), |c| c.id);
        (store, session, client)
    }

    async fn drain_background() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn add_rejects_blank_titles_without_touching_the_store() {
        let (store, session, client) = fixture();
        let mut manager = match TaskManager::load(Arc::clone(&store), session).await {
            Ok(manager) => manager,
            Err(err) => panic!("load: {err}"),
        };
        let result = manager.add(NewTask::new(client, "   ")).await;
        assert!(matches!(result, Err(TaskError::EmptyTitle)));
        assert!(manager.tasks().is_empty());
        assert_eq!(store.list_tasks(session.user).map(|v| v.len()).ok(), Some(0));
    }

    #[tokio::test]
    async fn update_is_optimistic_and_persists_in_background() {
        let (store, session, client) = fixture();
        let mut manager = match TaskManager::load(Arc::clone(&store), session).await {
            Ok(manager) => manager,
            Err(err) => panic!("load: {err}"),
        };
        let task = match manager.add(NewTask::new(client, "Draft")).await {
            Ok(task) => task,
            Err(err) => panic!("add: {err}"),
        };

        manager.update(
            task.id,
            TaskPatch {
                priority: Some(Priority::High),
                ..TaskPatch::default()
            },
        );
        // Local state reflects the change before the write lands.
        assert_eq!(
            manager.get(task.id).map(|t| t.priority),
            Some(Priority::High)
        );

        drain_background().await;
        let rows = store.list_tasks(session.user).unwrap_or_default();
        assert_eq!(rows[0].priority, Priority::High);
    }

    #[tokio::test]
    async fn failed_background_write_keeps_local_state_and_reports() {
        let (store, session, client) = fixture();
        let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut manager = match TaskManager::load(Arc::clone(&store), session).await {
            Ok(manager) => manager,
            Err(err) => panic!("load: {err}"),
        }
        .with_write_failure_hook(Arc::new(move |op, _err| {
            if let Ok(mut ops) = sink.lock() {
                ops.push(op);
            }
        }));
        let task = match manager.add(NewTask::new(client, "Draft")).await {
            Ok(task) => task,
            Err(err) => panic!("add: {err}"),
        };

        store.fail_once("update_task");
        manager.update(
            task.id,
            TaskPatch {
                title: Some("Draft v2".into()),
                ..TaskPatch::default()
            },
        );
        drain_background().await;

        // Local state is authoritative; the store still has the old row.
        assert_eq!(manager.get(task.id).map(|t| t.title.as_str()), Some("Draft v2"));
        let rows = store.list_tasks(session.user).unwrap_or_default();
        assert_eq!(rows[0].title, "Draft");
        assert_eq!(seen.lock().map(|ops| ops.clone()).ok(), Some(vec!["tasks.update"]));
    }

    #[tokio::test]
    async fn completing_twice_never_generates_a_second_successor() {
        let (store, session, client) = fixture();
        let mut manager = match TaskManager::load(Arc::clone(&store), session).await {
            Ok(manager) => manager,
            Err(err) => panic!("load: {err}"),
        };
        let mut new = NewTask::new(client, "Weekly report");
        new.due_date = Some(date!(2024 - 03 - 01));
        new.recurrence = Recurrence::Weekly;
        let task = match manager.add(new).await {
            Ok(task) => task,
            Err(err) => panic!("add: {err}"),
        };

        assert!(matches!(
            manager.complete(task.id).await,
            Ok(Completion::Recurred { .. })
        ));
        assert!(matches!(
            manager.complete(task.id).await,
            Ok(Completion::AlreadyDone)
        ));
        assert_eq!(manager.tasks().len(), 2);
    }

    #[tokio::test]
    async fn set_status_on_missing_id_is_a_silent_noop() {
        let (store, session, _client) = fixture();
        let mut manager = match TaskManager::load(store, session).await {
            Ok(manager) => manager,
            Err(err) => panic!("load: {err}"),
        };
        manager.set_status(TaskId::new(), TaskStatus::Blocked);
        assert!(manager.tasks().is_empty());
    }

    #[tokio::test]
    async fn next_up_picks_the_head_of_the_sorted_order() {
        let (store, session, client) = fixture();
        let mut manager = match TaskManager::load(store, session).await {
            Ok(manager) => manager,
            Err(err) => panic!("load: {err}"),
        };
        let today = date!(2024 - 03 - 01);

        let mut low = NewTask::new(client, "someday");
        low.priority = Priority::Low;
        let mut overdue = NewTask::new(client, "late");
        overdue.due_date = Some(date!(2024 - 02 - 20));
        overdue.priority = Priority::Low;
        let mut soon = NewTask::new(client, "soon");
        soon.due_date = Some(date!(2024 - 03 - 03));
        soon.priority = Priority::High;

        for new in [low, overdue, soon] {
            if let Err(err) = manager.add(new).await {
                panic!("add: {err}");
            }
        }

        assert_eq!(
            manager.next_up(today).map(|t| t.title.as_str()),
            Some("late")
        );
    }
}
