//! Standalone notes and per-task note threads.

use std::sync::Arc;

use opsdesk_core::{Note, NoteId, TaskId, TaskNote};
use thiserror::Error;

use crate::background::{self, WriteFailureHook};
use crate::session::Session;
use crate::store::{NoteStore, StoreError};

/// Errors surfaced by note operations.
#[derive(Error, Debug)]
pub enum NoteError {
    /// Notes must have non-blank content.
    #[error("note content must not be empty")]
    EmptyContent,

    /// The store rejected or lost a write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owner of the in-memory note snapshot for one session, newest first.
pub struct NoteManager<S> {
    store: Arc<S>,
    session: Session,
    notes: Vec<Note>,
    on_write_failure: WriteFailureHook,
}

impl<S: NoteStore + 'static> NoteManager<S> {
    /// Fetch the session's notes and build a manager around them.
    ///
    /// # Errors
    /// Fails when the initial list cannot be fetched.
    pub async fn load(store: Arc<S>, session: Session) -> Result<Self, StoreError> {
        let notes = store.list_notes(session.user).await?;
        Ok(Self {
            store,
            session,
            notes,
            on_write_failure: background::log_failures(),
        })
    }

    /// Replace the default write-failure hook.
    #[must_use]
    pub fn with_write_failure_hook(mut self, hook: WriteFailureHook) -> Self {
        self.on_write_failure = hook;
        self
    }

    /// The current snapshot, newest first.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Discard local state and re-fetch the authoritative snapshot.
    ///
    /// # Errors
    /// Fails when the list cannot be fetched; local state is kept.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        self.notes = self.store.list_notes(self.session.user).await?;
        Ok(())
    }

    /// Create a note and prepend it to the snapshot. Waits for the
    /// store and reports failure to the caller; this is the one note
    /// path where the user is told the save did not land.
    ///
    /// # Errors
    /// Rejects blank content before any store call; surfaces insert
    /// failures with no local change.
    pub async fn add(&mut self, content: impl Into<String>) -> Result<Note, NoteError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(NoteError::EmptyContent);
        }
        let note = self.store.insert_note(self.session.user, content).await?;
        self.notes.insert(0, note.clone());
        Ok(note)
    }

    /// Replace a note's content locally and persist in the background.
    /// Unknown ids are a silent no-op.
    ///
    /// # Errors
    /// Rejects blank content before touching anything.
    pub fn update(&mut self, id: NoteId, content: impl Into<String>) -> Result<(), NoteError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(NoteError::EmptyContent);
        }
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return Ok(());
        };
        note.content.clone_from(&content);
        let store = Arc::clone(&self.store);
        let user = self.session.user;
        background::spawn_write(&self.on_write_failure, "notes.update", async move {
            store.update_note(user, id, content).await
        });
        Ok(())
    }

    /// Remove a note locally and delete it in the background.
    pub fn delete(&mut self, id: NoteId) {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        if self.notes.len() == before {
            return;
        }
        let store = Arc::clone(&self.store);
        let user = self.session.user;
        background::spawn_write(&self.on_write_failure, "notes.delete", async move {
            store.delete_note(user, id).await
        });
    }
}

/// The note thread attached to one task, newest first.
///
/// Loaded on demand when a task's detail opens, separate from the
/// session-wide [`NoteManager`] snapshot.
pub struct TaskNotes<S> {
    store: Arc<S>,
    session: Session,
    task: TaskId,
    notes: Vec<TaskNote>,
}

impl<S: NoteStore + 'static> TaskNotes<S> {
    /// Fetch the thread for `task`.
    ///
    /// # Errors
    /// Fails when the list cannot be fetched.
    pub async fn load(store: Arc<S>, session: Session, task: TaskId) -> Result<Self, StoreError> {
        let notes = store.list_task_notes(session.user, task).await?;
        Ok(Self {
            store,
            session,
            task,
            notes,
        })
    }

    /// The task this thread belongs to.
    #[must_use]
    pub const fn task(&self) -> TaskId {
        self.task
    }

    /// The thread, newest first.
    #[must_use]
    pub fn notes(&self) -> &[TaskNote] {
        &self.notes
    }

    /// Append to the thread. Waits for the store and reports failure.
    ///
    /// # Errors
    /// Rejects blank content before any store call; surfaces insert
    /// failures with no local change.
    pub async fn add(&mut self, content: impl Into<String>) -> Result<TaskNote, NoteError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(NoteError::EmptyContent);
        }
        let note = self
            .store
            .insert_task_note(self.session.user, self.task, content)
            .await?;
        self.notes.insert(0, note.clone());
        Ok(note)
    }
}
