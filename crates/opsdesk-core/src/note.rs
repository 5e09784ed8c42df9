use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::{NoteId, TaskId, TaskNoteId, UserId};

/// A standalone free-form note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Record identifier.
    pub id: NoteId,
    /// Owning user.
    pub user_id: UserId,
    /// Note body.
    pub content: String,
    /// Insertion timestamp assigned by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Bumped by the store on every content update.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A note attached to a single task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNote {
    /// Record identifier.
    pub id: TaskNoteId,
    /// Task the note is attached to.
    pub task_id: TaskId,
    /// Owning user.
    pub user_id: UserId,
    /// Note body.
    pub content: String,
    /// Insertion timestamp assigned by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
