use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::dates;
use crate::id::{ClientId, ProjectId, TaskId, UserId};

/// Task priority, ranked high before medium before low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Needs attention first.
    High,
    /// Everyday work.
    #[default]
    Medium,
    /// Whenever there is time.
    Low,
}

impl Priority {
    /// Sort rank: lower sorts earlier.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Wire/label string for this priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Recurrence cadence controlling successor generation on completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// One-off task.
    #[default]
    None,
    /// Repeats every calendar day.
    Daily,
    /// Repeats every seven days.
    Weekly,
    /// Repeats every calendar month.
    Monthly,
}

impl Recurrence {
    /// Wire/label string for this cadence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// Working status of a pending task, independent of completion.
///
/// A task carries a status while pending; completion is tracked
/// separately via `done`/`completed_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Nothing has happened yet.
    #[default]
    NotStarted,
    /// Actively being worked on.
    InProgress,
    /// Waiting on something external.
    Blocked,
    /// Deliberately parked.
    Paused,
}

impl TaskStatus {
    /// Wire/label string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Paused => "paused",
        }
    }
}

/// A unit of work for a client, optionally attached to one of the
/// client's projects.
///
/// Invariants maintained by the lifecycle manager:
/// - `done` is true exactly when `completed_at` is set.
/// - if `project_id` is set, that project belongs to `client_id`.
/// - `scheduled_date` (planner placement) is independent of `due_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Record identifier.
    pub id: TaskId,
    /// Owning user.
    pub user_id: UserId,
    /// Client this work is for.
    pub client_id: ClientId,
    /// Optional project within the same client.
    pub project_id: Option<ProjectId>,
    /// Short description of the work.
    pub title: String,
    /// Calendar day the task is due, if any.
    #[serde(with = "crate::iso_date::option")]
    pub due_date: Option<Date>,
    /// Priority used as the final ordering tie-break.
    pub priority: Priority,
    /// Completion flag.
    pub done: bool,
    /// Working status while pending.
    pub status: TaskStatus,
    /// Cadence for generating a successor on completion.
    pub recurrence: Recurrence,
    /// Set exactly when `done` flips to true; cleared on revert.
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Origin of a generated recurrence instance: every successor in a
    /// chain points back at the first task.
    pub parent_task_id: Option<TaskId>,
    /// Day the planner has placed this task on, if any.
    #[serde(with = "crate::iso_date::option")]
    pub scheduled_date: Option<Date>,
    /// Insertion timestamp assigned by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Task {
    /// True while the task has not been completed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.done
    }

    /// True iff the task has a due date strictly before `today`.
    #[must_use]
    pub fn is_overdue(&self, today: Date) -> bool {
        dates::is_overdue(self.due_date, today)
    }
}

/// Payload for creating a task. The store assigns id, owner, and
/// creation timestamp; completion fields always start cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    /// Client the task belongs to.
    pub client_id: ClientId,
    /// Optional project within the same client.
    pub project_id: Option<ProjectId>,
    /// Short description of the work; must not be blank.
    pub title: String,
    /// Optional due day.
    #[serde(with = "crate::iso_date::option")]
    pub due_date: Option<Date>,
    /// Defaults to medium.
    pub priority: Priority,
    /// Defaults to none.
    pub recurrence: Recurrence,
    /// Defaults to not started.
    pub status: TaskStatus,
    /// Set on generated recurrence instances.
    pub parent_task_id: Option<TaskId>,
    /// Optional planner placement.
    #[serde(with = "crate::iso_date::option")]
    pub scheduled_date: Option<Date>,
}

impl NewTask {
    /// A task for `client_id` with every optional field at its default.
    pub fn new(client_id: ClientId, title: impl Into<String>) -> Self {
        Self {
            client_id,
            project_id: None,
            title: title.into(),
            due_date: None,
            priority: Priority::default(),
            recurrence: Recurrence::default(),
            status: TaskStatus::default(),
            parent_task_id: None,
            scheduled_date: None,
        }
    }
}
