//! Typed partial-update payloads.
//!
//! Each entity has a patch struct listing exactly its mutable fields, so
//! an update can only touch what the data model allows. The same patch is
//! applied twice: once to the in-memory snapshot (the optimistic half of
//! a mutation) and once by the store to the persisted row.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::client::{Client, ClientStatus, ContractType};
use crate::id::{ClientId, ProjectId};
use crate::project::{Project, ProjectStatus};
use crate::task::{Priority, Recurrence, Task, TaskStatus};

/// Update instruction for a nullable field.
///
/// Plain `Option` cannot distinguish "leave alone" from "set to null",
/// so nullable columns patch through this three-way enum instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPatch<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Null the field out.
    Clear,
    /// Overwrite with a new value.
    Set(T),
}

impl<T: Clone> FieldPatch<T> {
    /// Apply this instruction to a nullable slot.
    pub fn apply_to(&self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value.clone()),
        }
    }

    /// True when the instruction leaves the field untouched.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

impl<T> From<Option<T>> for FieldPatch<T> {
    /// `Some` sets, `None` clears. Useful when a caller holds the full
    /// desired value rather than a diff.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

/// Mutable fields of a [`Task`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// Move the task to another client.
    pub client_id: Option<ClientId>,
    /// Attach to, move between, or detach from a project.
    pub project_id: FieldPatch<ProjectId>,
    /// Change or clear the due day.
    pub due_date: FieldPatch<Date>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New recurrence cadence.
    pub recurrence: Option<Recurrence>,
    /// New working status; never touches `done`.
    pub status: Option<TaskStatus>,
    /// Place on or remove from a planner day.
    pub scheduled_date: FieldPatch<Date>,
}

impl TaskPatch {
    /// True when applying the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.client_id.is_none()
            && self.project_id.is_keep()
            && self.due_date.is_keep()
            && self.priority.is_none()
            && self.recurrence.is_none()
            && self.status.is_none()
            && self.scheduled_date.is_keep()
    }
}

impl Task {
    /// Merge a patch into this task. Completion fields are untouchable
    /// here; they only move through the complete/uncomplete operations.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(client_id) = patch.client_id {
            self.client_id = client_id;
        }
        patch.project_id.apply_to(&mut self.project_id);
        patch.due_date.apply_to(&mut self.due_date);
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(recurrence) = patch.recurrence {
            self.recurrence = recurrence;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        patch.scheduled_date.apply_to(&mut self.scheduled_date);
    }
}

/// Mutable fields of a [`Client`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientPatch {
    /// New display name.
    pub name: Option<String>,
    /// New relationship status.
    pub status: Option<ClientStatus>,
    /// New billing model.
    pub contract_type: Option<ContractType>,
    /// New monthly revenue; the store rejects negative values.
    pub monthly_revenue: Option<f64>,
    /// New lifetime revenue; the store rejects negative values.
    pub total_revenue: Option<f64>,
    /// New free-form notes.
    pub notes: Option<String>,
    /// New color token.
    pub color: Option<String>,
}

impl ClientPatch {
    /// True when applying the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.contract_type.is_none()
            && self.monthly_revenue.is_none()
            && self.total_revenue.is_none()
            && self.notes.is_none()
            && self.color.is_none()
    }
}

impl Client {
    /// Merge a patch into this client.
    pub fn apply(&mut self, patch: &ClientPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(contract_type) = patch.contract_type {
            self.contract_type = contract_type;
        }
        if let Some(monthly_revenue) = patch.monthly_revenue {
            self.monthly_revenue = monthly_revenue;
        }
        if let Some(total_revenue) = patch.total_revenue {
            self.total_revenue = total_revenue;
        }
        if let Some(notes) = &patch.notes {
            self.notes.clone_from(notes);
        }
        if let Some(color) = &patch.color {
            self.color.clone_from(color);
        }
    }
}

/// Mutable fields of a [`Project`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// New display name.
    pub name: Option<String>,
    /// New delivery state.
    pub status: Option<ProjectStatus>,
    /// Change or clear the delivery date.
    pub due_date: FieldPatch<Date>,
}

impl ProjectPatch {
    /// True when applying the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none() && self.due_date.is_keep()
    }
}

impl Project {
    /// Merge a patch into this project.
    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        patch.due_date.apply_to(&mut self.due_date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{TaskId, UserId};
    use time::macros::{date, datetime};

    fn sample_task() -> Task {
        Task {
            id: TaskId::new(),
            user_id: UserId::new(),
            client_id: ClientId::new(),
            project_id: Some(ProjectId::new()),
            title: "Draft copy".to_owned(),
            due_date: Some(date!(2024 - 03 - 01)),
            priority: Priority::Medium,
            done: false,
            status: TaskStatus::NotStarted,
            recurrence: Recurrence::None,
            completed_at: None,
            parent_task_id: None,
            scheduled_date: None,
            created_at: datetime!(2024-02-20 08:00 UTC),
        }
    }

    #[test]
    fn default_patch_changes_nothing() {
        let mut task = sample_task();
        let before = task.clone();
        task.apply(&TaskPatch::default());
        assert!(TaskPatch::default().is_empty());
        assert_eq!(task.title, before.title);
        assert_eq!(task.due_date, before.due_date);
        assert_eq!(task.project_id, before.project_id);
    }

    #[test]
    fn clear_nulls_out_nullable_fields() {
        let mut task = sample_task();
        let patch = TaskPatch {
            due_date: FieldPatch::Clear,
            project_id: FieldPatch::Clear,
            ..TaskPatch::default()
        };
        task.apply(&patch);
        assert!(task.due_date.is_none());
        assert!(task.project_id.is_none());
    }

    #[test]
    fn set_overwrites_and_keep_preserves() {
        let mut task = sample_task();
        let patch = TaskPatch {
            title: Some("Final copy".to_owned()),
            due_date: FieldPatch::Set(date!(2024 - 04 - 01)),
            priority: Some(Priority::High),
            ..TaskPatch::default()
        };
        task.apply(&patch);
        assert_eq!(task.title, "Final copy");
        assert_eq!(task.due_date, Some(date!(2024 - 04 - 01)));
        assert_eq!(task.priority, Priority::High);
        // Untouched by the patch.
        assert!(task.project_id.is_some());
        assert_eq!(task.status, TaskStatus::NotStarted);
    }

    #[test]
    fn status_patch_never_touches_completion() {
        let mut task = sample_task();
        task.done = true;
        task.completed_at = Some(datetime!(2024-03-01 12:00 UTC));
        let patch = TaskPatch {
            status: Some(TaskStatus::Blocked),
            ..TaskPatch::default()
        };
        task.apply(&patch);
        assert!(task.done);
        assert!(task.completed_at.is_some());
        assert_eq!(task.status, TaskStatus::Blocked);
    }

    #[test]
    fn field_patch_from_option_sets_or_clears() {
        assert_eq!(FieldPatch::from(Some(1)), FieldPatch::Set(1));
        assert_eq!(FieldPatch::<i32>::from(None), FieldPatch::Clear);
    }
}
