//! Domain types and pure helpers for the opsdesk agency planner.
//!
//! Everything in this crate is side-effect free: entities, typed patch
//! payloads, and the small cluster of deterministic helpers (color
//! resolution, date classification, recurrence advancement, task
//! ordering) that the app layer builds its views from.

/// Client entity and its enums.
pub mod client;
/// Legacy color token resolution.
pub mod color;
/// Date classification, formatting, and week arithmetic.
pub mod dates;
/// Identifier types.
pub mod id;
/// Standalone notes and per-task notes.
pub mod note;
/// Typed partial-update payloads.
pub mod patch;
/// Project entity.
pub mod project;
/// Recurrence cadence advancement.
pub mod recur;
/// Task ordering.
pub mod sort;
/// Task entity and its enums.
pub mod task;

// Date-only wire format shared by every entity: zero-padded ISO calendar
// dates, so lexicographic order on the stored strings matches `Date`'s Ord.
time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub use client::{Client, ClientStatus, ContractType, NewClient};
pub use id::{ClientId, NoteId, ProjectId, TaskId, TaskNoteId, UserId};
pub use note::{Note, TaskNote};
pub use patch::{ClientPatch, FieldPatch, ProjectPatch, TaskPatch};
pub use project::{NewProject, Project, ProjectStatus};
pub use task::{NewTask, Priority, Recurrence, Task, TaskStatus};
