//! Application layer: store abstraction, session scoping, lifecycle
//! managers, and the derived planner and review views.
//!
//! Each manager owns an in-memory snapshot of one collection and keeps
//! it in sync with the store optimistically: local state mutates first,
//! the persistence write runs in the background, and a failed write is
//! reported through a hook rather than rolled back. Creates are the
//! exception and wait for the store, which generates ids and
//! timestamps.

mod background;
pub mod clients;
pub mod notes;
pub mod planner;
pub mod projects;
pub mod review;
pub mod session;
pub mod store;
pub mod tasks;

pub use background::WriteFailureHook;
pub use clients::{ClientManager, ClientTaskCounts, task_counts};
pub use notes::{NoteError, NoteManager, TaskNotes};
pub use planner::{DayColumn, WeekBoard};
pub use projects::ProjectManager;
pub use review::{ReviewSummary, catchup_queue, week_plan};
pub use session::Session;
pub use store::{ClientStore, NoteStore, ProjectStore, StoreError, TaskStore};
pub use tasks::{Completion, TaskError, TaskManager};
