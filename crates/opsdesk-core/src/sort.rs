//! The single total ordering over task collections.
//!
//! Used for the flat task list, the planner backlog, and the weekly
//! review plan, so the orderings can never drift apart.

use std::cmp::Ordering;

use time::Date;

use crate::task::Task;

/// Strict comparator behind [`sort_tasks`]: overdue first, then due date
/// ascending with undated tasks last, then priority rank.
#[must_use]
pub fn compare_tasks(a: &Task, b: &Task, today: Date) -> Ordering {
    // `true` sorts after `false`, so compare "not overdue".
    b.is_overdue(today)
        .cmp(&a.is_overdue(today))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
}

/// Return a newly ordered copy of `tasks` without mutating the input.
///
/// The sort is stable: tasks that tie on all three keys keep their
/// relative input order.
#[must_use]
pub fn sort_tasks(tasks: &[Task], today: Date) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| compare_tasks(a, b, today));
    sorted
}
