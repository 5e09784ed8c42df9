//! Weekly review: the catch-up queue, the week plan, and the summary.

use opsdesk_core::{Task, dates, sort};
use time::{Date, Duration};

/// Pending tasks already past their due date, soonest-due first.
///
/// This is the first review step: everything that slipped, oldest debt
/// at the top.
#[must_use]
pub fn catchup_queue(tasks: &[Task], today: Date) -> Vec<Task> {
    let mut late: Vec<Task> = tasks
        .iter()
        .filter(|t| t.is_pending() && t.is_overdue(today))
        .cloned()
        .collect();
    late.sort_by_key(|t| t.due_date);
    late
}

/// Pending tasks that need attention this week: overdue or due inside
/// the rolling seven-day window, in the canonical order.
#[must_use]
pub fn week_plan(tasks: &[Task], today: Date) -> Vec<Task> {
    let plan: Vec<Task> = tasks
        .iter()
        .filter(|t| {
            t.is_pending()
                && (t.is_overdue(today) || dates::is_this_week(t.due_date, today))
        })
        .cloned()
        .collect();
    sort::sort_tasks(&plan, today)
}

/// Headline counts for the review's opening and closing steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    /// Pending tasks past their due date.
    pub overdue: usize,
    /// Pending tasks due inside the rolling seven-day window.
    pub due_this_week: usize,
    /// Tasks completed within the last seven days.
    pub completed_this_week: usize,
}

impl ReviewSummary {
    /// Tally the snapshot against `today`.
    #[must_use]
    pub fn build(tasks: &[Task], today: Date) -> Self {
        let week_ago = today - Duration::days(6);
        let mut summary = Self::default();
        for task in tasks {
            if task.is_pending() {
                if task.is_overdue(today) {
                    summary.overdue += 1;
                } else if dates::is_this_week(task.due_date, today) {
                    summary.due_this_week += 1;
                }
            } else if task
                .completed_at
                .is_some_and(|ts| (week_ago..=today).contains(&ts.date()))
            {
                summary.completed_this_week += 1;
            }
        }
        summary
    }
}
