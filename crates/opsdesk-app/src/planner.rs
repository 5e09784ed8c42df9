//! The weekly planner board: five work-day columns plus a backlog.

use opsdesk_core::{Task, dates, sort};
use time::Date;

/// One planner day and the tasks placed on it.
#[derive(Debug, Clone)]
pub struct DayColumn {
    /// The calendar day this column renders.
    pub date: Date,
    /// Weekday/date labels for the column header.
    pub header: dates::DayHeader,
    /// Whether this column is today.
    pub is_today: bool,
    /// Tasks scheduled on this day, snapshot order.
    pub tasks: Vec<Task>,
}

/// A Mon–Fri planner view over one task snapshot.
///
/// Scheduling state lives on the tasks themselves (`scheduled_date`), so
/// the board is a pure projection rebuilt after every mutation.
#[derive(Debug, Clone)]
pub struct WeekBoard {
    /// The five work-day columns, Monday first.
    pub days: [DayColumn; 5],
    /// Pending tasks not placed on any of the viewed days, in the
    /// canonical order: overdue first, due ascending, then priority.
    pub backlog: Vec<Task>,
}

impl WeekBoard {
    /// Project `tasks` onto the work week `week_offset` weeks away from
    /// `today`.
    ///
    /// A day column shows every task scheduled on that day, completed
    /// ones included, so finished work stays visible on the board. The
    /// backlog holds pending tasks not placed on any of the five viewed
    /// days; a task scheduled in another week shows up here too, since
    /// this view cannot reach it otherwise.
    #[must_use]
    pub fn build(tasks: &[Task], today: Date, week_offset: i64) -> Self {
        let week = dates::work_week(today, week_offset);
        let days = week.map(|date| DayColumn {
            date,
            header: dates::format_day_header(date),
            is_today: date == today,
            tasks: tasks
                .iter()
                .filter(|t| t.scheduled_date == Some(date))
                .cloned()
                .collect(),
        });
        let backlog: Vec<Task> = tasks
            .iter()
            .filter(|t| t.is_pending() && t.scheduled_date.is_none_or(|d| !week.contains(&d)))
            .cloned()
            .collect();
        Self {
            days,
            backlog: sort::sort_tasks(&backlog, today),
        }
    }

    /// Tasks scheduled on `date`, if it is on the board.
    #[must_use]
    pub fn day(&self, date: Date) -> Option<&DayColumn> {
        self.days.iter().find(|d| d.date == date)
    }
}
