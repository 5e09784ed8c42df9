//! Advances a due date by a recurrence cadence.

use time::{Date, Duration};

use crate::task::Recurrence;

/// Compute the due date of the next occurrence.
///
/// Daily and weekly add whole days; monthly uses calendar month
/// arithmetic, clamping the day-of-month when the target month is
/// shorter (Jan 31 → Feb 29/28). [`Recurrence::None`] returns the input
/// unchanged; callers only invoke this for repeating tasks.
#[must_use]
pub fn next_due_date(current: Date, cadence: Recurrence) -> Date {
    match cadence {
        Recurrence::None => current,
        Recurrence::Daily => current + Duration::days(1),
        Recurrence::Weekly => current + Duration::days(7),
        Recurrence::Monthly => next_month(current),
    }
}

fn next_month(date: Date) -> Date {
    let month = date.month().next();
    let year = if month == time::Month::January {
        date.year() + 1
    } else {
        date.year()
    };
    let day = date.day().min(month.length(year));
    // The day is clamped to the target month, so this cannot fail.
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}
