//! Date classification, display formatting, and week arithmetic.
//!
//! Tasks and projects carry calendar dates with no time component, so
//! every classifier here works on `time::Date` and takes "today" as an
//! explicit argument. Only [`today`] touches the environment clock.

use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

/// A rolling seven-day window anchored on today.
///
/// This is the "this week" window the weekly review uses, distinct from
/// the Mon–Fri work week the planner renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekBounds {
    /// First day of the window (today).
    pub start: Date,
    /// Last day of the window (today + 6 days).
    pub end: Date,
}

/// Weekday and date labels for a planner column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayHeader {
    /// Short weekday name, e.g. `Mon`.
    pub weekday: String,
    /// Short date, e.g. `Feb 24`.
    pub date: String,
}

/// The current calendar date in the local timezone, falling back to UTC
/// when the local offset cannot be determined.
#[must_use]
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// True iff `date` is set and strictly before `today`.
#[must_use]
pub fn is_overdue(date: Option<Date>, today: Date) -> bool {
    date.is_some_and(|d| d < today)
}

/// True iff `date` is set and equal to `today`.
#[must_use]
pub fn is_today(date: Option<Date>, today: Date) -> bool {
    date == Some(today)
}

/// True iff `date` falls within 0–6 days from `today` inclusive.
///
/// Computed as a day-count difference so month and year rollovers are
/// handled correctly.
#[must_use]
pub fn is_this_week(date: Option<Date>, today: Date) -> bool {
    date.is_some_and(|d| {
        let diff = d.to_julian_day() - today.to_julian_day();
        (0..=6).contains(&diff)
    })
}

/// Format a date for task rows: empty for `None`, `Today`/`Tomorrow` for
/// the next two days, otherwise a short `Mon D` form.
#[must_use]
pub fn format_date(date: Option<Date>, today: Date) -> String {
    let Some(date) = date else {
        return String::new();
    };
    if date == today {
        return "Today".to_owned();
    }
    if Some(date) == today.next_day() {
        return "Tomorrow".to_owned();
    }
    date.format(format_description!(
        "[month repr:short] [day padding:none]"
    ))
    .unwrap_or_default()
}

/// Long form with the weekday, e.g. `Thu Feb 27`. Empty for `None`.
#[must_use]
pub fn format_date_long(date: Option<Date>) -> String {
    let Some(date) = date else {
        return String::new();
    };
    date.format(format_description!(
        "[weekday repr:short] [month repr:short] [day padding:none]"
    ))
    .unwrap_or_default()
}

/// Format a timestamp as `Mon D, YYYY, h:mm am/pm`.
#[must_use]
pub fn format_date_time(ts: OffsetDateTime) -> String {
    ts.format(format_description!(
        "[month repr:short] [day padding:none], [year], [hour repr:12 padding:none]:[minute] [period case:lower]"
    ))
    .unwrap_or_default()
}

/// Weekday/date label pair for a planner column header.
#[must_use]
pub fn format_day_header(date: Date) -> DayHeader {
    DayHeader {
        weekday: date
            .format(format_description!("[weekday repr:short]"))
            .unwrap_or_default(),
        date: date
            .format(format_description!(
                "[month repr:short] [day padding:none]"
            ))
            .unwrap_or_default(),
    }
}

/// Monday–Friday of the week `week_offset` weeks away from `today`.
///
/// Offset 0 is the current week; the current week's Monday is found by
/// rolling today back to the most recent Monday, so a Sunday belongs to
/// the week that started six days earlier.
#[must_use]
pub fn work_week(today: Date, week_offset: i64) -> [Date; 5] {
    let back = i64::from(today.weekday().number_days_from_monday());
    let monday = today - Duration::days(back) + Duration::weeks(week_offset);
    let mut days = [monday; 5];
    let mut day = monday;
    for slot in &mut days {
        *slot = day;
        day += Duration::days(1);
    }
    days
}

/// The rolling seven-day window starting at `today`.
#[must_use]
pub fn week_bounds(today: Date) -> WeekBounds {
    WeekBounds {
        start: today,
        end: today + Duration::days(6),
    }
}
