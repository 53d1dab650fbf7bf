//! Date/day/time window check

use adplace_core::{DayOfWeek, Schedule};
use time::{PrimitiveDateTime, Time};

use crate::Rejection;

/// Day bounds are inclusive: the whole of `end_date` up to 23:59:59 passes.
pub fn check(schedule: &Schedule, now: PrimitiveDateTime) -> Result<(), Rejection> {
    let today = now.date();

    if schedule.start_date.is_some_and(|start| today < start) {
        return Err(Rejection::NotStarted);
    }
    if schedule.end_date.is_some_and(|end| today > end) {
        return Err(Rejection::Expired);
    }
    if !schedule.days.is_empty() && !schedule.days.contains(&DayOfWeek::from(now.weekday())) {
        return Err(Rejection::Weekday);
    }
    if !in_window(schedule.time_start, schedule.time_end, now.time()) {
        return Err(Rejection::TimeWindow);
    }
    Ok(())
}

/// Inclusive clock window. `start > end` wraps past midnight; a missing bound is open.
fn in_window(start: Option<Time>, end: Option<Time>, clock: Time) -> bool {
    match (start, end) {
        (None, None) => true,
        (Some(start), None) => clock >= start,
        (None, Some(end)) => clock <= end,
        (Some(start), Some(end)) if start <= end => clock >= start && clock <= end,
        (Some(start), Some(end)) => clock >= start || clock <= end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    fn bounded() -> Schedule {
        Schedule {
            start_date: Some(date!(2026 - 10 - 01)),
            end_date: Some(date!(2026 - 10 - 31)),
            ..Schedule::default()
        }
    }

    #[test]
    fn test_empty_schedule_always_passes() {
        assert!(check(&Schedule::default(), datetime!(1999-01-01 00:00)).is_ok());
    }

    #[test]
    fn test_end_date_inclusive_to_last_second() {
        let schedule = bounded();
        assert!(check(&schedule, datetime!(2026-10-31 23:59:59)).is_ok());
        assert_eq!(check(&schedule, datetime!(2026-11-01 00:00:00)), Err(Rejection::Expired));
    }

    #[test]
    fn test_start_date_inclusive_from_midnight() {
        let schedule = bounded();
        assert!(check(&schedule, datetime!(2026-10-01 00:00:00)).is_ok());
        assert_eq!(check(&schedule, datetime!(2026-09-30 23:59:59)), Err(Rejection::NotStarted));
    }

    #[test]
    fn test_days_of_week() {
        let schedule = Schedule {
            days: [DayOfWeek::Saturday, DayOfWeek::Sunday].into_iter().collect(),
            ..Schedule::default()
        };
        // 2026-10-17 is a Saturday
        assert!(check(&schedule, datetime!(2026-10-17 10:00)).is_ok());
        assert_eq!(check(&schedule, datetime!(2026-10-19 10:00)), Err(Rejection::Weekday));
    }

    #[test]
    fn test_time_window() {
        let schedule = Schedule {
            time_start: Some(time!(09:00)),
            time_end: Some(time!(17:00)),
            ..Schedule::default()
        };
        assert!(check(&schedule, datetime!(2026-10-19 09:00)).is_ok());
        assert!(check(&schedule, datetime!(2026-10-19 17:00)).is_ok());
        assert_eq!(check(&schedule, datetime!(2026-10-19 17:00:01)), Err(Rejection::TimeWindow));
        assert_eq!(check(&schedule, datetime!(2026-10-19 08:59)), Err(Rejection::TimeWindow));
    }

    #[test]
    fn test_overnight_window() {
        let schedule = Schedule {
            time_start: Some(time!(22:00)),
            time_end: Some(time!(06:00)),
            ..Schedule::default()
        };
        assert!(check(&schedule, datetime!(2026-10-19 23:30)).is_ok());
        assert!(check(&schedule, datetime!(2026-10-19 05:00)).is_ok());
        assert_eq!(check(&schedule, datetime!(2026-10-19 12:00)), Err(Rejection::TimeWindow));
    }

    #[test]
    fn test_open_ended_window() {
        let schedule = Schedule {
            time_start: Some(time!(18:00)),
            ..Schedule::default()
        };
        assert!(check(&schedule, datetime!(2026-10-19 23:59)).is_ok());
        assert!(check(&schedule, datetime!(2026-10-19 17:59)).is_err());
    }
}
