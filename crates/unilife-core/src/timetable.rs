//! Timetable Index - pure lookup over the weekly class grid.
//!
//! Period windows are fixed institution-wide; the per-user part is the grid
//! plus the subject list in [`WeekSchedule`].

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Timetable, WeekSchedule, PERIODS_PER_DAY, WEEKDAYS};

/// Fixed period windows as (start, end) minutes since midnight:
/// 09:00-10:15, 10:30-11:45, 12:00-13:15, 13:30-14:45, 15:00-16:15,
/// 16:30-17:45.
pub const PERIOD_WINDOWS: [(u16, u16); PERIODS_PER_DAY] = [
    (540, 615),
    (630, 705),
    (720, 795),
    (810, 885),
    (900, 975),
    (990, 1065),
];

/// The period (1-6) whose window contains the given clock time, if any.
/// Times in the gaps between periods yield `None`.
pub fn period_for_clock_time(minutes_since_midnight: u16) -> Option<usize> {
    PERIOD_WINDOWS
        .iter()
        .position(|&(start, end)| minutes_since_midnight >= start && minutes_since_midnight < end)
        .map(|idx| idx + 1)
}

/// The chronologically nearest upcoming class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextClass {
    /// Weekday index 0-4.
    pub day: u8,
    /// Start hour of day.
    pub hour: u8,
    /// Start minute within the hour.
    pub minute: u8,
    pub subject: String,
    /// Period 1-6.
    pub period: usize,
}

/// Scan forward from `now` across the remaining periods of today and, if
/// none remain, periods 1-6 of each subsequent weekday (wrapping Friday to
/// Monday), returning the nearest session that is both marked in the grid
/// and present in the session list. Weekends have no reference weekday, so
/// the scan yields `None` there, same as a week with no classes at all.
pub fn next_class(
    timetable: &Timetable,
    schedule: &WeekSchedule,
    now: DateTime<Utc>,
) -> Option<NextClass> {
    let today = now.weekday().num_days_from_monday() as usize;
    if today >= WEEKDAYS {
        return None;
    }
    let now_minutes = (now.hour() * 60 + now.minute()) as u16;

    // Offsets ascend and periods ascend within a day, so the first hit is
    // strictly the chronologically nearest one; ties are impossible.
    for offset in 0..WEEKDAYS {
        let day = (today + offset) % WEEKDAYS;
        for period in 1..=PERIODS_PER_DAY {
            let (start, _end) = PERIOD_WINDOWS[period - 1];
            if offset == 0 && start <= now_minutes {
                continue;
            }
            if !timetable.has_class(day, period) {
                continue;
            }
            let Some(session) = schedule.session_at(day, start) else {
                continue;
            };
            return Some(NextClass {
                day: day as u8,
                hour: (start / 60) as u8,
                minute: (start % 60) as u8,
                subject: session.subject.clone(),
                period,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassSession;
    use chrono::TimeZone;

    fn session(subject: &str, period: usize) -> ClassSession {
        let (start, end) = PERIOD_WINDOWS[period - 1];
        ClassSession {
            start,
            end,
            subject: subject.to_string(),
        }
    }

    /// 2026-08-24 is a Monday.
    fn weekday_at(day_offset: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24 + day_offset, hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_period_for_clock_time_windows_and_gaps() {
        assert_eq!(period_for_clock_time(540), Some(1));
        assert_eq!(period_for_clock_time(614), Some(1));
        // 10:15-10:30 is a gap.
        assert_eq!(period_for_clock_time(615), None);
        assert_eq!(period_for_clock_time(629), None);
        assert_eq!(period_for_clock_time(630), Some(2));
        assert_eq!(period_for_clock_time(1064), Some(6));
        assert_eq!(period_for_clock_time(1065), None);
        assert_eq!(period_for_clock_time(0), None);
    }

    #[test]
    fn test_next_class_finds_later_period_today() {
        let mut grid = Timetable::default();
        grid.0[0][3] = 1; // Monday period 4
        let mut schedule = WeekSchedule::default();
        schedule.days[0].push(session("Databases", 4));

        // Monday 12:10, period 4 starts 13:30.
        let found = next_class(&grid, &schedule, weekday_at(0, 12, 10)).unwrap();
        assert_eq!(found.day, 0);
        assert_eq!(found.period, 4);
        assert_eq!(found.hour, 13);
        assert_eq!(found.minute, 30);
        assert_eq!(found.subject, "Databases");
    }

    #[test]
    fn test_next_class_never_returns_past_or_current_start() {
        let mut grid = Timetable::default();
        grid.0[0][0] = 1;
        let mut schedule = WeekSchedule::default();
        schedule.days[0].push(session("Calculus", 1));

        // Exactly at the 09:00 start the session is no longer "upcoming".
        assert!(next_class(&grid, &schedule, weekday_at(0, 9, 0)).is_none());
        assert!(next_class(&grid, &schedule, weekday_at(0, 18, 0)).is_none());
        // A minute before it still is.
        assert!(next_class(&grid, &schedule, weekday_at(0, 8, 59)).is_some());
    }

    #[test]
    fn test_next_class_wraps_friday_to_monday() {
        let mut grid = Timetable::default();
        grid.0[0][0] = 1; // Monday period 1
        let mut schedule = WeekSchedule::default();
        schedule.days[0].push(session("Calculus", 1));

        // Friday evening: the nearest marked session is Monday period 1.
        let found = next_class(&grid, &schedule, weekday_at(4, 19, 0)).unwrap();
        assert_eq!(found.day, 0);
        assert_eq!(found.period, 1);
    }

    #[test]
    fn test_next_class_is_none_on_weekends_and_without_sessions() {
        let mut grid = Timetable::default();
        grid.0[2][2] = 1;
        let mut schedule = WeekSchedule::default();
        schedule.days[2].push(session("Physics", 3));

        // 2026-08-29 is a Saturday.
        assert!(next_class(&grid, &schedule, weekday_at(5, 10, 0)).is_none());

        // Grid marked but session list empty yields nothing either.
        let empty = WeekSchedule::default();
        assert!(next_class(&grid, &empty, weekday_at(0, 8, 0)).is_none());
    }
}
