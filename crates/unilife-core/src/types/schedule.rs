//! Weekly class grid and session list.

use serde::{Deserialize, Serialize};

/// Monday through Friday.
pub const WEEKDAYS: usize = 5;
/// Periods 1 through 6.
pub const PERIODS_PER_DAY: usize = 6;

/// Per-user weekly class grid: weekday 0-4 x period 1-6, cell != 0 means
/// "has class". Wholly replaced whenever settings are re-submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable(pub [[u8; PERIODS_PER_DAY]; WEEKDAYS]);

impl Timetable {
    /// Whether the grid marks a class for (day 0-4, period 1-6).
    /// Any out-of-range index reads as "no class" rather than failing.
    pub fn has_class(&self, day: usize, period: usize) -> bool {
        if day >= WEEKDAYS || period < 1 || period > PERIODS_PER_DAY {
            return false;
        }
        self.0[day][period - 1] != 0
    }
}

/// One scheduled class session. `start`/`end` are minutes since midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    pub start: u16,
    pub end: u16,
    pub subject: String,
}

/// Ordered session lists keyed by weekday index 0-4.
///
/// Immutable once saved; a settings re-submission replaces the whole week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub days: [Vec<ClassSession>; WEEKDAYS],
}

impl WeekSchedule {
    /// Session on `day` starting exactly at `start_minutes`, if any.
    pub fn session_at(&self, day: usize, start_minutes: u16) -> Option<&ClassSession> {
        self.days
            .get(day)?
            .iter()
            .find(|s| s.start == start_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_class_reads_grid_and_is_total() {
        let mut grid = Timetable::default();
        grid.0[0][0] = 1;
        grid.0[4][5] = 1;

        assert!(grid.has_class(0, 1));
        assert!(grid.has_class(4, 6));
        assert!(!grid.has_class(0, 2));

        // Out-of-range indexes never panic, they read as "no class".
        assert!(!grid.has_class(5, 1));
        assert!(!grid.has_class(0, 0));
        assert!(!grid.has_class(0, 7));
        assert!(!grid.has_class(usize::MAX, usize::MAX));
    }

    #[test]
    fn test_session_at_matches_exact_start() {
        let mut schedule = WeekSchedule::default();
        schedule.days[2].push(ClassSession {
            start: 540,
            end: 615,
            subject: "Algorithms".to_string(),
        });

        assert_eq!(schedule.session_at(2, 540).unwrap().subject, "Algorithms");
        assert!(schedule.session_at(2, 541).is_none());
        assert!(schedule.session_at(9, 540).is_none());
    }
}
