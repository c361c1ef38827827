// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Class-period timing.
//!
//! A period's wall-clock times come from the institution's class-hour table
//! when one was delivered, and from a fixed lesson/break model otherwise.

use crate::error::DomainError;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Highest period number a school day can hold.
pub const MAX_PERIOD: u8 = 12;

const LAST_MINUTE_OF_DAY: u32 = 23 * 60 + 59;

/// One numbered class period with its wall-clock bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// The period number, starting at 1.
    pub number: u8,
    /// Start of the period.
    pub start: NaiveTime,
    /// End of the period.
    pub end: NaiveTime,
}

impl Period {
    /// Creates a period.
    #[must_use]
    pub const fn new(number: u8, start: NaiveTime, end: NaiveTime) -> Self {
        Self { number, start, end }
    }

    /// Returns whether `time` lies in `[start, end)`.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Lesson-duration and break model used when no class-hour table exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTiming {
    /// Start of period 1.
    pub school_start: NaiveTime,
    /// Length of every lesson.
    pub lesson_duration_minutes: u32,
    /// Break between periods without a longer break.
    pub short_break_minutes: u32,
    /// Break after period 2.
    pub long_break_1_minutes: u32,
    /// Break after period 4.
    pub long_break_2_minutes: u32,
    /// Break after period 6.
    pub lunch_break_minutes: u32,
}

impl Default for ScheduleTiming {
    fn default() -> Self {
        Self {
            school_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            lesson_duration_minutes: 45,
            short_break_minutes: 5,
            long_break_1_minutes: 20,
            long_break_2_minutes: 10,
            lunch_break_minutes: 45,
        }
    }
}

impl ScheduleTiming {
    /// Length of the break that follows `period`.
    #[must_use]
    pub const fn break_after(&self, period: u8) -> u32 {
        match period {
            2 => self.long_break_1_minutes,
            4 => self.long_break_2_minutes,
            6 => self.lunch_break_minutes,
            _ => self.short_break_minutes,
        }
    }

    /// Computes the bounds of `period` from the model.
    ///
    /// Times saturate at 23:59 rather than wrapping past midnight.
    #[must_use]
    pub fn compute(&self, period: u8) -> Period {
        let mut start_minutes: u32 = minutes_of(self.school_start);
        for earlier in 1..period {
            start_minutes += self.lesson_duration_minutes + self.break_after(earlier);
        }
        let end_minutes: u32 = start_minutes + self.lesson_duration_minutes;
        Period::new(period, time_from_minutes(start_minutes), time_from_minutes(end_minutes))
    }

    /// The end of a lesson that starts at `start`.
    #[must_use]
    pub fn lesson_end(&self, start: NaiveTime) -> NaiveTime {
        time_from_minutes(minutes_of(start) + self.lesson_duration_minutes)
    }
}

/// The set of periods known for a school, keyed by number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodTable {
    periods: BTreeMap<u8, Period>,
}

impl PeriodTable {
    /// Builds a table from institution class-hour entries.
    ///
    /// Entries outside `1..=MAX_PERIOD` or ending before they start are skipped.
    /// A later duplicate of a number replaces the earlier one.
    #[must_use]
    pub fn from_class_hours(entries: impl IntoIterator<Item = Period>) -> Self {
        let mut periods: BTreeMap<u8, Period> = BTreeMap::new();
        for entry in entries {
            if entry.number == 0 || entry.number > MAX_PERIOD {
                debug!(period = entry.number, "Skipping class hour outside period range");
                continue;
            }
            if entry.end <= entry.start {
                debug!(period = entry.number, "Skipping class hour with empty time span");
                continue;
            }
            periods.insert(entry.number, entry);
        }
        Self { periods }
    }

    /// Builds a table of `count` periods from the lesson/break model.
    #[must_use]
    pub fn computed(timing: &ScheduleTiming, count: u8) -> Self {
        let periods: BTreeMap<u8, Period> = (1..=count.min(MAX_PERIOD))
            .map(|number: u8| (number, timing.compute(number)))
            .collect();
        Self { periods }
    }

    /// Looks up a period by number.
    #[must_use]
    pub fn get(&self, number: u8) -> Option<&Period> {
        self.periods.get(&number)
    }

    /// Period numbers with a defined time, ascending.
    #[must_use]
    pub fn available_periods(&self) -> Vec<u8> {
        self.periods.keys().copied().collect()
    }

    /// Iterates periods in ascending order.
    pub fn periods(&self) -> impl Iterator<Item = &Period> {
        self.periods.values()
    }

    /// Returns the number of the period whose span contains `time`.
    #[must_use]
    pub fn period_at(&self, time: NaiveTime) -> Option<u8> {
        self.periods
            .values()
            .find(|period: &&Period| period.contains(time))
            .map(|period: &Period| period.number)
    }

    /// Returns whether the table has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Returns whether start times increase with period number and no
    /// period starts before its predecessor ends.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.periods
            .values()
            .zip(self.periods.values().skip(1))
            .all(|(earlier, later): (&Period, &Period)| earlier.end <= later.start)
    }
}

/// Resolves the wall-clock bounds of `period`.
///
/// The class-hour table wins when it knows the period. Otherwise the
/// lesson/break model computes the times. Numbers outside
/// `1..=MAX_PERIOD` resolve as period 1. Never fails.
#[must_use]
pub fn resolve_period_times(
    period: u8,
    table: Option<&PeriodTable>,
    timing: &ScheduleTiming,
) -> (NaiveTime, NaiveTime) {
    let number: u8 = if (1..=MAX_PERIOD).contains(&period) {
        period
    } else {
        warn!(period, "Invalid period number, using period 1 times");
        1
    };

    if let Some(known) = table.and_then(|t: &PeriodTable| t.get(number)) {
        return (known.start, known.end);
    }

    let computed: Period = timing.compute(number);
    (computed.start, computed.end)
}

/// Parses a wall-clock time in `HH:MM:SS` or `HH:MM` form.
///
/// # Errors
///
/// Returns `DomainError::TimeParseError` if neither form matches.
pub fn parse_wall_time(value: &str) -> Result<NaiveTime, DomainError> {
    let trimmed: &str = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|e| DomainError::TimeParseError {
            time_string: value.to_string(),
            error: e.to_string(),
        })
}

fn minutes_of(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn time_from_minutes(minutes: u32) -> NaiveTime {
    let clamped: u32 = minutes.min(LAST_MINUTE_OF_DAY);
    NaiveTime::from_hms_opt(clamped / 60, clamped % 60, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_default_model_counts_every_break_before_period() {
        let (start, end) = resolve_period_times(3, None, &ScheduleTiming::default());
        assert_eq!(start, hm(9, 55));
        assert_eq!(end, hm(10, 40));
    }

    #[test]
    fn test_long_break_after_second_period_is_applied() {
        let timing: ScheduleTiming = ScheduleTiming {
            short_break_minutes: 0,
            ..ScheduleTiming::default()
        };
        let (start, _) = resolve_period_times(3, None, &timing);
        assert_eq!(start, hm(9, 50));
    }

    #[test]
    fn test_table_times_are_returned_verbatim() {
        let table: PeriodTable =
            PeriodTable::from_class_hours([Period::new(3, hm(9, 40), hm(10, 25))]);
        let (start, end) = resolve_period_times(3, Some(&table), &ScheduleTiming::default());
        assert_eq!((start, end), (hm(9, 40), hm(10, 25)));
    }

    #[test]
    fn test_invalid_period_falls_back_to_first() {
        let timing: ScheduleTiming = ScheduleTiming::default();
        assert_eq!(resolve_period_times(0, None, &timing), (hm(8, 0), hm(8, 45)));
        assert_eq!(resolve_period_times(40, None, &timing), (hm(8, 0), hm(8, 45)));
    }

    #[test]
    fn test_computed_table_is_ordered() {
        let table: PeriodTable = PeriodTable::computed(&ScheduleTiming::default(), MAX_PERIOD);
        assert_eq!(table.available_periods().len(), usize::from(MAX_PERIOD));
        assert!(table.is_ordered());
    }

    #[test]
    fn test_late_periods_saturate_instead_of_wrapping() {
        let timing: ScheduleTiming = ScheduleTiming {
            school_start: hm(22, 0),
            ..ScheduleTiming::default()
        };
        let period: Period = timing.compute(MAX_PERIOD);
        assert_eq!(period.end, hm(23, 59));
    }

    #[test]
    fn test_class_hours_outside_range_are_skipped() {
        let table: PeriodTable = PeriodTable::from_class_hours([
            Period::new(0, hm(7, 0), hm(7, 45)),
            Period::new(1, hm(8, 0), hm(8, 45)),
            Period::new(2, hm(9, 0), hm(8, 50)),
            Period::new(13, hm(20, 0), hm(20, 45)),
        ]);
        assert_eq!(table.available_periods(), vec![1]);
    }

    #[test]
    fn test_period_at_uses_half_open_span() {
        let table: PeriodTable = PeriodTable::computed(&ScheduleTiming::default(), 2);
        assert_eq!(table.period_at(hm(8, 0)), Some(1));
        assert_eq!(table.period_at(hm(8, 45)), None);
        assert_eq!(table.period_at(hm(8, 50)), Some(2));
    }

    #[test]
    fn test_parse_wall_time_accepts_both_forms() {
        assert_eq!(parse_wall_time("07:55:00").unwrap(), hm(7, 55));
        assert_eq!(parse_wall_time(" 07:55 ").unwrap(), hm(7, 55));
        assert!(matches!(
            parse_wall_time("7h55"),
            Err(DomainError::TimeParseError { .. })
        ));
    }
}
