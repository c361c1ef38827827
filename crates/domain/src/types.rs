// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifies one student on the portal account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(i64);

impl StudentId {
    /// Wraps a raw portal student identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a timetable entry after normalization.
///
/// Wire names follow the portal vocabulary (`regularLesson`, `changedLesson`,
/// `substitution`, `cancelledLesson`, `event`, `freeHour`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    /// A lesson taking place as planned.
    #[default]
    Regular,
    /// A lesson whose room, time or subject was changed.
    Changed,
    /// A lesson taught by a different teacher.
    Substitution,
    /// A lesson that does not take place.
    Cancelled,
    /// A non-lesson event such as an excursion.
    Event,
    /// A period with nothing scheduled.
    Free,
}

impl LessonKind {
    /// Returns the portal wire name for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regularLesson",
            Self::Changed => "changedLesson",
            Self::Substitution => "substitution",
            Self::Cancelled => "cancelledLesson",
            Self::Event => "event",
            Self::Free => "freeHour",
        }
    }

    /// Ordering of entries sharing one slot.
    ///
    /// Cancellations sort first so a replacement lesson follows the lesson it replaces.
    #[must_use]
    pub const fn slot_rank(&self) -> u8 {
        match self {
            Self::Cancelled => 0,
            Self::Event => 1,
            Self::Changed => 2,
            Self::Substitution => 3,
            Self::Regular => 4,
            Self::Free => 5,
        }
    }

    /// Returns whether this kind deviates from the regular plan.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        matches!(self, Self::Changed | Self::Cancelled | Self::Substitution)
    }
}

impl FromStr for LessonKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regularLesson" => Ok(Self::Regular),
            "changedLesson" => Ok(Self::Changed),
            "substitution" => Ok(Self::Substitution),
            "cancelledLesson" => Ok(Self::Cancelled),
            "event" => Ok(Self::Event),
            "freeHour" => Ok(Self::Free),
            _ => Err(DomainError::UnknownLessonKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for LessonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateRange` if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering a single day.
    #[must_use]
    pub const fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// The first day of the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// The last day of the range.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns whether `day` lies inside the range.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// The days covered by both ranges, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start: NaiveDate = self.start.max(other.start);
        let end: NaiveDate = self.end.min(other.end);
        (start <= end).then_some(Self { start, end })
    }

    /// Iterates every calendar day in the range.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start
            .iter_days()
            .take_while(move |day: &NaiveDate| *day <= self.end)
    }

    /// Iterates the Monday to Friday days in the range.
    pub fn school_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days().filter(|day: &NaiveDate| is_school_day(*day))
    }

    /// The Monday to Friday window of the week containing `day`.
    #[must_use]
    pub fn school_week_of(day: NaiveDate) -> Self {
        let monday: NaiveDate = day.week(Weekday::Mon).first_day();
        let friday: NaiveDate = monday.checked_add_days(Days::new(4)).unwrap_or(monday);
        Self {
            start: monday,
            end: friday,
        }
    }
}

/// Returns whether `day` is a weekday.
#[must_use]
pub fn is_school_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}
