// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveDate;

/// Errors that can occur while shaping raw schedule data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A lesson record carried no date and cannot be placed on a calendar.
    MissingDate {
        /// The upstream lesson identifier, if any.
        lesson_id: Option<String>,
    },
    /// Failed to parse a date string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a wall-clock time string.
    TimeParseError {
        /// The invalid time string.
        time_string: String,
        /// The parsing error message.
        error: String,
    },
    /// A date range whose end lies before its start.
    InvalidDateRange {
        /// The first day of the range.
        start: NaiveDate,
        /// The last day of the range.
        end: NaiveDate,
    },
    /// A lesson kind string that is not part of the vendor vocabulary.
    UnknownLessonKind(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDate { lesson_id } => match lesson_id {
                Some(id) => write!(f, "Lesson '{id}' has no date"),
                None => write!(f, "Lesson has no date"),
            },
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimeParseError { time_string, error } => {
                write!(f, "Failed to parse time '{time_string}': {error}")
            }
            Self::InvalidDateRange { start, end } => {
                write!(f, "Invalid date range: {end} is before {start}")
            }
            Self::UnknownLessonKind(kind) => write!(f, "Unknown lesson kind: {kind}"),
        }
    }
}

impl std::error::Error for DomainError {}
