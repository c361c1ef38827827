// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::normalize::sanitize_subject;
use crate::raw::RawTeacher;
use crate::time_slot::Period;
use crate::types::LessonKind;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A teacher on a normalized lesson.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Teacher {
    /// First and last name joined by a space.
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub abbreviation: String,
}

impl From<&RawTeacher> for Teacher {
    fn from(raw: &RawTeacher) -> Self {
        let full_name: String = format!("{} {}", raw.first_name.trim(), raw.last_name.trim())
            .trim()
            .to_string();
        Self {
            full_name,
            first_name: raw.first_name.trim().to_string(),
            last_name: raw.last_name.trim().to_string(),
            abbreviation: raw.abbreviation.trim().to_string(),
        }
    }
}

/// A subject in its raw and sanitized forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Subject {
    /// The full name as delivered.
    pub name: String,
    pub abbreviation: String,
    /// The name without parenthetical qualifiers or trailing comma clauses.
    pub display: String,
}

impl Subject {
    /// Creates a subject, deriving the sanitized display form.
    ///
    /// Falls back to the abbreviation when the name is empty.
    #[must_use]
    pub fn new(name: &str, abbreviation: &str) -> Self {
        let name: String = name.trim().to_string();
        let abbreviation: String = abbreviation.trim().to_string();
        let display: String = if name.is_empty() {
            abbreviation.clone()
        } else {
            sanitize_subject(&name)
        };
        Self {
            name,
            abbreviation,
            display,
        }
    }

    /// Short label for aggregation, abbreviation preferred.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.abbreviation.is_empty() {
            &self.display
        } else {
            &self.abbreviation
        }
    }

    /// Returns whether neither name nor abbreviation is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_empty() && self.abbreviation.is_empty()
    }
}

/// One timetable entry after normalization.
///
/// Entries are built fresh on every refresh cycle and never mutated once
/// published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLesson {
    pub id: String,
    pub date: NaiveDate,
    /// `None` only for non-periodic entries that could not be placed.
    pub period: Option<u8>,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub subject: Subject,
    pub room: String,
    pub teachers: Vec<Teacher>,
    /// Full name of the first teacher, empty when there is none.
    pub teacher_name: String,
    /// Abbreviation of the first teacher, empty when there is none.
    pub teacher_abbreviation: String,
    pub kind: LessonKind,
    pub is_substitution: bool,
    pub original_teacher: Option<Teacher>,
    pub comment: String,
    pub is_free_hour: bool,
}

impl NormalizedLesson {
    /// Creates a placeholder entry for a period with nothing scheduled.
    #[must_use]
    pub fn free_hour(date: NaiveDate, period: &Period) -> Self {
        Self {
            id: format!("free_{date}_{}", period.number),
            date,
            period: Some(period.number),
            start: period.start,
            end: period.end,
            subject: Subject::default(),
            room: String::new(),
            teachers: Vec::new(),
            teacher_name: String::new(),
            teacher_abbreviation: String::new(),
            kind: LessonKind::Free,
            is_substitution: false,
            original_teacher: None,
            comment: String::new(),
            is_free_hour: true,
        }
    }

    /// The first listed teacher.
    #[must_use]
    pub fn primary_teacher(&self) -> Option<&Teacher> {
        self.teachers.first()
    }

    /// Start as a local timestamp.
    #[must_use]
    pub const fn starts_at(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date, self.start)
    }

    /// End as a local timestamp.
    #[must_use]
    pub const fn ends_at(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date, self.end)
    }

    /// Returns whether the entry deviates from the regular plan.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !self.is_free_hour && (self.is_substitution || self.kind.is_change())
    }

    /// Sort key placing entries by day, period, start time, then slot rank.
    #[must_use]
    pub fn sort_key(&self) -> (NaiveDate, u8, NaiveTime, u8) {
        (
            self.date,
            self.period.unwrap_or(u8::MAX),
            self.start,
            self.kind.slot_rank(),
        )
    }

    /// Calendar title for this entry.
    #[must_use]
    pub fn display_title(&self) -> String {
        if self.is_free_hour {
            return String::from("Free");
        }

        let subject: &str = if self.subject.display.is_empty() {
            "Lesson"
        } else {
            &self.subject.display
        };

        let mut title: String = match self.kind {
            LessonKind::Cancelled => format!("\u{274c} {subject} (Cancelled)"),
            _ if self.is_substitution || self.kind == LessonKind::Substitution => {
                format!("\u{1f504} {subject}")
            }
            _ => subject.to_string(),
        };

        if !self.room.is_empty() {
            title.push_str(&format!(" ({})", self.room));
        }
        title
    }
}
