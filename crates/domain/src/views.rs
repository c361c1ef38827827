// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time-windowed views over one student's schedule.
//!
//! Every view is a pure function of the sorted, free-hour-augmented lesson
//! list and the school-local `now`. Free hours stay in the day and week
//! lists so calendar grids render gaps, but never count as a current,
//! next or changed lesson.

use crate::lesson::NormalizedLesson;
use crate::types::{DateRange, LessonKind, is_school_day};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How many days ahead the next school day is searched for.
const NEXT_SCHOOL_DAY_LOOKAHEAD: u64 = 7;

/// A calendar window relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    Today,
    /// The next calendar day, even when it falls on a weekend.
    Tomorrow,
    /// Monday to Friday of the current week.
    ThisWeek,
    /// Monday to Friday of the following week.
    NextWeek,
}

impl Window {
    /// Every window, in display order.
    pub const ALL: [Self; 4] = [Self::Today, Self::Tomorrow, Self::ThisWeek, Self::NextWeek];

    /// The days covered when today is `today`.
    #[must_use]
    pub fn range(&self, today: NaiveDate) -> DateRange {
        match self {
            Self::Today => DateRange::single(today),
            Self::Tomorrow => DateRange::single(add_days(today, 1)),
            Self::ThisWeek => DateRange::school_week_of(today),
            Self::NextWeek => DateRange::school_week_of(add_days(today, 7)),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::ThisWeek => "this_week",
            Self::NextWeek => "next_week",
        }
    }
}

fn add_days(day: NaiveDate, days: u64) -> NaiveDate {
    day.checked_add_days(Days::new(days)).unwrap_or(day)
}

/// Entries whose date falls in `window`, free hours included.
#[must_use]
pub fn lessons_in_window(
    lessons: &[NormalizedLesson],
    window: Window,
    today: NaiveDate,
) -> Vec<&NormalizedLesson> {
    let range: DateRange = window.range(today);
    lessons
        .iter()
        .filter(|lesson: &&NormalizedLesson| range.contains(lesson.date))
        .collect()
}

/// The lesson running at `now`.
///
/// When a cancellation and its replacement overlap, the replacement wins.
#[must_use]
pub fn current_lesson(lessons: &[NormalizedLesson], now: NaiveDateTime) -> Option<&NormalizedLesson> {
    let mut running = lessons.iter().filter(|lesson: &&NormalizedLesson| {
        !lesson.is_free_hour && lesson.starts_at() <= now && now < lesson.ends_at()
    });
    let first: &NormalizedLesson = running.next()?;
    if first.kind != LessonKind::Cancelled {
        return Some(first);
    }
    running
        .find(|lesson: &&NormalizedLesson| lesson.kind != LessonKind::Cancelled)
        .or(Some(first))
}

/// The earliest lesson starting after `now`.
#[must_use]
pub fn next_lesson(lessons: &[NormalizedLesson], now: NaiveDateTime) -> Option<&NormalizedLesson> {
    lessons
        .iter()
        .filter(|lesson: &&NormalizedLesson| !lesson.is_free_hour && lesson.starts_at() > now)
        .min_by_key(|lesson: &&NormalizedLesson| {
            (
                lesson.starts_at(),
                lesson.kind == LessonKind::Cancelled,
                lesson.kind.slot_rank(),
            )
        })
}

/// The first weekday after `today` holding at least one real lesson.
///
/// Looks at most a week ahead. Returns that day and all its entries.
#[must_use]
pub fn next_school_day(
    lessons: &[NormalizedLesson],
    today: NaiveDate,
) -> Option<(NaiveDate, Vec<&NormalizedLesson>)> {
    (1..=NEXT_SCHOOL_DAY_LOOKAHEAD)
        .map(|offset: u64| add_days(today, offset))
        .filter(|day: &NaiveDate| is_school_day(*day))
        .find(|day: &NaiveDate| {
            lessons
                .iter()
                .any(|lesson: &NormalizedLesson| lesson.date == *day && !lesson.is_free_hour)
        })
        .map(|day: NaiveDate| {
            let entries: Vec<&NormalizedLesson> = lessons
                .iter()
                .filter(|lesson: &&NormalizedLesson| lesson.date == day)
                .collect();
            (day, entries)
        })
}

/// Today's substitutions, changed and cancelled lessons.
#[must_use]
pub fn today_changes(lessons: &[NormalizedLesson], today: NaiveDate) -> Vec<&NormalizedLesson> {
    lessons
        .iter()
        .filter(|lesson: &&NormalizedLesson| lesson.date == today && lesson.is_change())
        .collect()
}

/// The standard views of one student's schedule at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleView {
    pub current_lesson: Option<NormalizedLesson>,
    pub next_lesson: Option<NormalizedLesson>,
    pub today: Vec<NormalizedLesson>,
    pub tomorrow: Vec<NormalizedLesson>,
    pub next_school_day: Vec<NormalizedLesson>,
    pub next_school_day_date: Option<NaiveDate>,
    pub this_week: Vec<NormalizedLesson>,
    pub next_week: Vec<NormalizedLesson>,
    pub today_changes: Vec<NormalizedLesson>,
}

impl ScheduleView {
    /// Derives every view from a sorted lesson list.
    ///
    /// # Arguments
    ///
    /// * `lessons` - The student's lessons, free hours included
    /// * `now` - The school-local wall clock
    #[must_use]
    pub fn derive(lessons: &[NormalizedLesson], now: NaiveDateTime) -> Self {
        let today: NaiveDate = now.date();
        let owned = |window: Window| -> Vec<NormalizedLesson> {
            lessons_in_window(lessons, window, today)
                .into_iter()
                .cloned()
                .collect()
        };
        let (next_school_day_date, next_school_day): (Option<NaiveDate>, Vec<NormalizedLesson>) =
            next_school_day(lessons, today).map_or((None, Vec::new()), |(day, entries)| {
                (Some(day), entries.into_iter().cloned().collect())
            });

        Self {
            current_lesson: current_lesson(lessons, now).cloned(),
            next_lesson: next_lesson(lessons, now).cloned(),
            today: owned(Window::Today),
            tomorrow: owned(Window::Tomorrow),
            next_school_day,
            next_school_day_date,
            this_week: owned(Window::ThisWeek),
            next_week: owned(Window::NextWeek),
            today_changes: today_changes(lessons, today).into_iter().cloned().collect(),
        }
    }

    /// The entries of a calendar window.
    #[must_use]
    pub fn window(&self, window: Window) -> &[NormalizedLesson] {
        match window {
            Window::Today => &self.today,
            Window::Tomorrow => &self.tomorrow,
            Window::ThisWeek => &self.this_week,
            Window::NextWeek => &self.next_week,
        }
    }
}

/// Aggregate figures over a set of entries.
///
/// Free hours are counted but never contribute subjects, teachers or changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LessonSummary {
    pub total_lessons: usize,
    pub free_hours: usize,
    pub lessons_per_day: BTreeMap<NaiveDate, usize>,
    pub subjects: Vec<String>,
    pub teachers: Vec<String>,
    pub changes: usize,
}

impl LessonSummary {
    #[must_use]
    pub fn from_lessons<'a>(lessons: impl IntoIterator<Item = &'a NormalizedLesson>) -> Self {
        let mut summary: Self = Self::default();
        let mut subjects: BTreeSet<String> = BTreeSet::new();
        let mut teachers: BTreeSet<String> = BTreeSet::new();

        for lesson in lessons {
            if lesson.is_free_hour {
                summary.free_hours += 1;
                continue;
            }
            summary.total_lessons += 1;
            *summary.lessons_per_day.entry(lesson.date).or_insert(0) += 1;
            if !lesson.subject.label().is_empty() {
                subjects.insert(lesson.subject.label().to_string());
            }
            teachers.extend(
                lesson
                    .teachers
                    .iter()
                    .map(|t| t.abbreviation.clone())
                    .filter(|abbreviation: &String| !abbreviation.is_empty()),
            );
            if lesson.is_change() {
                summary.changes += 1;
            }
        }

        summary.subjects = subjects.into_iter().collect();
        summary.teachers = teachers.into_iter().collect();
        summary
    }

    /// Short human-readable text, e.g. `"6 lessons, 5 subjects"`.
    #[must_use]
    pub fn text(&self, include_free_hours: bool) -> String {
        let mut text: String = format!(
            "{} lessons, {} subjects",
            self.total_lessons,
            self.subjects.len()
        );
        if include_free_hours && self.free_hours > 0 {
            text.push_str(&format!(", {} free hours", self.free_hours));
        }
        text
    }
}
