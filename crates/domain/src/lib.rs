// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod coursework;
mod error;
mod free_hours;
mod lesson;
mod normalize;
mod raw;
mod snapshot;
mod time_slot;
mod types;
mod views;

#[cfg(test)]
mod tests;

pub use coursework::{
    ExamEntry, ExamItem, ExamView, GradeItem, HomeworkEntry, HomeworkItem, HomeworkView, Letter,
};
pub use error::DomainError;
pub use free_hours::{augment_with_free_hours, occupied_periods};
pub use lesson::{NormalizedLesson, Subject, Teacher};
pub use normalize::{normalize_lesson, normalize_lessons, sanitize_subject};
pub use raw::{RawEvent, RawLesson, RawLessonBatch, RawLessonDetails, RawLessonKind, RawTeacher};
pub use snapshot::ScheduleSnapshot;
pub use time_slot::{
    MAX_PERIOD, Period, PeriodTable, ScheduleTiming, parse_wall_time, resolve_period_times,
};
pub use types::{DateRange, LessonKind, StudentId, is_school_day};
pub use views::{
    LessonSummary, ScheduleView, Window, current_lesson, lessons_in_window, next_lesson,
    next_school_day, today_changes,
};
