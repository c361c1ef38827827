// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Typed lesson records as decoded from the portal feed.
//!
//! Each lesson kind carries exactly the payload it needs, so the normalizer
//! never probes optional fields to find out what kind of record it holds.

use crate::time_slot::PeriodTable;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A teacher as delivered by the portal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawTeacher {
    pub first_name: String,
    pub last_name: String,
    pub abbreviation: String,
}

/// The subject, room and teachers of one concrete lesson.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawLessonDetails {
    pub lesson_id: Option<String>,
    pub subject_name: String,
    pub subject_abbreviation: String,
    pub room: String,
    pub teachers: Vec<RawTeacher>,
}

/// A non-lesson event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawEvent {
    pub text: String,
    pub teachers: Vec<RawTeacher>,
}

/// The kind-specific part of a lesson record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawLessonKind {
    Regular(RawLessonDetails),
    Changed(RawLessonDetails),
    Substitution {
        actual: RawLessonDetails,
        original_teacher: Option<RawTeacher>,
    },
    /// A cancellation names the lessons that no longer take place.
    Cancelled {
        original: Vec<RawLessonDetails>,
    },
    Event(RawEvent),
    Free,
}

/// One timetable slot as delivered by the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLesson {
    pub id: Option<String>,
    /// ISO date string. Kept raw so a malformed date drops only this record.
    pub date: Option<String>,
    pub period: Option<u8>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub kind: RawLessonKind,
    pub comment: String,
}

/// A student's lessons for a date range plus the school's class-hour table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawLessonBatch {
    pub lessons: Vec<RawLesson>,
    pub periods: Option<PeriodTable>,
}
