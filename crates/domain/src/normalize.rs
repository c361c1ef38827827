// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lesson normalization.
//!
//! Turns typed portal records into [`NormalizedLesson`] entries with
//! resolved subject, room, teachers and times.

use crate::error::DomainError;
use crate::lesson::{NormalizedLesson, Subject, Teacher};
use crate::raw::{RawLesson, RawLessonDetails, RawLessonKind, RawTeacher};
use crate::time_slot::{MAX_PERIOD, PeriodTable, ScheduleTiming, resolve_period_times};
use crate::types::LessonKind;
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

/// Strips parenthetical qualifiers and trailing comma clauses from a subject name.
///
/// `"Religion (konfessionell kooperativ)"` becomes `"Religion"` and
/// `"Math, Grundkurs"` becomes `"Math"`. A name that would sanitize to
/// nothing is returned trimmed instead.
#[must_use]
pub fn sanitize_subject(name: &str) -> String {
    let mut stripped: String = String::with_capacity(name.len());
    let mut rest: &str = name;
    while let Some(open) = rest.find('(') {
        let Some(close_offset) = rest[open..].find(')') else {
            break;
        };
        stripped.push_str(rest[..open].trim_end());
        rest = &rest[open + close_offset + 1..];
    }
    stripped.push_str(rest);

    let head: &str = stripped.split(',').next().unwrap_or_default().trim();
    if head.is_empty() {
        name.trim().to_string()
    } else {
        head.to_string()
    }
}

/// Subject, room and teacher data taken from the kind-specific payload.
struct Effective {
    subject: Subject,
    room: String,
    teachers: Vec<Teacher>,
    lesson_id: Option<String>,
    kind: LessonKind,
    is_substitution: bool,
    original_teacher: Option<Teacher>,
}

impl Effective {
    fn from_details(details: Option<&RawLessonDetails>, kind: LessonKind) -> Self {
        let Some(details) = details else {
            return Self {
                subject: Subject::default(),
                room: String::new(),
                teachers: Vec::new(),
                lesson_id: None,
                kind,
                is_substitution: false,
                original_teacher: None,
            };
        };
        Self {
            subject: Subject::new(&details.subject_name, &details.subject_abbreviation),
            room: details.room.trim().to_string(),
            teachers: details.teachers.iter().map(Teacher::from).collect(),
            lesson_id: details.lesson_id.clone(),
            kind,
            is_substitution: false,
            original_teacher: None,
        }
    }

    fn extract(kind: &RawLessonKind) -> Self {
        match kind {
            RawLessonKind::Regular(details) => Self::from_details(Some(details), LessonKind::Regular),
            RawLessonKind::Changed(details) => Self::from_details(Some(details), LessonKind::Changed),
            RawLessonKind::Substitution {
                actual,
                original_teacher,
            } => Self {
                is_substitution: true,
                original_teacher: original_teacher.as_ref().map(Teacher::from),
                ..Self::from_details(Some(actual), LessonKind::Substitution)
            },
            RawLessonKind::Cancelled { original } => {
                Self::from_details(original.first(), LessonKind::Cancelled)
            }
            RawLessonKind::Event(event) => Self {
                subject: Subject::new(&event.text, ""),
                room: String::new(),
                teachers: event.teachers.iter().map(Teacher::from).collect(),
                lesson_id: None,
                kind: LessonKind::Event,
                is_substitution: false,
                original_teacher: None,
            },
            RawLessonKind::Free => Self::from_details(None, LessonKind::Free),
        }
    }
}

fn parse_lesson_date(raw: &RawLesson) -> Result<NaiveDate, DomainError> {
    let value: &str = raw.date.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(DomainError::MissingDate {
            lesson_id: raw.id.clone(),
        });
    }
    // Some payloads carry a full timestamp; only the day matters.
    let day: &str = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}

fn resolve_times(
    raw: &RawLesson,
    table: Option<&PeriodTable>,
    timing: &ScheduleTiming,
) -> (NaiveTime, NaiveTime) {
    match (raw.start, raw.end, raw.period) {
        (Some(start), Some(end), _) => (start, end),
        (_, _, Some(period)) => resolve_period_times(period, table, timing),
        (Some(start), None, None) => (start, timing.lesson_end(start)),
        (None, _, None) => {
            warn!(
                lesson_id = raw.id.as_deref().unwrap_or_default(),
                "Lesson has neither period nor start time, using period 1 times"
            );
            resolve_period_times(1, table, timing)
        }
    }
}

fn derive_id(date: NaiveDate, period: Option<u8>, start: NaiveTime, subject: &Subject) -> String {
    let slot: String = period.map_or_else(|| start.format("%H%M").to_string(), |p: u8| p.to_string());
    format!("{date}_{slot}_{}", subject.label())
}

/// Normalizes one portal record.
///
/// Missing optional fields degrade to empty values. Periods without
/// explicit times are resolved through the class-hour table or the
/// lesson/break model.
///
/// # Errors
///
/// Returns `DomainError::MissingDate` or `DomainError::DateParseError`
/// when the record cannot be placed on a calendar day.
pub fn normalize_lesson(
    raw: &RawLesson,
    table: Option<&PeriodTable>,
    timing: &ScheduleTiming,
) -> Result<NormalizedLesson, DomainError> {
    let date: NaiveDate = parse_lesson_date(raw)?;
    let (start, end): (NaiveTime, NaiveTime) = resolve_times(raw, table, timing);
    let effective: Effective = Effective::extract(&raw.kind);

    let id: String = raw
        .id
        .clone()
        .filter(|id: &String| !id.is_empty())
        .or_else(|| effective.lesson_id.clone().filter(|id: &String| !id.is_empty()))
        .unwrap_or_else(|| derive_id(date, raw.period, start, &effective.subject));

    let (teacher_name, teacher_abbreviation): (String, String) = effective
        .teachers
        .first()
        .map(|t: &Teacher| (t.full_name.clone(), t.abbreviation.clone()))
        .unwrap_or_default();

    Ok(NormalizedLesson {
        id,
        date,
        period: raw.period,
        start,
        end,
        subject: effective.subject,
        room: effective.room,
        teachers: effective.teachers,
        teacher_name,
        teacher_abbreviation,
        is_free_hour: effective.kind == LessonKind::Free,
        kind: effective.kind,
        is_substitution: effective.is_substitution,
        original_teacher: effective.original_teacher,
        comment: raw.comment.trim().to_string(),
    })
}

/// Normalizes a batch of records into a sorted lesson list.
///
/// Records that cannot be normalized are dropped and logged. Lessons that
/// arrived without a period number get one: the class-hour period whose
/// span contains the start time, or otherwise the next number in per-day
/// chronological order. Period numbers delivered by the portal are never
/// changed.
#[must_use]
pub fn normalize_lessons(
    raws: &[RawLesson],
    table: Option<&PeriodTable>,
    timing: &ScheduleTiming,
) -> Vec<NormalizedLesson> {
    let mut lessons: Vec<NormalizedLesson> = raws
        .iter()
        .filter_map(|raw: &RawLesson| match normalize_lesson(raw, table, timing) {
            Ok(lesson) => Some(lesson),
            Err(e) => {
                warn!(error = %e, "Dropping unprocessable lesson");
                None
            }
        })
        .collect();

    lessons.sort_by_key(|l: &NormalizedLesson| (l.date, l.start, l.kind.slot_rank()));
    backfill_periods(&mut lessons, table);
    lessons.sort_by_key(NormalizedLesson::sort_key);

    debug!(
        received = raws.len(),
        normalized = lessons.len(),
        "Normalized lesson batch"
    );
    lessons
}

/// Assigns period numbers to lessons lacking one.
///
/// Expects `lessons` sorted by date then start time.
fn backfill_periods(lessons: &mut [NormalizedLesson], table: Option<&PeriodTable>) {
    let table: Option<&PeriodTable> = table.filter(|t: &&PeriodTable| !t.is_empty());
    let mut current_date: Option<NaiveDate> = None;
    let mut cursor: u8 = 0;
    let mut previous_start: Option<NaiveTime> = None;

    for lesson in lessons.iter_mut() {
        if current_date != Some(lesson.date) {
            current_date = Some(lesson.date);
            cursor = 0;
            previous_start = None;
        }

        if let Some(period) = lesson.period {
            cursor = cursor.max(period);
            previous_start = Some(lesson.start);
            continue;
        }

        let from_table: Option<u8> = table.and_then(|t: &PeriodTable| t.period_at(lesson.start));
        let assigned: u8 = match from_table {
            Some(period) => period,
            // Entries sharing a start time share a slot.
            None if previous_start == Some(lesson.start) && cursor > 0 => cursor,
            None => cursor.saturating_add(1).min(MAX_PERIOD),
        };

        debug!(
            lesson_id = %lesson.id,
            date = %lesson.date,
            period = assigned,
            "Backfilled missing period number"
        );
        lesson.period = Some(assigned);
        cursor = cursor.max(assigned);
        previous_start = Some(lesson.start);
    }
}
