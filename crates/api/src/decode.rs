// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Decoding of portal payloads into typed domain records.
//!
//! Decoding happens once, at the boundary. Malformed records are skipped
//! with a warning; a payload as a whole never fails here.

use crate::error::DecodeError;
use crate::request_response::StudentInfo;
use crate::wire::{
    ClassHourDto, Envelope, ExamDto, GradeDto, HomeworkDto, LessonBatchDto, LessonDetailsDto,
    LessonDto, LetterDto, StudentDto, SubjectDto, TeacherDto, WireId,
};
use chrono::{NaiveDate, NaiveTime};
use schulplan_domain::{
    ExamItem, GradeItem, HomeworkItem, LessonKind, Letter, Period, PeriodTable, RawEvent,
    RawLesson, RawLessonBatch, RawLessonDetails, RawLessonKind, RawTeacher, StudentId, Subject,
    parse_wall_time,
};
use tracing::{debug, warn};

fn parse_portal_date(field: &'static str, value: &str) -> Result<NaiveDate, DecodeError> {
    let trimmed: &str = value.trim();
    let day: &str = trimmed.split('T').next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| DecodeError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn required_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate, DecodeError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => parse_portal_date(field, v),
        _ => Err(DecodeError::MissingField { field }),
    }
}

fn optional_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, DecodeError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => parse_portal_date(field, v).map(Some),
        _ => Ok(None),
    }
}

fn optional_time(value: Option<&String>) -> Option<NaiveTime> {
    let value: &str = value.map(|v: &String| v.trim()).filter(|v: &&str| !v.is_empty())?;
    match parse_wall_time(value) {
        Ok(time) => Some(time),
        Err(e) => {
            debug!(error = %e, "Ignoring unparseable class hour time");
            None
        }
    }
}

fn keep_valid<T>(what: &'static str, results: impl Iterator<Item = Result<T, DecodeError>>) -> Vec<T> {
    results
        .filter_map(|result: Result<T, DecodeError>| match result {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(record = what, error = %e, "Skipping malformed portal record");
                None
            }
        })
        .collect()
}

fn teacher(dto: &TeacherDto) -> RawTeacher {
    RawTeacher {
        first_name: dto.first_name.clone(),
        last_name: dto.last_name.clone(),
        abbreviation: dto.abbreviation.clone(),
    }
}

fn details(dto: &LessonDetailsDto) -> RawLessonDetails {
    let subject: SubjectDto = dto.subject.clone().unwrap_or_default();
    RawLessonDetails {
        lesson_id: dto.lesson_id.as_ref().map(WireId::to_string),
        subject_name: subject.name,
        subject_abbreviation: subject.abbreviation,
        room: dto.room.as_ref().map(|r| r.name.clone()).unwrap_or_default(),
        teachers: dto.teachers.iter().map(teacher).collect(),
    }
}

fn lesson_kind(dto: &LessonDto) -> LessonKind {
    let Some(name) = dto.kind.as_deref() else {
        return LessonKind::Regular;
    };
    name.parse::<LessonKind>().unwrap_or_else(|e| {
        debug!(error = %e, "Treating unknown lesson kind as regular lesson");
        LessonKind::Regular
    })
}

fn raw_lesson(dto: &LessonDto) -> RawLesson {
    let actual: RawLessonDetails = dto.actual_lesson.as_ref().map(details).unwrap_or_default();
    let kind: RawLessonKind = match lesson_kind(dto) {
        LessonKind::Regular => RawLessonKind::Regular(actual),
        LessonKind::Changed => RawLessonKind::Changed(actual),
        LessonKind::Substitution => RawLessonKind::Substitution {
            actual,
            original_teacher: dto.original_teacher.as_ref().map(teacher),
        },
        LessonKind::Cancelled => {
            let mut original: Vec<RawLessonDetails> =
                dto.original_lessons.iter().map(details).collect();
            if original.is_empty() && dto.actual_lesson.is_some() {
                original.push(actual);
            }
            RawLessonKind::Cancelled { original }
        }
        LessonKind::Event => {
            let event = dto.event.clone().unwrap_or_default();
            RawLessonKind::Event(RawEvent {
                text: event.text,
                teachers: event.teachers.iter().map(teacher).collect(),
            })
        }
        LessonKind::Free => RawLessonKind::Free,
    };

    let class_hour: ClassHourDto = dto.class_hour.clone().unwrap_or_default();
    RawLesson {
        id: dto.id.as_ref().map(WireId::to_string),
        date: dto.date.clone(),
        period: class_hour.number.as_ref().and_then(WireId::as_period),
        start: optional_time(class_hour.from.as_ref()),
        end: optional_time(class_hour.until.as_ref()),
        kind,
        comment: dto.comment.clone().unwrap_or_default(),
    }
}

fn class_hour_period(dto: &ClassHourDto) -> Option<Period> {
    let number: u8 = dto.number.as_ref().and_then(WireId::as_period)?;
    let start: NaiveTime = optional_time(dto.from.as_ref())?;
    let end: NaiveTime = optional_time(dto.until.as_ref())?;
    Some(Period::new(number, start, end))
}

/// Decodes a student's timetable payload.
///
/// An absent or empty class-hour table decodes as `None`, leaving period
/// times to the lesson/break model.
#[must_use]
pub fn decode_lesson_batch(dto: LessonBatchDto) -> RawLessonBatch {
    let periods: Option<PeriodTable> = dto
        .class_hours
        .as_deref()
        .map(decode_class_hours)
        .filter(|table: &PeriodTable| !table.is_empty());

    RawLessonBatch {
        lessons: dto.lessons.iter().map(raw_lesson).collect(),
        periods,
    }
}

/// Decodes the institution's class-hour list. Entries without usable
/// times are skipped.
#[must_use]
pub fn decode_class_hours(hours: &[ClassHourDto]) -> PeriodTable {
    PeriodTable::from_class_hours(hours.iter().filter_map(class_hour_period))
}

fn homework_item(dto: HomeworkDto) -> Result<HomeworkItem, DecodeError> {
    Ok(HomeworkItem {
        date: required_date("date", dto.date.as_deref())?,
        subject: dto.subject.unwrap_or_default().trim().to_string(),
        content: dto.homework.unwrap_or_default().trim().to_string(),
    })
}

/// Decodes a homework payload in any of its envelopes.
#[must_use]
pub fn decode_homework(envelope: Envelope<HomeworkDto>) -> Vec<HomeworkItem> {
    keep_valid("homework", envelope.into_items().into_iter().map(homework_item))
}

fn grade_item(dto: GradeDto) -> Result<GradeItem, DecodeError> {
    let subject: SubjectDto = dto.subject.unwrap_or_default();
    let subject_id: String = dto
        .subject_id
        .or(subject.id)
        .map(|id: WireId| id.to_string())
        .filter(|id: &String| !id.is_empty())
        .ok_or(DecodeError::MissingField { field: "subjectId" })?;
    let value: String = dto
        .value
        .map(|v: WireId| v.to_string())
        .filter(|v: &String| !v.is_empty())
        .ok_or(DecodeError::MissingField { field: "value" })?;

    Ok(GradeItem {
        subject_id,
        subject: subject.name,
        value,
        date: optional_date("date", dto.date.as_deref())?,
    })
}

/// Decodes a grade payload.
#[must_use]
pub fn decode_grades(envelope: Envelope<GradeDto>) -> Vec<GradeItem> {
    keep_valid("grade", envelope.into_items().into_iter().map(grade_item))
}

fn exam_item(dto: ExamDto) -> Result<ExamItem, DecodeError> {
    let date: NaiveDate = required_date("date", dto.date.as_deref())?;
    let subject: SubjectDto = dto.subject.unwrap_or_default();
    let exam_type = dto.exam_type.unwrap_or_default();
    let type_name: String = if exam_type.name.trim().is_empty() {
        String::from("Exam")
    } else {
        exam_type.name.trim().to_string()
    };
    let title: String = dto
        .title
        .or(dto.name)
        .map(|t: String| t.trim().to_string())
        .filter(|t: &String| !t.is_empty())
        .unwrap_or_else(|| type_name.clone());
    let class_hour: ClassHourDto = dto.start_class_hour.unwrap_or_default();

    Ok(ExamItem {
        date,
        subject: Subject::new(&subject.name, &subject.abbreviation),
        exam_type: type_name,
        type_color: exam_type.color,
        title,
        period: class_hour.number.as_ref().and_then(WireId::as_period),
        start: optional_time(class_hour.from.as_ref()),
        end: optional_time(class_hour.until.as_ref()),
        room: dto.room.unwrap_or_default(),
        teacher: dto.teacher.unwrap_or_default(),
        comment: dto.comment.unwrap_or_default(),
    })
}

/// Decodes an exam payload in any of its envelopes.
#[must_use]
pub fn decode_exams(envelope: Envelope<ExamDto>) -> Vec<ExamItem> {
    keep_valid("exam", envelope.into_items().into_iter().map(exam_item))
}

fn letter(dto: LetterDto) -> Result<Letter, DecodeError> {
    let id: String = dto
        .id
        .map(|id: WireId| id.to_string())
        .filter(|id: &String| !id.is_empty())
        .ok_or(DecodeError::MissingField { field: "id" })?;
    Ok(Letter {
        id,
        title: dto.title.trim().to_string(),
        date: optional_date("sentDate", dto.sent_date.as_deref())?,
    })
}

/// Decodes the account's letters.
#[must_use]
pub fn decode_letters(envelope: Envelope<LetterDto>) -> Vec<Letter> {
    keep_valid("letter", envelope.into_items().into_iter().map(letter))
}

fn student(dto: StudentDto) -> Result<StudentInfo, DecodeError> {
    let id: i64 = dto.id.ok_or(DecodeError::MissingField { field: "id" })?;
    Ok(StudentInfo {
        id: StudentId::new(id),
        name: format!("{} {}", dto.first_name.trim(), dto.last_name.trim())
            .trim()
            .to_string(),
        class_id: dto.class_id,
    })
}

/// Decodes the students on the account, skipping entries without an id.
#[must_use]
pub fn decode_students(dtos: Vec<StudentDto>) -> Vec<StudentInfo> {
    keep_valid("student", dtos.into_iter().map(student))
}
