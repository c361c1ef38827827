// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use schulplan_domain::{
    GradeItem, HomeworkItem, PeriodTable, RawLesson, RawLessonBatch, RawLessonDetails,
    RawLessonKind, RawTeacher, ScheduleTiming, StudentId,
};

use crate::{ApiError, CycleInput, StudentInfo, StudentPayload};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// 2025-09-11 is a Thursday.
pub fn thursday_at(hour: u32, minute: u32) -> NaiveDateTime {
    date(2025, 9, 11).and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
}

pub fn create_test_student(id: i64, name: &str) -> StudentInfo {
    StudentInfo {
        id: StudentId::new(id),
        name: name.to_string(),
        class_id: Some(7),
    }
}

pub fn create_raw_lesson(day: NaiveDate, period: u8, subject: &str, room: &str) -> RawLesson {
    RawLesson {
        id: None,
        date: Some(day.to_string()),
        period: Some(period),
        start: None,
        end: None,
        kind: RawLessonKind::Regular(RawLessonDetails {
            lesson_id: None,
            subject_name: subject.to_string(),
            subject_abbreviation: subject.chars().take(1).collect(),
            room: room.to_string(),
            teachers: vec![RawTeacher {
                first_name: String::from("Jonas"),
                last_name: String::from("Berger"),
                abbreviation: String::from("BER"),
            }],
        }),
        comment: String::new(),
    }
}

/// A four-period table computed from the default timing.
pub fn create_batch(lessons: Vec<RawLesson>) -> RawLessonBatch {
    RawLessonBatch {
        lessons,
        periods: Some(PeriodTable::computed(&ScheduleTiming::default(), 4)),
    }
}

/// Math in period 1 and German in period 2 on Thursday.
pub fn create_thursday_batch(math_room: &str) -> RawLessonBatch {
    create_batch(vec![
        create_raw_lesson(date(2025, 9, 11), 1, "Mathematik", math_room),
        create_raw_lesson(date(2025, 9, 11), 2, "Deutsch", "B204"),
    ])
}

pub fn create_payload(student: StudentInfo, batch: RawLessonBatch) -> StudentPayload {
    StudentPayload {
        student,
        lessons: Ok(batch),
        homework: None,
        grades: None,
        exams: None,
    }
}

pub fn create_failed_payload(student: StudentInfo) -> StudentPayload {
    StudentPayload {
        student,
        lessons: Err(upstream("timetable request timed out")),
        homework: None,
        grades: None,
        exams: None,
    }
}

pub fn create_homework(day: NaiveDate, subject: &str, content: &str) -> HomeworkItem {
    HomeworkItem {
        subject: subject.to_string(),
        content: content.to_string(),
        date: day,
    }
}

pub fn create_grade(subject_id: &str, value: &str) -> GradeItem {
    GradeItem {
        subject_id: subject_id.to_string(),
        subject: format!("Subject {subject_id}"),
        value: value.to_string(),
        date: Some(date(2025, 9, 10)),
    }
}

pub fn upstream(message: &str) -> ApiError {
    ApiError::Upstream {
        message: message.to_string(),
    }
}

pub fn create_cycle_input(students: Vec<StudentPayload>) -> CycleInput {
    CycleInput {
        students: Ok(students),
        letters: None,
    }
}
