// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Command;
use chrono::NaiveDate;
use schulplan_domain::{
    GradeItem, HomeworkItem, PeriodTable, RawLesson, RawLessonBatch, RawLessonDetails,
    RawLessonKind, RawTeacher, ScheduleTiming, StudentId,
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn create_test_student() -> StudentId {
    StudentId::new(4711)
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
                first_name: String::from("Eva"),
                last_name: String::from("Lehmann"),
                abbreviation: String::from("LEH"),
            }],
        }),
        comment: String::new(),
    }
}

/// Schedule command for the week of 2025-09-08 with a four-period day.
pub fn create_schedule_command(student_id: StudentId, lessons: Vec<RawLesson>) -> Command {
    Command::IngestSchedule {
        student_id,
        batch: RawLessonBatch {
            lessons,
            periods: Some(PeriodTable::computed(&ScheduleTiming::default(), 4)),
        },
        range_start: date(2025, 9, 8),
        range_end: date(2025, 9, 12),
        timing: ScheduleTiming::default(),
    }
}

pub fn create_homework(day: NaiveDate, subject: &str, content: &str) -> HomeworkItem {
    HomeworkItem {
        subject: subject.to_string(),
        content: content.to_string(),
        date: day,
    }
}

pub fn create_grade(subject_id: &str, value: &str, day: NaiveDate) -> GradeItem {
    GradeItem {
        subject_id: subject_id.to_string(),
        subject: format!("Subject {subject_id}"),
        value: value.to_string(),
        date: Some(day),
    }
}
