// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    NormalizedLesson, Period, PeriodTable, RawLesson, RawLessonDetails, RawLessonKind, RawTeacher,
    ScheduleTiming, normalize_lesson,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDateTime::new(day, hm(hour, minute))
}

pub fn create_test_teacher(abbreviation: &str) -> RawTeacher {
    RawTeacher {
        first_name: String::from("Anna"),
        last_name: format!("Teacher{abbreviation}"),
        abbreviation: abbreviation.to_string(),
    }
}

pub fn create_test_details(subject: &str, room: &str, teacher: &str) -> RawLessonDetails {
    RawLessonDetails {
        lesson_id: None,
        subject_name: subject.to_string(),
        subject_abbreviation: subject.chars().take(2).collect(),
        room: room.to_string(),
        teachers: vec![create_test_teacher(teacher)],
    }
}

pub fn create_raw_lesson(day: NaiveDate, period: Option<u8>, kind: RawLessonKind) -> RawLesson {
    RawLesson {
        id: None,
        date: Some(day.to_string()),
        period,
        start: None,
        end: None,
        kind,
        comment: String::new(),
    }
}

pub fn create_regular(day: NaiveDate, period: u8, subject: &str, room: &str) -> RawLesson {
    create_raw_lesson(
        day,
        Some(period),
        RawLessonKind::Regular(create_test_details(subject, room, "MUE")),
    )
}

/// Class-hour table following the default lesson/break model.
pub fn create_test_table(count: u8) -> PeriodTable {
    PeriodTable::computed(&ScheduleTiming::default(), count)
}

pub fn create_table_from(periods: &[(u8, NaiveTime, NaiveTime)]) -> PeriodTable {
    PeriodTable::from_class_hours(
        periods
            .iter()
            .map(|(number, start, end)| Period::new(*number, *start, *end)),
    )
}

pub fn lesson(day: NaiveDate, period: u8, subject: &str, room: &str) -> NormalizedLesson {
    normalize_lesson(
        &create_regular(day, period, subject, room),
        None,
        &ScheduleTiming::default(),
    )
    .unwrap()
}
