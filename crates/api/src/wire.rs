// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Portal wire formats.
//!
//! These mirror the JSON the portal returns. Every field that the portal
//! omits now and then is optional or defaulted here, so a sparse record
//! reaches the decoder instead of failing the whole payload.

use serde::{Deserialize, Serialize};

/// An identifier the portal sends either as a number or as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

impl WireId {
    /// The identifier as a period number, if it is one.
    #[must_use]
    pub fn as_period(&self) -> Option<u8> {
        match self {
            Self::Number(n) => u8::try_from(*n).ok(),
            Self::Text(s) => s.trim().parse::<u8>().ok(),
        }
    }
}

/// A student listed on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    pub id: Option<i64>,
    #[serde(default, rename = "firstname")]
    pub first_name: String,
    #[serde(default, rename = "lastname")]
    pub last_name: String,
    #[serde(default)]
    pub class_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeacherDto {
    #[serde(default, rename = "firstname")]
    pub first_name: String,
    #[serde(default, rename = "lastname")]
    pub last_name: String,
    #[serde(default)]
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubjectDto {
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomDto {
    #[serde(default)]
    pub name: String,
}

/// The concrete lesson inside a timetable slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDetailsDto {
    #[serde(default)]
    pub lesson_id: Option<WireId>,
    #[serde(default)]
    pub subject: Option<SubjectDto>,
    #[serde(default)]
    pub room: Option<RoomDto>,
    #[serde(default)]
    pub teachers: Vec<TeacherDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventDto {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub teachers: Vec<TeacherDto>,
}

/// A class hour, either in the institution table or on a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassHourDto {
    #[serde(default)]
    pub number: Option<WireId>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
}

/// One timetable slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDto {
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub class_hour: Option<ClassHourDto>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub actual_lesson: Option<LessonDetailsDto>,
    #[serde(default)]
    pub original_lessons: Vec<LessonDetailsDto>,
    #[serde(default)]
    pub original_teacher: Option<TeacherDto>,
    #[serde(default)]
    pub event: Option<EventDto>,
}

/// A student's timetable for a date range plus the class-hour table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonBatchDto {
    #[serde(default)]
    pub lessons: Vec<LessonDto>,
    #[serde(default)]
    pub class_hours: Option<Vec<ClassHourDto>>,
}

/// One homework entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HomeworkDto {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub homework: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// One grade entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDto {
    #[serde(default)]
    pub subject_id: Option<WireId>,
    #[serde(default)]
    pub subject: Option<SubjectDto>,
    #[serde(default)]
    pub value: Option<WireId>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExamTypeDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
}

/// One scheduled exam.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDto {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub subject: Option<SubjectDto>,
    #[serde(default, rename = "type")]
    pub exam_type: Option<ExamTypeDto>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_class_hour: Option<ClassHourDto>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// One account-wide letter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterDto {
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sent_date: Option<String>,
}

/// The portal wraps lists under varying keys.
///
/// Homework arrives as `{"homeworks": [...]}`, `{"data": [...]}` or
/// `{"data": {"homeworks": [...]}}`; exams the same with `exams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Homeworks { homeworks: Vec<T> },
    Exams { exams: Vec<T> },
    Grades { grades: Vec<T> },
    Data { data: EnvelopeData<T> },
    Bare(Vec<T>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeData<T> {
    List(Vec<T>),
    Homeworks { homeworks: Vec<T> },
    Exams { exams: Vec<T> },
}

impl<T> Envelope<T> {
    /// Unwraps the item list, whatever key carried it.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Homeworks { homeworks: items }
            | Self::Exams { exams: items }
            | Self::Grades { grades: items }
            | Self::Bare(items)
            | Self::Data {
                data:
                    EnvelopeData::List(items)
                    | EnvelopeData::Homeworks { homeworks: items }
                    | EnvelopeData::Exams { exams: items },
            } => items,
        }
    }
}
