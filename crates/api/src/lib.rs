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

mod decode;
mod error;
mod handlers;
mod options;
mod request_response;
mod wire;

#[cfg(test)]
mod tests;

pub use decode::{
    decode_class_hours, decode_exams, decode_grades, decode_homework, decode_lesson_batch,
    decode_letters, decode_students,
};
pub use error::{ApiError, DecodeError, translate_core_error, translate_domain_error};
pub use handlers::{
    CycleInput, CycleOutcome, StudentPayload, StudentRefresh, build_changes_response,
    build_exam_response, build_grades_response, build_health, build_homework_response,
    build_letters_response, build_schedule_view, build_student_list, exam_window, find_student,
    refresh_student, run_cycle, schedule_window,
};
pub use options::RefreshOptions;
pub use request_response::{
    ChangesResponse, ExamResponse, GradesResponse, HealthResponse, HomeworkResponse,
    LettersResponse, PeriodSource, PublishedData, RefreshResponse, ScheduleConfig,
    ScheduleViewResponse, StudentData, StudentInfo, StudentListEntry, StudentListResponse,
    WindowSummary,
};
pub use wire::{
    ClassHourDto, Envelope, EnvelopeData, EventDto, ExamDto, ExamTypeDto, GradeDto, HomeworkDto,
    LessonBatchDto, LessonDetailsDto, LessonDto, LetterDto, RoomDto, StudentDto, SubjectDto,
    TeacherDto, WireId,
};
