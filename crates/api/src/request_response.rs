// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Published data and API response data transfer objects.

use chrono::NaiveDateTime;
use schulplan_changes::ChangeSummary;
use schulplan_domain::{
    ExamItem, ExamView, GradeItem, HomeworkItem, HomeworkView, LessonSummary, Letter, Period,
    PeriodTable, ScheduleSnapshot, ScheduleTiming, ScheduleView, StudentId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A student on the portal account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInfo {
    pub id: StudentId,
    /// First and last name.
    pub name: String,
    pub class_id: Option<i64>,
}

/// Everything published for one student after a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentData {
    pub student: StudentInfo,
    pub snapshot: ScheduleSnapshot,
    /// The class-hour table the snapshot was built with, if any.
    pub periods: Option<PeriodTable>,
    /// Changes against the snapshot of the cycle before.
    pub changes: ChangeSummary,
    pub homework: Vec<HomeworkItem>,
    pub grades: Vec<GradeItem>,
    pub exams: Vec<ExamItem>,
    /// When this student's data was last refreshed successfully.
    pub refreshed_at: NaiveDateTime,
    /// Set when the latest cycle failed for this student and the data
    /// is carried over from an earlier one.
    pub stale: bool,
}

/// The complete result of one successful cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedData {
    pub students: BTreeMap<StudentId, StudentData>,
    pub letters: Vec<Letter>,
    /// Students whose refresh failed in this cycle, with the reason.
    pub failures: BTreeMap<StudentId, String>,
    pub last_update: NaiveDateTime,
}

impl PublishedData {
    /// Returns whether some students failed in the cycle.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Response for the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, `partial`, `stale` or `starting`.
    pub status: String,
    pub last_success: Option<NaiveDateTime>,
    pub last_error: Option<String>,
    pub stale: bool,
    pub student_count: usize,
}

/// One entry of the student list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentListEntry {
    #[serde(flatten)]
    pub student: StudentInfo,
    pub lesson_count: usize,
    pub refreshed_at: NaiveDateTime,
    pub stale: bool,
}

/// Response listing the account's students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentListResponse {
    pub students: Vec<StudentListEntry>,
    pub failures: BTreeMap<StudentId, String>,
}

/// Where period times came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSource {
    /// The institution's class-hour table.
    Institution,
    /// The lesson/break model.
    Computed,
}

/// The effective timing configuration behind a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub source: PeriodSource,
    pub timing: ScheduleTiming,
    pub class_hours: Vec<Period>,
}

/// Aggregates of one calendar window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSummary {
    /// e.g. `"6 lessons, 5 subjects"`.
    pub text: String,
    #[serde(flatten)]
    pub summary: LessonSummary,
}

/// Every schedule view of one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleViewResponse {
    pub student: StudentInfo,
    #[serde(flatten)]
    pub views: ScheduleView,
    pub changes_detected: ChangeSummary,
    /// Keyed by window name (`today`, `tomorrow`, `this_week`, `next_week`).
    pub summaries: BTreeMap<String, WindowSummary>,
    pub schedule_config: ScheduleConfig,
    pub generated_at: NaiveDateTime,
    pub refreshed_at: NaiveDateTime,
    pub stale: bool,
}

/// Response for a student's schedule changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesResponse {
    pub student_id: StudentId,
    #[serde(flatten)]
    pub summary: ChangeSummary,
}

/// Response for a student's homework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkResponse {
    pub student_id: StudentId,
    pub total: usize,
    #[serde(flatten)]
    pub view: HomeworkView,
}

/// Response for a student's grades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradesResponse {
    pub student_id: StudentId,
    pub total: usize,
    pub grades: Vec<GradeItem>,
}

/// Response for a student's exams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResponse {
    pub student_id: StudentId,
    pub total: usize,
    #[serde(flatten)]
    pub view: ExamView,
}

/// Response listing the account's letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LettersResponse {
    pub count: usize,
    pub letters: Vec<Letter>,
}

/// Response to a manual refresh request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// `false` when the request fell inside the cooldown window.
    pub accepted: bool,
    pub message: String,
}
