// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Refresh-cycle orchestration and read-only view builders.
//!
//! A cycle takes already-fetched, already-decoded payloads and threads the
//! cross-cycle state through one student at a time. Fetching is the
//! caller's business; nothing here performs I/O.

use chrono::{Days, NaiveDate, NaiveDateTime, Weekday};
use schulplan::{Command, NoveltyEvent, State, TransitionResult, apply};
use schulplan_changes::{ChangeRecord, ChangeSummary};
use schulplan_domain::{
    DateRange, ExamItem, ExamView, GradeItem, HomeworkItem, HomeworkView, LessonSummary, Letter,
    NormalizedLesson, Period, PeriodTable, RawLessonBatch, ScheduleSnapshot, ScheduleTiming,
    ScheduleView, StudentId, Window,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::error::{ApiError, translate_core_error};
use crate::options::RefreshOptions;
use crate::request_response::{
    ChangesResponse, ExamResponse, GradesResponse, HealthResponse, HomeworkResponse,
    LettersResponse, PeriodSource, PublishedData, ScheduleConfig, ScheduleViewResponse,
    StudentData, StudentInfo, StudentListEntry, StudentListResponse, WindowSummary,
};

/// Periods shown in a computed table when no lesson names a higher one.
const DEFAULT_COMPUTED_PERIODS: u8 = 6;

/// Weeks past the current Monday covered by the exam fetch.
const EXAM_LOOKAHEAD_WEEKS: u64 = 8;

/// Days before today still covered by the exam fetch.
const EXAM_LOOKBACK_DAYS: u64 = 7;

fn monday_of(day: NaiveDate) -> NaiveDate {
    day.week(Weekday::Mon).first_day()
}

fn plus_days(day: NaiveDate, days: u64) -> NaiveDate {
    day.checked_add_days(Days::new(days)).unwrap_or(day)
}

/// The timetable range fetched in a cycle.
///
/// Runs from the Monday of the current week to the Monday
/// `lookahead_weeks` later.
#[must_use]
pub fn schedule_window(today: NaiveDate, lookahead_weeks: u32) -> DateRange {
    let start: NaiveDate = monday_of(today);
    let end: NaiveDate = plus_days(start, u64::from(lookahead_weeks) * 7);
    DateRange::new(start, end).unwrap_or_else(|_| DateRange::single(start))
}

/// The exam range fetched in a cycle: one week back to eight weeks ahead.
#[must_use]
pub fn exam_window(today: NaiveDate) -> DateRange {
    let start: NaiveDate = today
        .checked_sub_days(Days::new(EXAM_LOOKBACK_DAYS))
        .unwrap_or(today);
    let end: NaiveDate = plus_days(monday_of(today), EXAM_LOOKAHEAD_WEEKS * 7);
    DateRange::new(start, end).unwrap_or_else(|_| DateRange::single(start))
}

/// One student's fetched payloads for a cycle.
///
/// Optional categories are `None` when they were not requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentPayload {
    pub student: StudentInfo,
    pub lessons: Result<RawLessonBatch, ApiError>,
    pub homework: Option<Result<Vec<HomeworkItem>, ApiError>>,
    pub grades: Option<Result<Vec<GradeItem>, ApiError>>,
    pub exams: Option<Result<Vec<ExamItem>, ApiError>>,
}

/// The result of refreshing one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRefresh {
    /// The state after every command for this student.
    pub new_state: State,
    pub data: StudentData,
    pub changes: Vec<ChangeRecord>,
    pub novelties: Vec<NoveltyEvent>,
}

fn optional_category<T>(
    student_id: StudentId,
    category: &'static str,
    payload: Option<Result<Vec<T>, ApiError>>,
) -> Option<Vec<T>> {
    match payload {
        None => None,
        Some(Ok(items)) => Some(items),
        Some(Err(e)) => {
            warn!(
                student_id = %student_id,
                category,
                error = %e,
                "Optional category failed; publishing it empty"
            );
            None
        }
    }
}

/// Refreshes one student from fetched payloads.
///
/// The schedule is mandatory. Homework, grades and exams degrade to empty
/// lists on failure. A failed homework or grade fetch is not observed, so
/// it neither seeds nor advances the seen-sets.
///
/// # Arguments
///
/// * `state` - The state before this student
/// * `payload` - The student's payloads
/// * `options` - Cycle options
/// * `now` - The school-local wall clock
///
/// # Returns
///
/// * `Ok(StudentRefresh)` with the new state and the student's data
/// * `Err(ApiError)` if the schedule could not be fetched or ingested
///
/// # Errors
///
/// Returns the schedule fetch error, or an `InvalidInput` error if the
/// schedule range is invalid.
pub fn refresh_student(
    state: &State,
    payload: StudentPayload,
    options: &RefreshOptions,
    now: NaiveDateTime,
) -> Result<StudentRefresh, ApiError> {
    let student_id: StudentId = payload.student.id;
    let batch: RawLessonBatch = payload.lessons?;
    let periods: Option<PeriodTable> = batch.periods.clone();
    let range: DateRange = schedule_window(now.date(), options.lookahead_weeks);

    let schedule: TransitionResult = apply(
        state,
        Command::IngestSchedule {
            student_id,
            batch,
            range_start: range.start(),
            range_end: range.end(),
            timing: options.timing,
        },
    )
    .map_err(translate_core_error)?;
    let mut current: State = schedule.new_state;
    let changes: Vec<ChangeRecord> = schedule.changes;
    let mut novelties: Vec<NoveltyEvent> = Vec::new();

    let homework: Vec<HomeworkItem> =
        match optional_category(student_id, "homework", payload.homework) {
            Some(items) => {
                let result: TransitionResult = apply(
                    &current,
                    Command::IngestHomework {
                        student_id,
                        items: items.clone(),
                    },
                )
                .map_err(translate_core_error)?;
                current = result.new_state;
                novelties.extend(result.novelties);
                items
            }
            None => Vec::new(),
        };

    let grades: Vec<GradeItem> = match optional_category(student_id, "grades", payload.grades) {
        Some(items) => {
            let result: TransitionResult = apply(
                &current,
                Command::IngestGrades {
                    student_id,
                    items: items.clone(),
                },
            )
            .map_err(translate_core_error)?;
            current = result.new_state;
            novelties.extend(result.novelties);
            items
        }
        None => Vec::new(),
    };

    let exam_range: DateRange = exam_window(now.date());
    let mut exams: Vec<ExamItem> = optional_category(student_id, "exams", payload.exams)
        .unwrap_or_default()
        .into_iter()
        .filter(|exam: &ExamItem| exam_range.contains(exam.date))
        .collect();
    exams.sort_by_key(|exam: &ExamItem| (exam.date, exam.priority(), exam.period));

    let snapshot: ScheduleSnapshot = current
        .snapshot(student_id)
        .cloned()
        .ok_or_else(|| ApiError::Internal {
            message: format!("No snapshot stored for student {student_id}"),
        })?;

    debug!(
        student_id = %student_id,
        lessons = snapshot.lessons().len(),
        changes = changes.len(),
        novelties = novelties.len(),
        "Student refreshed"
    );

    Ok(StudentRefresh {
        new_state: current,
        data: StudentData {
            student: payload.student,
            snapshot,
            periods,
            changes: ChangeSummary::from_changes(changes.clone()),
            homework,
            grades,
            exams,
            refreshed_at: now,
            stale: false,
        },
        changes,
        novelties,
    })
}

/// Everything fetched for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInput {
    /// The student listing with each student's payloads.
    pub students: Result<Vec<StudentPayload>, ApiError>,
    /// Account-wide letters, `None` when not requested.
    pub letters: Option<Result<Vec<Letter>, ApiError>>,
}

/// The result of a successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    pub new_state: State,
    pub published: PublishedData,
    /// Schedule changes per refreshed student.
    pub changes: BTreeMap<StudentId, Vec<ChangeRecord>>,
    pub novelties: Vec<NoveltyEvent>,
}

/// Runs one refresh cycle over every student.
///
/// Students are refreshed independently. A failed student keeps the data
/// it had after the previous cycle, marked stale, and is listed in the
/// failures. The returned state is only meant to replace the caller's
/// state when the cycle succeeds.
///
/// # Arguments
///
/// * `state` - The state after the previous successful cycle
/// * `previous` - The data published by the previous successful cycle
/// * `input` - The fetched payloads
/// * `options` - Cycle options
/// * `now` - The school-local wall clock
///
/// # Errors
///
/// Returns an error if:
/// - The student listing failed
/// - The account has no students
/// - Every student failed
pub fn run_cycle(
    state: &State,
    previous: Option<&PublishedData>,
    input: CycleInput,
    options: &RefreshOptions,
    now: NaiveDateTime,
) -> Result<CycleOutcome, ApiError> {
    let payloads: Vec<StudentPayload> = input.students?;
    if payloads.is_empty() {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Student"),
            message: String::from("No students found for this account"),
        });
    }

    let attempted: usize = payloads.len();
    let mut current: State = state.clone();
    let mut students: BTreeMap<StudentId, StudentData> = BTreeMap::new();
    let mut failures: BTreeMap<StudentId, String> = BTreeMap::new();
    let mut changes: BTreeMap<StudentId, Vec<ChangeRecord>> = BTreeMap::new();
    let mut novelties: Vec<NoveltyEvent> = Vec::new();

    for payload in payloads {
        let student_id: StudentId = payload.student.id;
        match refresh_student(&current, payload, options, now) {
            Ok(refresh) => {
                current = refresh.new_state;
                students.insert(student_id, refresh.data);
                changes.insert(student_id, refresh.changes);
                novelties.extend(refresh.novelties);
            }
            Err(e) => {
                warn!(student_id = %student_id, error = %e, "Student refresh failed");
                failures.insert(student_id, e.to_string());
                if let Some(earlier) = previous.and_then(|p: &PublishedData| p.students.get(&student_id)) {
                    let mut carried: StudentData = earlier.clone();
                    carried.stale = true;
                    carried.changes = ChangeSummary::default();
                    students.insert(student_id, carried);
                }
            }
        }
    }

    if failures.len() == attempted {
        return Err(ApiError::Upstream {
            message: format!("All {attempted} students failed to refresh"),
        });
    }

    let letters: Vec<Letter> = match input.letters {
        None => Vec::new(),
        Some(Ok(mut letters)) => {
            letters.sort_by(|a: &Letter, b: &Letter| b.date.cmp(&a.date));
            letters
        }
        Some(Err(e)) => {
            warn!(error = %e, "Letters fetch failed; publishing none");
            Vec::new()
        }
    };

    info!(
        students = students.len(),
        failed = failures.len(),
        changes = changes.values().map(Vec::len).sum::<usize>(),
        novelties = novelties.len(),
        "Refresh cycle complete"
    );

    Ok(CycleOutcome {
        new_state: current,
        published: PublishedData {
            students,
            letters,
            failures,
            last_update: now,
        },
        changes,
        novelties,
    })
}

/// Looks up a student in the published data.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the student is unknown.
pub fn find_student(
    published: &PublishedData,
    student_id: StudentId,
) -> Result<&StudentData, ApiError> {
    published
        .students
        .get(&student_id)
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Student"),
            message: format!("Student {student_id} does not exist"),
        })
}

fn schedule_config(data: &StudentData, timing: &ScheduleTiming) -> ScheduleConfig {
    match &data.periods {
        Some(table) => ScheduleConfig {
            source: PeriodSource::Institution,
            timing: *timing,
            class_hours: table.periods().copied().collect(),
        },
        None => {
            let highest: u8 = data
                .snapshot
                .lessons()
                .iter()
                .filter_map(|lesson: &NormalizedLesson| lesson.period)
                .max()
                .unwrap_or(DEFAULT_COMPUTED_PERIODS);
            ScheduleConfig {
                source: PeriodSource::Computed,
                timing: *timing,
                class_hours: PeriodTable::computed(timing, highest)
                    .periods()
                    .copied()
                    .collect::<Vec<Period>>(),
            }
        }
    }
}

/// Derives every schedule view of a student at `now`.
///
/// Views are computed per request from the stored snapshot, so they stay
/// correct as the day moves on between cycles.
///
/// # Arguments
///
/// * `data` - The student's published data
/// * `timing` - The lesson/break model in effect
/// * `now` - The school-local wall clock
/// * `stale` - Whether the latest cycle failed as a whole
#[must_use]
pub fn build_schedule_view(
    data: &StudentData,
    timing: &ScheduleTiming,
    now: NaiveDateTime,
    stale: bool,
) -> ScheduleViewResponse {
    let views: ScheduleView = ScheduleView::derive(data.snapshot.lessons(), now);
    let summaries: BTreeMap<String, WindowSummary> = Window::ALL
        .iter()
        .map(|window: &Window| {
            let summary: LessonSummary = LessonSummary::from_lessons(views.window(*window));
            (
                window.as_str().to_string(),
                WindowSummary {
                    text: summary.text(true),
                    summary,
                },
            )
        })
        .collect();

    ScheduleViewResponse {
        student: data.student.clone(),
        views,
        changes_detected: data.changes.clone(),
        summaries,
        schedule_config: schedule_config(data, timing),
        generated_at: now,
        refreshed_at: data.refreshed_at,
        stale: stale || data.stale,
    }
}

#[must_use]
pub fn build_changes_response(data: &StudentData) -> ChangesResponse {
    ChangesResponse {
        student_id: data.student.id,
        summary: data.changes.clone(),
    }
}

/// Buckets a student's homework relative to `today`.
#[must_use]
pub fn build_homework_response(data: &StudentData, today: NaiveDate) -> HomeworkResponse {
    HomeworkResponse {
        student_id: data.student.id,
        total: data.homework.len(),
        view: HomeworkView::derive(&data.homework, today),
    }
}

/// Lists a student's grades, newest first.
#[must_use]
pub fn build_grades_response(data: &StudentData) -> GradesResponse {
    let mut grades: Vec<GradeItem> = data.grades.clone();
    grades.sort_by(|a: &GradeItem, b: &GradeItem| b.date.cmp(&a.date));
    GradesResponse {
        student_id: data.student.id,
        total: grades.len(),
        grades,
    }
}

/// Buckets a student's exams relative to `today`.
#[must_use]
pub fn build_exam_response(data: &StudentData, today: NaiveDate) -> ExamResponse {
    ExamResponse {
        student_id: data.student.id,
        total: data.exams.len(),
        view: ExamView::derive(&data.exams, today),
    }
}

#[must_use]
pub fn build_letters_response(published: &PublishedData) -> LettersResponse {
    LettersResponse {
        count: published.letters.len(),
        letters: published.letters.clone(),
    }
}

/// Lists every published student with headline figures.
#[must_use]
pub fn build_student_list(published: &PublishedData) -> StudentListResponse {
    StudentListResponse {
        students: published
            .students
            .values()
            .map(|data: &StudentData| StudentListEntry {
                student: data.student.clone(),
                lesson_count: data
                    .snapshot
                    .lessons()
                    .iter()
                    .filter(|lesson: &&NormalizedLesson| !lesson.is_free_hour)
                    .count(),
                refreshed_at: data.refreshed_at,
                stale: data.stale,
            })
            .collect(),
        failures: published.failures.clone(),
    }
}

/// Reports refresh health.
///
/// # Arguments
///
/// * `published` - The latest published data, if any cycle succeeded
/// * `last_error` - The error of the latest cycle, if it failed
/// * `stale` - Whether the latest cycle failed
#[must_use]
pub fn build_health(
    published: Option<&PublishedData>,
    last_error: Option<String>,
    stale: bool,
) -> HealthResponse {
    let status: &str = match published {
        None => "starting",
        Some(_) if stale => "stale",
        Some(data) if data.is_partial() => "partial",
        Some(_) => "ok",
    };
    HealthResponse {
        status: status.to_string(),
        last_success: published.map(|data: &PublishedData| data.last_update),
        last_error,
        stale,
        student_count: published.map_or(0, |data: &PublishedData| data.students.len()),
    }
}
