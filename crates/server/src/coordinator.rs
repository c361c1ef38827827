// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runs refresh cycles and holds what they publish.
//!
//! Cycles are serialized by the state lock, so a scheduled tick and a
//! manual refresh never interleave. Readers only ever see a complete
//! cycle's output.

use chrono::NaiveDateTime;
use futures::future::join_all;
use schulplan::State;
use schulplan_api::{
    ApiError, CycleInput, CycleOutcome, PublishedData, RefreshOptions, StudentInfo,
    StudentPayload, exam_window, run_cycle, schedule_window,
};
use schulplan_changes::ChangeRecord;
use schulplan_domain::{DateRange, StudentId};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::live::{LiveEvent, LiveEventBroadcaster};
use crate::source::PayloadSource;

/// Outcome of the latest cycle attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    pub last_attempt: Option<NaiveDateTime>,
    pub last_error: Option<String>,
    /// Set while the latest attempt failed cycle-wide.
    pub stale: bool,
}

/// Owns the cross-cycle state and the published data.
pub struct Coordinator {
    source: Arc<dyn PayloadSource>,
    options: RefreshOptions,
    state: Mutex<State>,
    published: RwLock<Option<Arc<PublishedData>>>,
    status: RwLock<RefreshStatus>,
    broadcaster: Arc<LiveEventBroadcaster>,
}

impl Coordinator {
    #[must_use]
    pub fn new(
        source: Arc<dyn PayloadSource>,
        options: RefreshOptions,
        novelty_capacity: Option<usize>,
        broadcaster: Arc<LiveEventBroadcaster>,
    ) -> Self {
        Self {
            source,
            options,
            state: Mutex::new(State::new(novelty_capacity)),
            published: RwLock::new(None),
            status: RwLock::new(RefreshStatus::default()),
            broadcaster,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &RefreshOptions {
        &self.options
    }

    /// The data of the latest successful cycle.
    pub async fn published(&self) -> Option<Arc<PublishedData>> {
        self.published.read().await.clone()
    }

    pub async fn status(&self) -> RefreshStatus {
        self.status.read().await.clone()
    }

    /// Runs one refresh cycle.
    ///
    /// On success the new state and data replace the old ones together and
    /// changes and novelties are broadcast. On failure both stay as they
    /// were and the published data is marked stale.
    ///
    /// # Errors
    ///
    /// Returns the cycle-wide failure, if any.
    pub async fn refresh(&self, now: NaiveDateTime) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        let input: CycleInput = self.fetch(now).await;
        let previous: Option<Arc<PublishedData>> = self.published().await;

        match run_cycle(&state, previous.as_deref(), input, &self.options, now) {
            Ok(outcome) => {
                let CycleOutcome {
                    new_state,
                    published,
                    changes,
                    novelties,
                } = outcome;
                *state = new_state;
                *self.published.write().await = Some(Arc::new(published));
                *self.status.write().await = RefreshStatus {
                    last_attempt: Some(now),
                    last_error: None,
                    stale: false,
                };
                drop(state);

                for (student_id, records) in changes {
                    self.announce_changes(student_id, records);
                }
                for novelty in novelties {
                    self.broadcaster.broadcast(&LiveEvent::from(novelty));
                }
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Refresh cycle failed; keeping previous data");
                *self.status.write().await = RefreshStatus {
                    last_attempt: Some(now),
                    last_error: Some(e.to_string()),
                    stale: true,
                };
                self.broadcaster.broadcast(&LiveEvent::RefreshFailed {
                    message: e.to_string(),
                    attempted_at: now,
                });
                Err(e)
            }
        }
    }

    fn announce_changes(&self, student_id: StudentId, records: Vec<ChangeRecord>) {
        if records.is_empty() {
            return;
        }
        info!(student_id = %student_id, changes = records.len(), "Announcing schedule changes");
        self.broadcaster.broadcast(&LiveEvent::ScheduleChanged {
            student_id,
            change_count: records.len(),
            changes: records,
        });
    }

    async fn fetch(&self, now: NaiveDateTime) -> CycleInput {
        let students: Vec<StudentInfo> = match self.source.students().await {
            Ok(students) => students,
            Err(e) => {
                return CycleInput {
                    students: Err(e.into()),
                    letters: None,
                };
            }
        };

        let payloads: Vec<StudentPayload> = join_all(
            students
                .into_iter()
                .map(|student: StudentInfo| self.fetch_student(student, now)),
        )
        .await;

        let letters = if self.options.include_letters {
            Some(self.source.letters().await.map_err(ApiError::from))
        } else {
            None
        };

        CycleInput {
            students: Ok(payloads),
            letters,
        }
    }

    async fn fetch_student(&self, student: StudentInfo, now: NaiveDateTime) -> StudentPayload {
        let student_id: StudentId = student.id;
        let range: DateRange = schedule_window(now.date(), self.options.lookahead_weeks);

        let lessons = self
            .source
            .lessons(student_id, range)
            .await
            .map_err(ApiError::from);
        let homework = if self.options.include_homework {
            Some(self.source.homework(student_id).await.map_err(ApiError::from))
        } else {
            None
        };
        let grades = if self.options.include_grades {
            Some(self.source.grades(student_id).await.map_err(ApiError::from))
        } else {
            None
        };
        let exams = if self.options.include_exams {
            Some(
                self.source
                    .exams(student_id, exam_window(now.date()))
                    .await
                    .map_err(ApiError::from),
            )
        } else {
            None
        };

        StudentPayload {
            student,
            lessons,
            homework,
            grades,
            exams,
        }
    }
}

/// Rate limit for manually requested refreshes.
///
/// Scheduled ticks do not pass through the gate.
#[derive(Debug, Clone)]
pub struct RefreshGate {
    cooldown: Duration,
    last: Option<Instant>,
}

impl RefreshGate {
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// Returns whether a manual refresh may run at `now`, and if so
    /// starts a new cooldown.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last
            && now.saturating_duration_since(last) < self.cooldown
        {
            return false;
        }
        self.last = Some(now);
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::source::memory::MemorySource;
    use chrono::{NaiveDate, NaiveTime};
    use schulplan_domain::{
        PeriodTable, RawLesson, RawLessonBatch, RawLessonDetails, RawLessonKind, ScheduleTiming,
    };

    fn thursday_at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 11)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    fn batch(room: &str) -> RawLessonBatch {
        RawLessonBatch {
            lessons: vec![RawLesson {
                id: None,
                date: Some(String::from("2025-09-11")),
                period: Some(1),
                start: None,
                end: None,
                kind: RawLessonKind::Regular(RawLessonDetails {
                    lesson_id: None,
                    subject_name: String::from("Mathematik"),
                    subject_abbreviation: String::from("M"),
                    room: room.to_string(),
                    teachers: Vec::new(),
                }),
                comment: String::new(),
            }],
            periods: Some(PeriodTable::computed(&ScheduleTiming::default(), 2)),
        }
    }

    async fn coordinator_with(room: &str) -> (Arc<MemorySource>, Coordinator) {
        let source: Arc<MemorySource> = Arc::new(MemorySource::default());
        {
            let mut data = source.data.write().await;
            data.students = Some(vec![StudentInfo {
                id: StudentId::new(1),
                name: String::from("Mia Schulz"),
                class_id: None,
            }]);
            data.lessons.insert(StudentId::new(1), batch(room));
        }
        let coordinator: Coordinator = Coordinator::new(
            source.clone(),
            RefreshOptions::default(),
            Some(100),
            Arc::new(LiveEventBroadcaster::new()),
        );
        (source, coordinator)
    }

    #[tokio::test]
    async fn test_refresh_publishes_data() {
        let (_, coordinator) = coordinator_with("A101").await;
        assert!(coordinator.published().await.is_none());

        coordinator.refresh(thursday_at(7, 30)).await.unwrap();

        let published = coordinator.published().await.unwrap();
        assert_eq!(published.students.len(), 1);
        assert_eq!(published.last_update, thursday_at(7, 30));
        assert!(!coordinator.status().await.stale);
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_data_and_marks_stale() {
        let (source, coordinator) = coordinator_with("A101").await;
        coordinator.refresh(thursday_at(7, 30)).await.unwrap();

        source.data.write().await.students = None;
        let result = coordinator.refresh(thursday_at(7, 45)).await;
        assert!(result.is_err());

        let published = coordinator.published().await.unwrap();
        assert_eq!(published.last_update, thursday_at(7, 30));
        let status: RefreshStatus = coordinator.status().await;
        assert!(status.stale);
        assert_eq!(status.last_attempt, Some(thursday_at(7, 45)));
        assert!(status.last_error.is_some());
    }

    #[tokio::test]
    async fn test_changes_are_broadcast() {
        let (source, coordinator) = coordinator_with("A101").await;
        coordinator.refresh(thursday_at(7, 30)).await.unwrap();

        let mut rx = coordinator.broadcaster.subscribe();
        source
            .data
            .write()
            .await
            .lessons
            .insert(StudentId::new(1), batch("C303"));
        coordinator.refresh(thursday_at(7, 45)).await.unwrap();

        match rx.try_recv().unwrap() {
            LiveEvent::ScheduleChanged {
                student_id,
                change_count,
                ..
            } => {
                assert_eq!(student_id, StudentId::new(1));
                assert_eq!(change_count, 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_cycle_is_broadcast() {
        let (source, coordinator) = coordinator_with("A101").await;
        let mut rx = coordinator.broadcaster.subscribe();
        source.data.write().await.students = Some(Vec::new());

        assert!(coordinator.refresh(thursday_at(7, 30)).await.is_err());
        assert!(matches!(
            rx.try_recv().unwrap(),
            LiveEvent::RefreshFailed { .. }
        ));
    }

    #[test]
    fn test_refresh_gate_enforces_cooldown() {
        let mut gate: RefreshGate = RefreshGate::new(Duration::from_secs(30));
        let start: Instant = Instant::now();

        assert!(gate.try_acquire(start));
        assert!(!gate.try_acquire(start + Duration::from_secs(10)));
        assert!(gate.try_acquire(start + Duration::from_secs(30)));
        assert!(!gate.try_acquire(start + Duration::from_secs(31)));
    }
}
