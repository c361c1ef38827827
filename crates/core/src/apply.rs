// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::novelty::{NoveltyEvent, NoveltyPayload};
use crate::state::{State, TransitionResult};
use schulplan_changes::{ChangeRecord, diff};
use schulplan_domain::{
    DateRange, DomainError, NormalizedLesson, ScheduleSnapshot, augment_with_free_hours,
    normalize_lessons,
};
use tracing::{debug, info};

/// Applies a command to the current state, producing a new state.
///
/// The input state is never modified. Schedule ingestion normalizes the
/// batch, fills free hours, diffs against the student's previous snapshot
/// and replaces it. Homework and grade ingestion grow the seen-sets.
///
/// # Arguments
///
/// * `state` - The current state
/// * `command` - The command to apply
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state, changes and novelties
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns `CoreError::InvalidSchedule` if a schedule range ends before it starts.
pub fn apply(state: &State, command: Command) -> Result<TransitionResult, CoreError> {
    match command {
        Command::IngestSchedule {
            student_id,
            batch,
            range_start,
            range_end,
            timing,
        } => {
            let range: DateRange = DateRange::new(range_start, range_end)
                .map_err(|source: DomainError| CoreError::InvalidSchedule { student_id, source })?;

            let lessons: Vec<NormalizedLesson> =
                normalize_lessons(&batch.lessons, batch.periods.as_ref(), &timing);
            let augmented: Vec<NormalizedLesson> =
                augment_with_free_hours(lessons, batch.periods.as_ref(), &range);
            let snapshot: ScheduleSnapshot = ScheduleSnapshot::new(student_id, range, augmented);

            let changes: Vec<ChangeRecord> = diff(state.snapshot(student_id), &snapshot);
            if !changes.is_empty() {
                info!(
                    student_id = %student_id,
                    changes = changes.len(),
                    "Schedule changes detected"
                );
            }

            let mut new_state: State = state.clone();
            new_state.snapshots.insert(student_id, snapshot);

            Ok(TransitionResult {
                new_state,
                changes,
                novelties: Vec::new(),
            })
        }
        Command::IngestHomework { student_id, items } => {
            let mut new_state: State = state.clone();
            let novelties: Vec<NoveltyEvent> = new_state
                .novelty
                .observe(NoveltyPayload::Homework(student_id, &items));
            debug!(student_id = %student_id, new = novelties.len(), "Homework observed");

            Ok(TransitionResult {
                new_state,
                changes: Vec::new(),
                novelties,
            })
        }
        Command::IngestGrades { student_id, items } => {
            let mut new_state: State = state.clone();
            let novelties: Vec<NoveltyEvent> = new_state
                .novelty
                .observe(NoveltyPayload::Grades(student_id, &items));
            debug!(student_id = %student_id, new = novelties.len(), "Grades observed");

            Ok(TransitionResult {
                new_state,
                changes: Vec::new(),
                novelties,
            })
        }
    }
}
