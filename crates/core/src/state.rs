// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::novelty::{NoveltyEvent, NoveltyTracker};
use schulplan_changes::ChangeRecord;
use schulplan_domain::{ScheduleSnapshot, StudentId};
use std::collections::BTreeMap;

/// Everything carried from one refresh cycle to the next.
///
/// Only the latest snapshot per student is kept. It becomes the
/// previous snapshot the next cycle diffs against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    /// Latest schedule snapshot per student.
    pub snapshots: BTreeMap<StudentId, ScheduleSnapshot>,
    /// Homework and grade seen-sets.
    pub novelty: NoveltyTracker,
}

impl State {
    /// Creates an empty state.
    ///
    /// # Arguments
    ///
    /// * `novelty_capacity` - Maximum keys per student and category, `None` for unbounded
    #[must_use]
    pub fn new(novelty_capacity: Option<usize>) -> Self {
        Self {
            snapshots: BTreeMap::new(),
            novelty: NoveltyTracker::new(novelty_capacity),
        }
    }

    /// The latest snapshot of a student.
    #[must_use]
    pub fn snapshot(&self, student_id: StudentId) -> Option<&ScheduleSnapshot> {
        self.snapshots.get(&student_id)
    }
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: State,
    /// Schedule changes against the previous snapshot.
    pub changes: Vec<ChangeRecord>,
    /// Homework or grade items not seen before.
    pub novelties: Vec<NoveltyEvent>,
}
