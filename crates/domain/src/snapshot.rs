// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::lesson::NormalizedLesson;
use crate::types::{DateRange, StudentId};
use serde::{Deserialize, Serialize};

/// One student's normalized schedule as of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    student_id: StudentId,
    range: DateRange,
    lessons: Vec<NormalizedLesson>,
}

impl ScheduleSnapshot {
    /// Creates a snapshot. The lessons are put in slot order.
    #[must_use]
    pub fn new(student_id: StudentId, range: DateRange, mut lessons: Vec<NormalizedLesson>) -> Self {
        lessons.sort_by_key(NormalizedLesson::sort_key);
        Self {
            student_id,
            range,
            lessons,
        }
    }

    #[must_use]
    pub const fn student_id(&self) -> StudentId {
        self.student_id
    }

    /// The days this snapshot covers.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    /// Every entry, free hours included.
    #[must_use]
    pub fn lessons(&self) -> &[NormalizedLesson] {
        &self.lessons
    }
}
