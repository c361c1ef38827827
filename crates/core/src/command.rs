// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveDate;
use schulplan_domain::{GradeItem, HomeworkItem, RawLessonBatch, ScheduleTiming, StudentId};

/// A command carries one cycle's input for one student as data only.
///
/// Commands are the only way to advance the cross-cycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace a student's schedule snapshot with freshly fetched lessons.
    IngestSchedule {
        /// The student the lessons belong to.
        student_id: StudentId,
        /// The raw lessons and class-hour table.
        batch: RawLessonBatch,
        /// First day of the fetched range.
        range_start: NaiveDate,
        /// Last day of the fetched range.
        range_end: NaiveDate,
        /// Lesson/break model for periods without class-hour times.
        timing: ScheduleTiming,
    },
    /// Record a student's current homework list.
    IngestHomework {
        /// The student the homework belongs to.
        student_id: StudentId,
        /// Every homework item currently listed.
        items: Vec<HomeworkItem>,
    },
    /// Record a student's current grade list.
    IngestGrades {
        /// The student the grades belong to.
        student_id: StudentId,
        /// Every grade currently listed.
        items: Vec<GradeItem>,
    },
}
