// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use schulplan_domain::ScheduleTiming;
use serde::{Deserialize, Serialize};

/// What a refresh cycle fetches and how it shapes the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOptions {
    /// Lesson/break model for periods without class-hour times.
    pub timing: ScheduleTiming,
    /// Weeks of timetable fetched from the Monday of the current week.
    pub lookahead_weeks: u32,
    pub include_homework: bool,
    pub include_grades: bool,
    pub include_exams: bool,
    pub include_letters: bool,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            timing: ScheduleTiming::default(),
            lookahead_weeks: 2,
            include_homework: true,
            include_grades: false,
            include_exams: true,
            include_letters: true,
        }
    }
}
