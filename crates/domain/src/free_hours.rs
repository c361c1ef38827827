// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::lesson::NormalizedLesson;
use crate::time_slot::{Period, PeriodTable};
use crate::types::DateRange;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Period numbers holding at least one entry on `date`.
#[must_use]
pub fn occupied_periods(lessons: &[NormalizedLesson], date: NaiveDate) -> BTreeSet<u8> {
    lessons
        .iter()
        .filter(|lesson: &&NormalizedLesson| lesson.date == date)
        .filter_map(|lesson: &NormalizedLesson| lesson.period)
        .collect()
}

/// Adds a free-hour placeholder for every unoccupied period of every
/// school day in `range`.
///
/// Available periods are those of the class-hour table. Without a table
/// the lessons are returned unchanged. Real entries are never removed,
/// including several real entries sharing one slot.
///
/// # Arguments
///
/// * `lessons` - The normalized lessons of one student
/// * `table` - The class-hour table, if the portal delivered one
/// * `range` - The days to fill; weekends are skipped
///
/// # Returns
///
/// The lessons plus placeholders, sorted by date and period.
#[must_use]
pub fn augment_with_free_hours(
    mut lessons: Vec<NormalizedLesson>,
    table: Option<&PeriodTable>,
    range: &DateRange,
) -> Vec<NormalizedLesson> {
    let Some(table) = table.filter(|t: &&PeriodTable| !t.is_empty()) else {
        debug!("No class-hour table, skipping free-hour synthesis");
        return lessons;
    };

    let mut synthetic: Vec<NormalizedLesson> = Vec::new();
    for day in range.school_days() {
        let occupied: BTreeSet<u8> = occupied_periods(&lessons, day);
        synthetic.extend(
            table
                .periods()
                .filter(|period: &&Period| !occupied.contains(&period.number))
                .map(|period: &Period| NormalizedLesson::free_hour(day, period)),
        );
    }

    debug!(
        free_hours = synthetic.len(),
        start = %range.start(),
        end = %range.end(),
        "Synthesized free hours"
    );

    lessons.extend(synthetic);
    lessons.sort_by_key(NormalizedLesson::sort_key);
    lessons
}
