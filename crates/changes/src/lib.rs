// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

//! Change detection between two schedule snapshots.
//!
//! Entries are matched by day, period and their position among the entries
//! sharing that slot. Only days covered by both snapshots are compared, so a
//! window moving forward reports nothing by itself. Free hours never produce
//! change records.

use chrono::NaiveDate;
use schulplan_domain::{DateRange, NormalizedLesson, ScheduleSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[cfg(test)]
mod tests;

/// The kind of a detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// The slot is new in the current snapshot.
    Added,
    /// The slot disappeared from the current snapshot.
    Removed,
    /// The slot exists in both snapshots with different content.
    Modified,
}

/// A lesson field compared between snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonField {
    Subject,
    Room,
    StartTime,
    EndTime,
    /// Teacher abbreviations, order-sensitive.
    Teachers,
    IsSubstitution,
    Kind,
    Comment,
}

impl LessonField {
    /// Every compared field, in reporting order.
    pub const ALL: [Self; 8] = [
        Self::Subject,
        Self::Room,
        Self::StartTime,
        Self::EndTime,
        Self::Teachers,
        Self::IsSubstitution,
        Self::Kind,
        Self::Comment,
    ];

    /// Human-readable field name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Subject => "Subject",
            Self::Room => "Room",
            Self::StartTime => "Start time",
            Self::EndTime => "End time",
            Self::Teachers => "Teachers",
            Self::IsSubstitution => "Substitution status",
            Self::Kind => "Lesson type",
            Self::Comment => "Comment",
        }
    }

    /// The field's value on `lesson`, rendered as text.
    #[must_use]
    pub fn value_of(&self, lesson: &NormalizedLesson) -> String {
        match self {
            Self::Subject => lesson.subject.name.clone(),
            Self::Room => lesson.room.clone(),
            Self::StartTime => lesson.start.format("%H:%M").to_string(),
            Self::EndTime => lesson.end.format("%H:%M").to_string(),
            Self::Teachers => lesson
                .teachers
                .iter()
                .map(|t| t.abbreviation.as_str())
                .collect::<Vec<&str>>()
                .join(", "),
            Self::IsSubstitution => lesson.is_substitution.to_string(),
            Self::Kind => lesson.kind.as_str().to_string(),
            Self::Comment => lesson.comment.clone(),
        }
    }
}

/// One field that differs between the previous and current lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: LessonField,
    pub previous: String,
    pub current: String,
}

/// One detected change to a timetable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub change_type: ChangeType,
    pub date: NaiveDate,
    pub period: Option<u8>,
    /// The entry in the current snapshot. `None` when removed.
    pub current: Option<NormalizedLesson>,
    /// The entry in the previous snapshot. `None` when added.
    pub previous: Option<NormalizedLesson>,
    /// Empty unless `change_type` is `Modified`.
    pub field_changes: Vec<FieldChange>,
    pub description: String,
}

/// Identifies a timetable slot across snapshots.
///
/// The occurrence index separates several entries sharing one slot, such as
/// a cancellation and its replacement.
type SlotKey = (NaiveDate, Option<u8>, usize);

fn key_lessons<'a>(
    snapshot: &'a ScheduleSnapshot,
    overlap: &DateRange,
) -> BTreeMap<SlotKey, &'a NormalizedLesson> {
    let mut occurrences: BTreeMap<(NaiveDate, Option<u8>), usize> = BTreeMap::new();
    let mut keyed: BTreeMap<SlotKey, &NormalizedLesson> = BTreeMap::new();
    for lesson in snapshot
        .lessons()
        .iter()
        .filter(|l| !l.is_free_hour && overlap.contains(l.date))
    {
        let seen: &mut usize = occurrences.entry((lesson.date, lesson.period)).or_insert(0);
        keyed.insert((lesson.date, lesson.period, *seen), lesson);
        *seen += 1;
    }
    keyed
}

fn label(lesson: &NormalizedLesson) -> &str {
    if lesson.subject.display.is_empty() {
        "lesson"
    } else {
        &lesson.subject.display
    }
}

/// Compares two lessons field by field.
#[must_use]
pub fn compare_lessons(previous: &NormalizedLesson, current: &NormalizedLesson) -> Vec<FieldChange> {
    LessonField::ALL
        .iter()
        .filter_map(|field: &LessonField| {
            let before: String = field.value_of(previous);
            let after: String = field.value_of(current);
            (before != after).then_some(FieldChange {
                field: *field,
                previous: before,
                current: after,
            })
        })
        .collect()
}

/// Lists the changes from `previous` to `current`.
///
/// Without a previous snapshot nothing counts as changed, so the first
/// load never reports every lesson as added. Days outside the overlap of the
/// two snapshot ranges are ignored.
///
/// # Arguments
///
/// * `previous` - The snapshot of the last successful cycle, if any
/// * `current` - The snapshot just built
///
/// # Returns
///
/// Change records ordered by day, period and slot occurrence.
#[must_use]
pub fn diff(previous: Option<&ScheduleSnapshot>, current: &ScheduleSnapshot) -> Vec<ChangeRecord> {
    let Some(previous) = previous else {
        return Vec::new();
    };
    let Some(overlap) = previous.range().intersection(&current.range()) else {
        debug!(student_id = %current.student_id(), "Snapshot ranges do not overlap");
        return Vec::new();
    };

    let before: BTreeMap<SlotKey, &NormalizedLesson> = key_lessons(previous, &overlap);
    let after: BTreeMap<SlotKey, &NormalizedLesson> = key_lessons(current, &overlap);
    let keys: BTreeSet<&SlotKey> = before.keys().chain(after.keys()).collect();

    let mut changes: Vec<ChangeRecord> = Vec::new();
    for key in keys {
        let (date, period, _) = *key;
        let record: Option<ChangeRecord> = match (before.get(key), after.get(key)) {
            (None, Some(added)) => Some(ChangeRecord {
                change_type: ChangeType::Added,
                date,
                period,
                current: Some((*added).clone()),
                previous: None,
                field_changes: Vec::new(),
                description: format!("New lesson added: {}", label(added)),
            }),
            (Some(removed), None) => Some(ChangeRecord {
                change_type: ChangeType::Removed,
                date,
                period,
                current: None,
                previous: Some((*removed).clone()),
                field_changes: Vec::new(),
                description: format!("Lesson removed: {}", label(removed)),
            }),
            (Some(old), Some(new)) => {
                let field_changes: Vec<FieldChange> = compare_lessons(old, new);
                if field_changes.is_empty() {
                    None
                } else {
                    let names: Vec<&str> = field_changes
                        .iter()
                        .map(|c: &FieldChange| c.field.display_name())
                        .collect();
                    Some(ChangeRecord {
                        change_type: ChangeType::Modified,
                        date,
                        period,
                        current: Some((*new).clone()),
                        previous: Some((*old).clone()),
                        description: format!("Changes in {}: {}", label(new), names.join(", ")),
                        field_changes,
                    })
                }
            }
            (None, None) => None,
        };
        changes.extend(record);
    }

    debug!(
        student_id = %current.student_id(),
        changes = changes.len(),
        "Compared schedule snapshots"
    );
    changes
}

/// The change list of one cycle with its headline figures.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub has_changes: bool,
    pub change_count: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub changes: Vec<ChangeRecord>,
}

impl ChangeSummary {
    #[must_use]
    pub fn from_changes(changes: Vec<ChangeRecord>) -> Self {
        let count = |kind: ChangeType| -> usize {
            changes
                .iter()
                .filter(|c: &&ChangeRecord| c.change_type == kind)
                .count()
        };
        Self {
            has_changes: !changes.is_empty(),
            change_count: changes.len(),
            added: count(ChangeType::Added),
            removed: count(ChangeType::Removed),
            modified: count(ChangeType::Modified),
            changes,
        }
    }
}
