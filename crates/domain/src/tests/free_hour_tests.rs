// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_table, date, hm, lesson};
use crate::{
    DateRange, LessonKind, NormalizedLesson, PeriodTable, augment_with_free_hours,
    occupied_periods,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[test]
fn test_unoccupied_periods_become_free_hours() {
    let day: NaiveDate = date(2025, 9, 11);
    let table: PeriodTable = create_test_table(3);
    let lessons: Vec<NormalizedLesson> = vec![lesson(day, 2, "Mathe", "R1")];

    let augmented: Vec<NormalizedLesson> =
        augment_with_free_hours(lessons, Some(&table), &DateRange::single(day));

    let slots: Vec<(Option<u8>, bool)> = augmented
        .iter()
        .map(|l: &NormalizedLesson| (l.period, l.is_free_hour))
        .collect();
    assert_eq!(slots, vec![(Some(1), true), (Some(2), false), (Some(3), true)]);

    let free: &NormalizedLesson = &augmented[0];
    assert_eq!(free.kind, LessonKind::Free);
    assert_eq!(free.id, "free_2025-09-11_1");
    assert_eq!((free.start, free.end), (hm(8, 0), hm(8, 45)));
    assert!(free.subject.is_empty());
    assert!(free.room.is_empty());
    assert!(free.teachers.is_empty());
}

#[test]
fn test_every_school_day_covers_every_available_period() {
    // Thursday through the following Tuesday.
    let range: DateRange = DateRange::new(date(2025, 9, 11), date(2025, 9, 16)).unwrap();
    let table: PeriodTable = create_test_table(6);
    let lessons: Vec<NormalizedLesson> = vec![
        lesson(date(2025, 9, 11), 1, "Mathe", "R1"),
        lesson(date(2025, 9, 11), 4, "Englisch", "R2"),
        lesson(date(2025, 9, 15), 6, "Sport", "Halle"),
    ];

    let augmented: Vec<NormalizedLesson> = augment_with_free_hours(lessons, Some(&table), &range);
    let expected: BTreeSet<u8> = table.available_periods().into_iter().collect();

    for day in range.school_days() {
        assert_eq!(occupied_periods(&augmented, day), expected, "gap on {day}");
        let per_day: usize = augmented.iter().filter(|l| l.date == day).count();
        assert_eq!(per_day, expected.len(), "duplicate on {day}");
    }
    assert!(
        augmented
            .iter()
            .all(|l: &NormalizedLesson| l.date != date(2025, 9, 13) && l.date != date(2025, 9, 14))
    );
}

#[test]
fn test_shared_slot_entries_are_all_kept() {
    let day: NaiveDate = date(2025, 9, 11);
    let table: PeriodTable = create_test_table(2);
    let mut cancelled: NormalizedLesson = lesson(day, 1, "Physik", "P1");
    cancelled.kind = LessonKind::Cancelled;
    let replacement: NormalizedLesson = lesson(day, 1, "Mathe", "R1");

    let augmented: Vec<NormalizedLesson> = augment_with_free_hours(
        vec![replacement, cancelled],
        Some(&table),
        &DateRange::single(day),
    );

    assert_eq!(augmented.len(), 3);
    assert_eq!(augmented[0].kind, LessonKind::Cancelled);
    assert_eq!(augmented[1].subject.name, "Mathe");
    assert!(augmented[2].is_free_hour);
}

#[test]
fn test_without_class_hours_lessons_are_unchanged() {
    let day: NaiveDate = date(2025, 9, 11);
    let lessons: Vec<NormalizedLesson> = vec![lesson(day, 2, "Mathe", "R1")];

    let augmented: Vec<NormalizedLesson> =
        augment_with_free_hours(lessons.clone(), None, &DateRange::single(day));

    assert_eq!(augmented, lessons);
}

#[test]
fn test_weekend_range_synthesizes_nothing() {
    let saturday: NaiveDate = date(2025, 9, 13);
    let table: PeriodTable = create_test_table(4);

    let augmented: Vec<NormalizedLesson> =
        augment_with_free_hours(Vec::new(), Some(&table), &DateRange::single(saturday));

    assert!(augmented.is_empty());
}
