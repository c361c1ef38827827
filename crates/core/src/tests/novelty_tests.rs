// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_grade, create_homework, create_test_student, date};
use crate::{
    NoveltyCategory, NoveltyEvent, NoveltyKey, NoveltyPayload, NoveltyTracker,
};
use schulplan_domain::{GradeItem, HomeworkItem, StudentId};

#[test]
fn test_seed_then_detect_same_payload_is_quiet() {
    let student: StudentId = create_test_student();
    let items: Vec<HomeworkItem> = vec![
        create_homework(date(2025, 9, 10), "Mathe", "S. 12"),
        create_homework(date(2025, 9, 11), "Deutsch", "Gedicht lernen"),
    ];
    let mut tracker: NoveltyTracker = NoveltyTracker::new(None);

    tracker.seed(NoveltyPayload::Homework(student, &items));

    assert!(tracker.detect(NoveltyPayload::Homework(student, &items)).is_empty());
    assert!(tracker.is_seeded(student, NoveltyCategory::Homework));
    assert!(!tracker.is_seeded(student, NoveltyCategory::Grade));
}

#[test]
fn test_new_grade_fires_exactly_once() {
    let student: StudentId = create_test_student();
    let initial: Vec<GradeItem> = vec![create_grade("12", "2", date(2025, 9, 1))];
    let mut tracker: NoveltyTracker = NoveltyTracker::new(None);
    tracker.observe(NoveltyPayload::Grades(student, &initial));

    let mut next: Vec<GradeItem> = initial.clone();
    next.push(create_grade("12", "1-", date(2025, 9, 15)));

    let first: Vec<NoveltyEvent> = tracker.observe(NoveltyPayload::Grades(student, &next));
    let second: Vec<NoveltyEvent> = tracker.observe(NoveltyPayload::Grades(student, &next));

    assert_eq!(first.len(), 1);
    assert!(matches!(&first[0], NoveltyEvent::GradeNew { item, .. } if item.value == "1-"));
    assert!(second.is_empty());
}

#[test]
fn test_duplicates_within_one_payload_fire_once() {
    let student: StudentId = create_test_student();
    let mut tracker: NoveltyTracker = NoveltyTracker::new(None);
    tracker.observe(NoveltyPayload::Homework(student, &[]));

    let item: HomeworkItem = create_homework(date(2025, 9, 12), "Kunst", "Skizze");
    let events: Vec<NoveltyEvent> =
        tracker.observe(NoveltyPayload::Homework(student, &[item.clone(), item]));

    assert_eq!(events.len(), 1);
}

#[test]
fn test_keys_are_stable_and_distinct() {
    let student: StudentId = create_test_student();
    let day = date(2025, 9, 12);

    assert_eq!(
        NoveltyKey::homework(student, &create_homework(day, "Mathe", "S. 12 ")),
        NoveltyKey::homework(student, &create_homework(day, "Mathe", "S. 12"))
    );
    assert_ne!(
        NoveltyKey::homework(student, &create_homework(day, "Mathe", "S. 12 Nr. 1")),
        NoveltyKey::homework(student, &create_homework(day, "Mathe", "S. 12 Nr. 2"))
    );
    assert_ne!(
        NoveltyKey::homework(student, &create_homework(day, "Mathe", "S. 12")),
        NoveltyKey::homework(StudentId::new(1), &create_homework(day, "Mathe", "S. 12"))
    );
}

#[test]
fn test_each_student_is_seeded_separately() {
    let item: HomeworkItem = create_homework(date(2025, 9, 12), "Mathe", "S. 14");
    let mut tracker: NoveltyTracker = NoveltyTracker::new(None);
    tracker.observe(NoveltyPayload::Homework(StudentId::new(1), &[]));
    tracker.observe(NoveltyPayload::Homework(StudentId::new(1), &[item.clone()]));

    // A student first seen later seeds quietly.
    let events: Vec<NoveltyEvent> =
        tracker.observe(NoveltyPayload::Homework(StudentId::new(2), &[item]));

    assert!(events.is_empty());
}

#[test]
fn test_bounded_tracker_forgets_evicted_keys() {
    let student: StudentId = create_test_student();
    let mut tracker: NoveltyTracker = NoveltyTracker::new(Some(1));
    let first: HomeworkItem = create_homework(date(2025, 9, 10), "Mathe", "A");
    let second: HomeworkItem = create_homework(date(2025, 9, 11), "Mathe", "B");
    tracker.seed(NoveltyPayload::Homework(student, &[first.clone()]));

    assert_eq!(tracker.detect(NoveltyPayload::Homework(student, &[second])).len(), 1);
    assert_eq!(tracker.detect(NoveltyPayload::Homework(student, &[first])).len(), 1);
}

#[test]
fn test_each_student_keeps_its_own_bounded_set() {
    let first: StudentId = StudentId::new(1);
    let second: StudentId = StudentId::new(2);
    let first_items: Vec<HomeworkItem> = vec![
        create_homework(date(2025, 9, 10), "Mathe", "S. 12"),
        create_homework(date(2025, 9, 11), "Deutsch", "Aufsatz"),
    ];
    let second_items: Vec<HomeworkItem> = vec![
        create_homework(date(2025, 9, 10), "Physik", "Versuch"),
        create_homework(date(2025, 9, 12), "Chemie", "Tabelle"),
    ];
    let mut tracker: NoveltyTracker = NoveltyTracker::new(Some(2));

    tracker.observe(NoveltyPayload::Homework(first, &first_items));
    tracker.observe(NoveltyPayload::Homework(second, &second_items));

    assert_eq!(tracker.remembered(first, NoveltyCategory::Homework), 2);
    assert_eq!(tracker.remembered(second, NoveltyCategory::Homework), 2);
    assert!(tracker.observe(NoveltyPayload::Homework(first, &first_items)).is_empty());
    assert!(tracker.observe(NoveltyPayload::Homework(second, &second_items)).is_empty());
}
