// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Novelty tracking for homework and grades.
//!
//! A student's first observed payload per category only seeds the seen-set.
//! Later payloads emit one event per key not seen before.

use chrono::NaiveDate;
use schulplan_domain::{GradeItem, HomeworkItem, StudentId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

/// Identity of a homework or grade item, used only for set membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NoveltyKey {
    Homework {
        student_id: StudentId,
        date: NaiveDate,
        subject: String,
        content: String,
    },
    Grade {
        student_id: StudentId,
        subject_id: String,
        value: String,
        date: Option<NaiveDate>,
    },
}

impl NoveltyKey {
    /// Key of a homework item. Surrounding whitespace is ignored.
    #[must_use]
    pub fn homework(student_id: StudentId, item: &HomeworkItem) -> Self {
        Self::Homework {
            student_id,
            date: item.date,
            subject: item.subject.trim().to_string(),
            content: item.content.trim().to_string(),
        }
    }

    /// Key of a grade entry.
    #[must_use]
    pub fn grade(student_id: StudentId, item: &GradeItem) -> Self {
        Self::Grade {
            student_id,
            subject_id: item.subject_id.trim().to_string(),
            value: item.value.trim().to_string(),
            date: item.date,
        }
    }
}

/// A set of keys with optional FIFO eviction.
///
/// With a capacity, inserting beyond it evicts the oldest key. An evicted
/// key counts as unseen again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeenSet {
    order: VecDeque<NoveltyKey>,
    members: HashSet<NoveltyKey>,
    capacity: Option<usize>,
}

impl SeenSet {
    /// Creates an empty set. `None` means unbounded.
    #[must_use]
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            order: VecDeque::new(),
            members: HashSet::new(),
            capacity,
        }
    }

    /// Inserts `key`, returning whether it was not yet present.
    pub fn insert(&mut self, key: NoveltyKey) -> bool {
        if self.members.contains(&key) {
            return false;
        }
        self.members.insert(key.clone());
        self.order.push_back(key);

        if let Some(capacity) = self.capacity {
            while self.order.len() > capacity {
                if let Some(evicted) = self.order.pop_front() {
                    self.members.remove(&evicted);
                }
            }
        }
        true
    }

    #[must_use]
    pub fn contains(&self, key: &NoveltyKey) -> bool {
        self.members.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A homework or grade item not observed in any earlier cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoveltyEvent {
    HomeworkNew {
        student_id: StudentId,
        item: HomeworkItem,
    },
    GradeNew {
        student_id: StudentId,
        item: GradeItem,
    },
}

/// The item categories tracked for novelty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoveltyCategory {
    Homework,
    Grade,
}

/// One student's payload for one category.
#[derive(Debug, Clone, Copy)]
pub enum NoveltyPayload<'a> {
    Homework(StudentId, &'a [HomeworkItem]),
    Grades(StudentId, &'a [GradeItem]),
}

impl NoveltyPayload<'_> {
    const fn scope(&self) -> (StudentId, NoveltyCategory) {
        match self {
            Self::Homework(student_id, _) => (*student_id, NoveltyCategory::Homework),
            Self::Grades(student_id, _) => (*student_id, NoveltyCategory::Grade),
        }
    }

    fn keyed_events(&self) -> Vec<(NoveltyKey, NoveltyEvent)> {
        match self {
            Self::Homework(student_id, items) => items
                .iter()
                .map(|item: &HomeworkItem| {
                    (
                        NoveltyKey::homework(*student_id, item),
                        NoveltyEvent::HomeworkNew {
                            student_id: *student_id,
                            item: item.clone(),
                        },
                    )
                })
                .collect(),
            Self::Grades(student_id, items) => items
                .iter()
                .map(|item: &GradeItem| {
                    (
                        NoveltyKey::grade(*student_id, item),
                        NoveltyEvent::GradeNew {
                            student_id: *student_id,
                            item: item.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Seen-sets for homework and grades across refresh cycles.
///
/// Each student and category owns its own set and capacity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoveltyTracker {
    sets: BTreeMap<(StudentId, NoveltyCategory), SeenSet>,
    capacity: Option<usize>,
}

impl NoveltyTracker {
    /// Creates a tracker whose seen-sets hold at most `capacity` keys each.
    #[must_use]
    pub const fn new(capacity: Option<usize>) -> Self {
        Self {
            sets: BTreeMap::new(),
            capacity,
        }
    }

    fn set_for(&mut self, scope: (StudentId, NoveltyCategory)) -> &mut SeenSet {
        let capacity: Option<usize> = self.capacity;
        self.sets
            .entry(scope)
            .or_insert_with(|| SeenSet::new(capacity))
    }

    /// Number of keys remembered for one student and category.
    #[must_use]
    pub fn remembered(&self, student_id: StudentId, category: NoveltyCategory) -> usize {
        self.sets
            .get(&(student_id, category))
            .map_or(0, SeenSet::len)
    }

    /// Returns whether a payload for this student and category was seen.
    #[must_use]
    pub fn is_seeded(&self, student_id: StudentId, category: NoveltyCategory) -> bool {
        self.sets.contains_key(&(student_id, category))
    }

    /// Adds every key of `payload` without emitting events.
    pub fn seed(&mut self, payload: NoveltyPayload<'_>) {
        let (student_id, category) = payload.scope();
        let set: &mut SeenSet = self.set_for((student_id, category));
        for (key, _) in payload.keyed_events() {
            set.insert(key);
        }
        debug!(student_id = %student_id, ?category, "Seeded novelty keys");
    }

    /// Emits one event per key of `payload` not seen before and records
    /// every key.
    pub fn detect(&mut self, payload: NoveltyPayload<'_>) -> Vec<NoveltyEvent> {
        let set: &mut SeenSet = self.set_for(payload.scope());
        payload
            .keyed_events()
            .into_iter()
            .filter_map(|(key, event)| set.insert(key).then_some(event))
            .collect()
    }

    /// Seeds on the first payload of a student and category, detects after.
    pub fn observe(&mut self, payload: NoveltyPayload<'_>) -> Vec<NoveltyEvent> {
        let (student_id, category) = payload.scope();
        if self.is_seeded(student_id, category) {
            self.detect(payload)
        } else {
            self.seed(payload);
            Vec::new()
        }
    }
}
