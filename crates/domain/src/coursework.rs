// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Homework, grades, exams and letters, with their date windows.

use crate::lesson::Subject;
use crate::views::Window;
use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// How far ahead homework counts as upcoming.
const HOMEWORK_UPCOMING_DAYS: i64 = 7;
/// How far back homework counts as recent.
const HOMEWORK_RECENT_DAYS: i64 = 7;
/// How far ahead exams count as upcoming.
const EXAM_UPCOMING_DAYS: u64 = 30;

/// One homework assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkItem {
    pub subject: String,
    pub content: String,
    /// The day the homework was given for.
    pub date: NaiveDate,
}

/// One grade entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeItem {
    pub subject_id: String,
    pub subject: String,
    pub value: String,
    pub date: Option<NaiveDate>,
}

/// One scheduled exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamItem {
    pub date: NaiveDate,
    pub subject: Subject,
    pub exam_type: String,
    pub type_color: String,
    pub title: String,
    pub period: Option<u8>,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub room: String,
    pub teacher: String,
    pub comment: String,
}

impl ExamItem {
    /// Sort priority by exam type, lower first.
    ///
    /// Written exams rank before tests, which rank before short checks.
    #[must_use]
    pub fn priority(&self) -> u8 {
        let kind: String = self.exam_type.to_lowercase();
        if kind.contains("klassenarbeit") || kind.contains("klausur") {
            1
        } else if kind.contains("test") {
            2
        } else if kind.contains("lernkontrolle") || kind.contains("lk") {
            3
        } else {
            4
        }
    }
}

/// An account-wide notice to parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    pub id: String,
    pub title: String,
    pub date: Option<NaiveDate>,
}

/// A homework item with its distance from today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkEntry {
    #[serde(flatten)]
    pub item: HomeworkItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_ago: Option<i64>,
}

/// Homework grouped by due date relative to today.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HomeworkView {
    pub due_today: Vec<HomeworkItem>,
    pub due_tomorrow: Vec<HomeworkItem>,
    /// Dated before today, oldest first.
    pub overdue: Vec<HomeworkItem>,
    /// Due within the next week, soonest first.
    pub upcoming: Vec<HomeworkEntry>,
    /// Dated within the past week, newest first.
    pub recent: Vec<HomeworkEntry>,
}

impl HomeworkView {
    #[must_use]
    pub fn derive(items: &[HomeworkItem], today: NaiveDate) -> Self {
        let mut view: Self = Self::default();

        for item in items {
            let offset: i64 = (item.date - today).num_days();
            match offset {
                0 => view.due_today.push(item.clone()),
                1 => view.due_tomorrow.push(item.clone()),
                o if o < 0 => view.overdue.push(item.clone()),
                _ => {}
            }
            if offset > 0 && offset <= HOMEWORK_UPCOMING_DAYS {
                view.upcoming.push(HomeworkEntry {
                    item: item.clone(),
                    days_until: Some(offset),
                    days_ago: None,
                });
            }
            if offset <= 0 && -offset <= HOMEWORK_RECENT_DAYS {
                view.recent.push(HomeworkEntry {
                    item: item.clone(),
                    days_until: None,
                    days_ago: Some(-offset),
                });
            }
        }

        view.overdue.sort_by_key(|item: &HomeworkItem| item.date);
        view.upcoming
            .sort_by_key(|entry: &HomeworkEntry| entry.item.date);
        view.recent
            .sort_by_key(|entry: &HomeworkEntry| std::cmp::Reverse(entry.item.date));
        view
    }
}

/// An exam with its distance from today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamEntry {
    #[serde(flatten)]
    pub item: ExamItem,
    pub days_until: i64,
}

/// Exams grouped by calendar window.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExamView {
    pub today: Vec<ExamEntry>,
    pub this_week: Vec<ExamEntry>,
    pub next_week: Vec<ExamEntry>,
    /// From today through the next thirty days.
    pub upcoming: Vec<ExamEntry>,
}

impl ExamView {
    #[must_use]
    pub fn derive(items: &[ExamItem], today: NaiveDate) -> Self {
        let horizon: NaiveDate = today
            .checked_add_days(Days::new(EXAM_UPCOMING_DAYS))
            .unwrap_or(today);

        let mut sorted: Vec<&ExamItem> = items.iter().collect();
        sorted.sort_by_key(|exam: &&ExamItem| (exam.date, exam.priority(), exam.period));

        let collect = |keep: &dyn Fn(NaiveDate) -> bool| -> Vec<ExamEntry> {
            sorted
                .iter()
                .filter(|exam: &&&ExamItem| keep(exam.date))
                .map(|exam: &&ExamItem| ExamEntry {
                    item: (*exam).clone(),
                    days_until: (exam.date - today).num_days(),
                })
                .collect()
        };

        Self {
            today: collect(&|date: NaiveDate| Window::Today.range(today).contains(date)),
            this_week: collect(&|date: NaiveDate| Window::ThisWeek.range(today).contains(date)),
            next_week: collect(&|date: NaiveDate| Window::NextWeek.range(today).contains(date)),
            upcoming: collect(&|date: NaiveDate| today <= date && date <= horizon),
        }
    }
}
