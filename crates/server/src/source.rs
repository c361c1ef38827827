// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Where portal payloads come from.
//!
//! The refresh cycle only sees the [`PayloadSource`] trait. Payloads are
//! decoded into typed records before they leave the source.

use chrono::NaiveDate;
use futures::future::BoxFuture;
use schulplan_api::{
    ApiError, Envelope, ExamDto, GradeDto, HomeworkDto, LessonBatchDto, LessonDto, LetterDto,
    StudentDto, StudentInfo, decode_exams, decode_grades, decode_homework, decode_lesson_batch,
    decode_letters, decode_students,
};
use schulplan_domain::{
    DateRange, ExamItem, GradeItem, HomeworkItem, Letter, RawLessonBatch, StudentId,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Reasons a payload could not be obtained.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed payload in '{path}': {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Portal unavailable: {0}")]
    Unavailable(String),
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        Self::Upstream {
            message: err.to_string(),
        }
    }
}

/// A provider of already-decoded portal payloads.
pub trait PayloadSource: Send + Sync {
    /// The students on the account.
    fn students(&self) -> BoxFuture<'_, Result<Vec<StudentInfo>, SourceError>>;

    /// A student's timetable for `range` with the class-hour table.
    fn lessons(
        &self,
        student_id: StudentId,
        range: DateRange,
    ) -> BoxFuture<'_, Result<RawLessonBatch, SourceError>>;

    fn homework(&self, student_id: StudentId)
    -> BoxFuture<'_, Result<Vec<HomeworkItem>, SourceError>>;

    fn grades(&self, student_id: StudentId) -> BoxFuture<'_, Result<Vec<GradeItem>, SourceError>>;

    /// A student's exams dated within `range`.
    fn exams(
        &self,
        student_id: StudentId,
        range: DateRange,
    ) -> BoxFuture<'_, Result<Vec<ExamItem>, SourceError>>;

    /// Account-wide letters.
    fn letters(&self) -> BoxFuture<'_, Result<Vec<Letter>, SourceError>>;
}

/// Reads portal payloads exported as JSON files.
///
/// Layout under the root directory:
///
/// ```text
/// students.json
/// letters.json
/// <student id>/lessons.json
/// <student id>/homework.json
/// <student id>/grades.json
/// <student id>/exams.json
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn student_file(&self, student_id: StudentId, name: &str) -> PathBuf {
        self.root.join(student_id.to_string()).join(name)
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
        let content: Vec<u8> = tokio::fs::read(path).await.map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "Read payload file");
        serde_json::from_slice(&content).map_err(|source| SourceError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn lesson_in_range(lesson: &LessonDto, range: &DateRange) -> bool {
    let Some(date) = lesson.date.as_deref() else {
        return true;
    };
    let day: &str = date.split('T').next().unwrap_or(date);
    NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").map_or(true, |d: NaiveDate| range.contains(d))
}

impl PayloadSource for FileSource {
    fn students(&self) -> BoxFuture<'_, Result<Vec<StudentInfo>, SourceError>> {
        Box::pin(async move {
            let dtos: Vec<StudentDto> = Self::read_json(&self.root.join("students.json")).await?;
            Ok(decode_students(dtos))
        })
    }

    fn lessons(
        &self,
        student_id: StudentId,
        range: DateRange,
    ) -> BoxFuture<'_, Result<RawLessonBatch, SourceError>> {
        Box::pin(async move {
            let mut dto: LessonBatchDto =
                Self::read_json(&self.student_file(student_id, "lessons.json")).await?;
            // Undated lessons are kept so normalization can report them.
            dto.lessons.retain(|lesson: &LessonDto| lesson_in_range(lesson, &range));
            Ok(decode_lesson_batch(dto))
        })
    }

    fn homework(
        &self,
        student_id: StudentId,
    ) -> BoxFuture<'_, Result<Vec<HomeworkItem>, SourceError>> {
        Box::pin(async move {
            let envelope: Envelope<HomeworkDto> =
                Self::read_json(&self.student_file(student_id, "homework.json")).await?;
            Ok(decode_homework(envelope))
        })
    }

    fn grades(&self, student_id: StudentId) -> BoxFuture<'_, Result<Vec<GradeItem>, SourceError>> {
        Box::pin(async move {
            let envelope: Envelope<GradeDto> =
                Self::read_json(&self.student_file(student_id, "grades.json")).await?;
            Ok(decode_grades(envelope))
        })
    }

    fn exams(
        &self,
        student_id: StudentId,
        range: DateRange,
    ) -> BoxFuture<'_, Result<Vec<ExamItem>, SourceError>> {
        Box::pin(async move {
            let envelope: Envelope<ExamDto> =
                Self::read_json(&self.student_file(student_id, "exams.json")).await?;
            Ok(decode_exams(envelope)
                .into_iter()
                .filter(|exam: &ExamItem| range.contains(exam.date))
                .collect())
        })
    }

    fn letters(&self) -> BoxFuture<'_, Result<Vec<Letter>, SourceError>> {
        Box::pin(async move {
            let envelope: Envelope<LetterDto> =
                Self::read_json(&self.root.join("letters.json")).await?;
            Ok(decode_letters(envelope))
        })
    }
}

#[cfg(test)]
pub mod memory {
    //! An in-memory source for tests.

    use super::{PayloadSource, SourceError};
    use futures::future::BoxFuture;
    use schulplan_api::StudentInfo;
    use schulplan_domain::{
        DateRange, ExamItem, GradeItem, HomeworkItem, Letter, RawLessonBatch, StudentId,
    };
    use std::collections::{BTreeMap, BTreeSet};
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MemoryData {
        pub students: Option<Vec<StudentInfo>>,
        pub lessons: BTreeMap<StudentId, RawLessonBatch>,
        pub homework: BTreeMap<StudentId, Vec<HomeworkItem>>,
        pub grades: BTreeMap<StudentId, Vec<GradeItem>>,
        pub exams: BTreeMap<StudentId, Vec<ExamItem>>,
        pub letters: Vec<Letter>,
        /// Students whose timetable request fails.
        pub failing: BTreeSet<StudentId>,
    }

    #[derive(Debug, Default)]
    pub struct MemorySource {
        pub data: RwLock<MemoryData>,
    }

    fn unavailable() -> SourceError {
        SourceError::Unavailable(String::from("portal did not answer"))
    }

    impl PayloadSource for MemorySource {
        fn students(&self) -> BoxFuture<'_, Result<Vec<StudentInfo>, SourceError>> {
            Box::pin(async move { self.data.read().await.students.clone().ok_or_else(unavailable) })
        }

        fn lessons(
            &self,
            student_id: StudentId,
            _range: DateRange,
        ) -> BoxFuture<'_, Result<RawLessonBatch, SourceError>> {
            Box::pin(async move {
                let data = self.data.read().await;
                if data.failing.contains(&student_id) {
                    return Err(unavailable());
                }
                Ok(data.lessons.get(&student_id).cloned().unwrap_or_default())
            })
        }

        fn homework(
            &self,
            student_id: StudentId,
        ) -> BoxFuture<'_, Result<Vec<HomeworkItem>, SourceError>> {
            Box::pin(async move {
                Ok(self.data.read().await.homework.get(&student_id).cloned().unwrap_or_default())
            })
        }

        fn grades(
            &self,
            student_id: StudentId,
        ) -> BoxFuture<'_, Result<Vec<GradeItem>, SourceError>> {
            Box::pin(async move {
                Ok(self.data.read().await.grades.get(&student_id).cloned().unwrap_or_default())
            })
        }

        fn exams(
            &self,
            student_id: StudentId,
            _range: DateRange,
        ) -> BoxFuture<'_, Result<Vec<ExamItem>, SourceError>> {
            Box::pin(async move {
                Ok(self.data.read().await.exams.get(&student_id).cloned().unwrap_or_default())
            })
        }

        fn letters(&self) -> BoxFuture<'_, Result<Vec<Letter>, SourceError>> {
            Box::pin(async move { Ok(self.data.read().await.letters.clone()) })
        }
    }
}
