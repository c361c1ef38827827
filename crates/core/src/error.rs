// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use schulplan_domain::{DomainError, StudentId};

/// Reasons a command cannot advance the cross-cycle state.
///
/// A rejected command leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A schedule batch could not be turned into a snapshot.
    InvalidSchedule {
        student_id: StudentId,
        source: DomainError,
    },
}

impl CoreError {
    /// The student whose command was rejected.
    #[must_use]
    pub const fn student_id(&self) -> StudentId {
        match self {
            Self::InvalidSchedule { student_id, .. } => *student_id,
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSchedule { student_id, source } => {
                write!(f, "Schedule for student {student_id} rejected: {source}")
            }
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSchedule { source, .. } => Some(source),
        }
    }
}
