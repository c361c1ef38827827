// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use schulplan::CoreError;
use schulplan_domain::DomainError;
use thiserror::Error;

/// Reasons a single portal record is rejected during decoding.
///
/// Rejected records are logged and skipped; they never fail a payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field is absent or empty.
    #[error("Missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A date field could not be parsed.
    #[error("Invalid date '{value}' in field '{field}'")]
    InvalidDate { field: &'static str, value: String },
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The portal could not be reached or answered with an error.
    Upstream {
        /// A description of the upstream failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Upstream { message } => write!(f, "Upstream error: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        let field: &str = match &err {
            DecodeError::MissingField { field } | DecodeError::InvalidDate { field, .. } => *field,
        };
        Self::InvalidInput {
            field: field.to_string(),
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::MissingDate { lesson_id } => ApiError::InvalidInput {
            field: String::from("date"),
            message: lesson_id.map_or_else(
                || String::from("Lesson has no date"),
                |id: String| format!("Lesson '{id}' has no date"),
            ),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
        DomainError::TimeParseError { time_string, error } => ApiError::InvalidInput {
            field: String::from("time"),
            message: format!("Failed to parse time '{time_string}': {error}"),
        },
        DomainError::InvalidDateRange { start, end } => ApiError::InvalidInput {
            field: String::from("date_range"),
            message: format!("Range end {end} is before start {start}"),
        },
        DomainError::UnknownLessonKind(kind) => ApiError::InvalidInput {
            field: String::from("type"),
            message: format!("Unknown lesson kind '{kind}'"),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::InvalidSchedule { source, .. } => translate_domain_error(source),
    }
}
