//! Errors returned by task operations.

use serde::Serialize;
use thiserror::Error;

/// Machine-distinguishable error kind, stable across message wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Unauthorized,
    InvalidTitle,
    InvalidPriority,
    UnknownAssignee,
    InvalidDueDate,
    InvalidField,
    UnknownField,
    NotFound,
    FieldRestrictionViolation,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::InvalidTitle => "InvalidTitle",
            Self::InvalidPriority => "InvalidPriority",
            Self::UnknownAssignee => "UnknownAssignee",
            Self::InvalidDueDate => "InvalidDueDate",
            Self::InvalidField => "InvalidField",
            Self::UnknownField => "UnknownField",
            Self::NotFound => "NotFound",
            Self::FieldRestrictionViolation => "FieldRestrictionViolation",
            Self::Store => "Store",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Actor lacks the role or assignment the operation needs.
    #[error("{0}")]
    Unauthorized(String),

    #[error("Title is required and must be a non-empty string")]
    InvalidTitle,

    #[error("Priority must be High, Medium, or Low (got {0:?})")]
    InvalidPriority(String),

    #[error("Assigned user must be a valid employee or Unassigned (got {0:?})")]
    UnknownAssignee(String),

    #[error("Due date must be a YYYY-MM-DD date (got {0:?})")]
    InvalidDueDate(String),

    #[error("Field `{field}` must be {expected}")]
    InvalidField { field: String, expected: &'static str },

    #[error("Field `{0}` cannot be set on a task")]
    UnknownField(String),

    #[error("Task {0} not found")]
    NotFound(String),

    #[error("employees may only update completion status")]
    FieldRestrictionViolation,

    #[error("Task store error: {0}")]
    Store(String),
}

impl TaskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::InvalidTitle => ErrorKind::InvalidTitle,
            Self::InvalidPriority(_) => ErrorKind::InvalidPriority,
            Self::UnknownAssignee(_) => ErrorKind::UnknownAssignee,
            Self::InvalidDueDate(_) => ErrorKind::InvalidDueDate,
            Self::InvalidField { .. } => ErrorKind::InvalidField,
            Self::UnknownField(_) => ErrorKind::UnknownField,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::FieldRestrictionViolation => ErrorKind::FieldRestrictionViolation,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// True for input validation failures (bad values supplied by the caller).
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidTitle
                | ErrorKind::InvalidPriority
                | ErrorKind::UnknownAssignee
                | ErrorKind::InvalidDueDate
                | ErrorKind::InvalidField
                | ErrorKind::UnknownField
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_as_variant_name() {
        let json = serde_json::to_string(&TaskError::InvalidTitle.kind()).unwrap();
        assert_eq!(json, "\"InvalidTitle\"");
        assert_eq!(
            TaskError::FieldRestrictionViolation.kind().as_str(),
            "FieldRestrictionViolation"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(TaskError::InvalidTitle.is_validation());
        assert!(TaskError::UnknownAssignee("x@y.z".into()).is_validation());
        assert!(!TaskError::Unauthorized("no".into()).is_validation());
        assert!(!TaskError::NotFound("1".into()).is_validation());
        assert!(!TaskError::FieldRestrictionViolation.is_validation());
    }
}
