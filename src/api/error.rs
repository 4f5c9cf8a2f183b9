//! Mapping of domain errors to HTTP responses.
//!
//! Every error body has the shape `{"error": <message>, "kind": <Kind>}`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::account::AccountError;
use crate::task::{ErrorKind, TaskError};

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

/// An error ready to be sent to the client.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthenticated", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            kind: self.kind.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        let kind = err.kind();
        let status = match kind {
            ErrorKind::Unauthorized | ErrorKind::FieldRestrictionViolation => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
            _ if err.is_validation() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Task operation failed: {}", err);
        }
        Self::new(status, kind.as_str(), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "InvalidBody", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), "InvalidQuery", rejection.body_text())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let (status, kind) = match &err {
            AccountError::MissingField => (StatusCode::BAD_REQUEST, "MissingField"),
            AccountError::InvalidRole => (StatusCode::BAD_REQUEST, "InvalidRole"),
            AccountError::InvalidEmail => (StatusCode::BAD_REQUEST, "InvalidEmail"),
            AccountError::WeakPassword => (StatusCode::BAD_REQUEST, "WeakPassword"),
            AccountError::EmailTaken => (StatusCode::CONFLICT, "EmailTaken"),
            AccountError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "InvalidCredentials"),
            AccountError::Hash(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Hash"),
            AccountError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Store"),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Account operation failed: {}", err);
        }
        Self::new(status, kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_status_mapping() {
        let cases = [
            (TaskError::Unauthorized("no".into()), StatusCode::FORBIDDEN),
            (TaskError::FieldRestrictionViolation, StatusCode::FORBIDDEN),
            (TaskError::InvalidTitle, StatusCode::BAD_REQUEST),
            (TaskError::InvalidPriority("x".into()), StatusCode::BAD_REQUEST),
            (TaskError::UnknownAssignee("x".into()), StatusCode::BAD_REQUEST),
            (TaskError::InvalidDueDate("x".into()), StatusCode::BAD_REQUEST),
            (TaskError::UnknownField("id".into()), StatusCode::BAD_REQUEST),
            (TaskError::NotFound("1".into()), StatusCode::NOT_FOUND),
            (TaskError::Store("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let kind = err.kind().as_str();
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.kind, kind);
        }
    }

    #[test]
    fn test_account_error_status_mapping() {
        assert_eq!(
            ApiError::from(AccountError::EmailTaken).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AccountError::InvalidCredentials).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AccountError::WeakPassword).status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_response_status() {
        let response = ApiError::from(TaskError::FieldRestrictionViolation).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
