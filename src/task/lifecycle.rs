//! Task lifecycle: validating and applying create and update requests.
//!
//! Callers must already be authorized for the fields they pass in (see
//! [`super::policy`]). This module only checks that values are well formed
//! and computes the complete new document; nothing is written here, so a
//! failed validation leaves the stored task untouched.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::account::{normalize_email, Role};
use crate::store::AccountStore;

use super::error::TaskError;
use super::input::{TaskInput, TaskPatch};
use super::task::{Assignee, Priority, Task, UNASSIGNED};

/// Title must be non-empty after trimming. Stored trimmed.
pub fn validate_title(raw: Option<&str>) -> Result<String, TaskError> {
    match raw.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => Err(TaskError::InvalidTitle),
    }
}

pub fn validate_priority(raw: &str) -> Result<Priority, TaskError> {
    Priority::parse(raw).ok_or_else(|| TaskError::InvalidPriority(raw.to_string()))
}

/// Parse a due date. Empty clears it; full RFC 3339 timestamps keep only the date.
pub fn validate_due_date(raw: &str) -> Result<Option<NaiveDate>, TaskError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| TaskError::InvalidDueDate(raw.to_string()))
}

/// Resolve an assignee. Empty or `"Unassigned"` means nobody; anything else
/// must be the email of an existing employee account.
pub async fn resolve_assignee(
    accounts: &dyn AccountStore,
    raw: Option<&str>,
) -> Result<Assignee, TaskError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() || raw == UNASSIGNED {
        return Ok(Assignee::Unassigned);
    }

    let email = normalize_email(raw);
    let account = accounts
        .find_by_email(&email)
        .await
        .map_err(TaskError::Store)?;
    match account {
        Some(account) if account.role == Role::Employee => Ok(Assignee::Employee(email)),
        _ => Err(TaskError::UnknownAssignee(raw.to_string())),
    }
}

/// Validate a create request and build the new task.
///
/// Defaults: priority Medium, assignee Unassigned, not completed.
pub async fn validate_for_create(
    input: &TaskInput,
    created_by: Uuid,
    accounts: &dyn AccountStore,
    now: DateTime<Utc>,
) -> Result<Task, TaskError> {
    let title = validate_title(input.title.as_deref())?;
    let priority = match input.priority.as_deref() {
        Some(raw) => validate_priority(raw)?,
        None => Priority::default(),
    };
    let due_date = match input.due_date.as_deref() {
        Some(raw) => validate_due_date(raw)?,
        None => None,
    };
    let assigned_to = resolve_assignee(accounts, input.assigned_to.as_deref()).await?;

    Ok(Task {
        id: Uuid::new_v4(),
        created_by,
        assigned_to,
        title,
        description: non_empty(input.description.as_deref()),
        due_date,
        priority,
        completed: false,
        created_at: now,
        updated_at: now,
    })
}

/// Validate a patch against an existing task and return the updated task.
///
/// `updated_at` moves to `now` whenever the patch names any field, even if
/// the new values equal the old ones. An empty patch returns the task as is.
pub async fn validate_for_update(
    existing: &Task,
    patch: &TaskPatch,
    accounts: &dyn AccountStore,
    now: DateTime<Utc>,
) -> Result<Task, TaskError> {
    let mut task = existing.clone();
    if patch.is_empty() {
        return Ok(task);
    }

    if let Some(title) = &patch.title {
        task.title = validate_title(Some(title))?;
    }
    if let Some(priority) = &patch.priority {
        task.priority = validate_priority(priority)?;
    }
    if let Some(due_date) = &patch.due_date {
        task.due_date = match due_date.as_deref() {
            Some(raw) => validate_due_date(raw)?,
            None => None,
        };
    }
    if let Some(assignee) = &patch.assigned_to {
        task.assigned_to = resolve_assignee(accounts, Some(assignee)).await?;
    }
    if let Some(description) = &patch.description {
        task.description = non_empty(description.as_deref());
    }
    if let Some(completed) = patch.completed {
        task.completed = completed;
    }

    task.updated_at = now;
    Ok(task)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
