//! Core Task type.
//!
//! # Invariants
//! - `title` is non-empty after trimming
//! - `id`, `created_by` and `created_at` never change after creation
//! - `assigned_to` is either [`Assignee::Unassigned`] or the email of an
//!   employee account (checked by the lifecycle manager, not here)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire value meaning no employee is responsible for a task.
pub const UNASSIGNED: &str = "Unassigned";

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Parse a priority. Matching is exact: `"high"` is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Sort weight; higher is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a task is assigned to.
///
/// Serialized as a plain string: the employee's email, or `"Unassigned"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Assignee {
    #[default]
    Unassigned,
    Employee(String),
}

impl Assignee {
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Unassigned => None,
            Self::Employee(email) => Some(email),
        }
    }

    /// Whether this task is assigned to `email`. Never true for `Unassigned`.
    pub fn is(&self, email: &str) -> bool {
        matches!(self, Self::Employee(e) if e == email)
    }

    pub fn as_str(&self) -> &str {
        self.email().unwrap_or(UNASSIGNED)
    }
}

impl From<String> for Assignee {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == UNASSIGNED {
            Self::Unassigned
        } else {
            Self::Employee(trimmed.to_lowercase())
        }
    }
}

impl From<Assignee> for String {
    fn from(value: Assignee) -> Self {
        match value {
            Assignee::Unassigned => UNASSIGNED.to_string(),
            Assignee::Employee(email) => email,
        }
    }
}

impl std::fmt::Display for Assignee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    /// Account id of the manager who created the task
    pub created_by: Uuid,
    #[serde(default)]
    pub assigned_to: Assignee,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Past its due date and not yet completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.map(|d| d < today).unwrap_or(false)
    }

    /// Case-insensitive substring match on title or description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(needle))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            assigned_to: Assignee::Employee("alice@x.com".to_string()),
            title: "Write report".to_string(),
            description: Some("Quarterly numbers".to_string()),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            priority: Priority::High,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_priority_parse_is_exact() {
        assert_eq!(Priority::parse("High"), Some(Priority::High));
        assert_eq!(Priority::parse("Low"), Some(Priority::Low));
        assert_eq!(Priority::parse("high"), None);
        assert_eq!(Priority::parse("Urgent"), None);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_assignee_from_string() {
        assert_eq!(Assignee::from("Unassigned".to_string()), Assignee::Unassigned);
        assert_eq!(Assignee::from("  ".to_string()), Assignee::Unassigned);
        assert_eq!(
            Assignee::from(" Bob@X.com ".to_string()),
            Assignee::Employee("bob@x.com".to_string())
        );
    }

    #[test]
    fn test_unassigned_matches_nobody() {
        assert!(!Assignee::Unassigned.is("Unassigned"));
        assert!(!Assignee::Unassigned.is(""));
        assert!(Assignee::Employee("a@x.com".into()).is("a@x.com"));
    }

    #[test]
    fn test_task_wire_format() {
        let task = sample();
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["assignedTo"], "alice@x.com");
        assert_eq!(value["priority"], "High");
        assert_eq!(value["dueDate"], "2024-03-01");
        assert_eq!(value["completed"], false);
        assert!(value.get("createdBy").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());

        let mut unassigned = sample();
        unassigned.assigned_to = Assignee::Unassigned;
        unassigned.description = None;
        let value = serde_json::to_value(&unassigned).unwrap();
        assert_eq!(value["assignedTo"], "Unassigned");
        assert!(value.get("description").is_none());

        let back: Task = serde_json::from_value(value).unwrap();
        assert_eq!(back, unassigned);
    }

    #[test]
    fn test_overdue() {
        let mut task = sample();
        let before = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let on = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert!(!task.is_overdue(before));
        assert!(!task.is_overdue(on));
        assert!(task.is_overdue(after));

        task.completed = true;
        assert!(!task.is_overdue(after));

        task.completed = false;
        task.due_date = None;
        assert!(!task.is_overdue(after));
    }

    #[test]
    fn test_matches_text() {
        let task = sample();
        assert!(task.matches_text("report"));
        assert!(task.matches_text("quarterly"));
        assert!(!task.matches_text("invoice"));
    }
}
