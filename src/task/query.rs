//! Filtering, sorting and summarising an already-authorized task list.
//!
//! Everything here is a pure transformation of the slice it is given: it
//! never re-queries a store, so it cannot widen what the actor may see.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::Task;

/// Completion filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Complete,
    Incomplete,
}

impl StatusFilter {
    fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Complete => task.completed,
            Self::Incomplete => !task.completed,
        }
    }
}

/// Sort order for task lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Most recently created first
    #[default]
    CreatedDesc,
    CreatedAsc,
    /// Earliest due date first; tasks without a due date last
    DueAsc,
    /// High, then Medium, then Low
    Priority,
}

/// View options for a task list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort: SortOrder,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        if !self.status.matches(task) {
            return false;
        }
        match self.needle() {
            Some(needle) => task.matches_text(&needle),
            None => true,
        }
    }

    /// Filter and sort a copy of `tasks`. Sorting is stable.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut list: Vec<Task> = tasks.iter().filter(|t| self.matches(t)).cloned().collect();
        match self.sort {
            SortOrder::CreatedDesc => list.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::CreatedAsc => list.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::DueAsc => list.sort_by_key(|t| (t.due_date.is_none(), t.due_date)),
            SortOrder::Priority => list.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        }
        list
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Dashboard counters over a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
    pub overdue: usize,
    /// Rounded to the nearest whole percent; 0 for an empty list.
    pub percent_complete: u8,
}

impl TaskSummary {
    pub fn from_tasks(tasks: &[Task], today: NaiveDate) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
        let percent_complete = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            total,
            completed,
            incomplete: total - completed,
            overdue,
            percent_complete,
        }
    }
}
