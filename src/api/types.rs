//! API request/response types.

use serde::{Deserialize, Serialize};

use crate::account::AccountSummary;
use crate::task::{Capabilities, TaskSummary, TaskView};

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Whether the server is running in dev mode
    pub dev_mode: bool,

    /// Active storage backend
    pub store: String,

    /// Whether data survives a restart
    pub persistent: bool,
}

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login/registration response containing a JWT for API authentication.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Expiration as unix seconds.
    pub exp: i64,
    pub user: AccountSummary,
}

/// The authenticated account and what it may do.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: AccountSummary,
    pub capabilities: Capabilities,
}

/// Task list with per-task capabilities and dashboard counters.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskView>,
    /// Counters over the actor's full visible list, before search/status filters.
    pub summary: TaskSummary,
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub message: String,
    pub task: TaskView,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Employee entry in `GET /api/users`.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeEntry {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<AccountSummary> for EmployeeEntry {
    fn from(summary: AccountSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name,
            email: summary.email,
        }
    }
}

impl TaskResponse {
    pub fn new(message: &str, task: TaskView) -> Self {
        Self {
            message: message.to_string(),
            task,
        }
    }
}
