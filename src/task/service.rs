//! The task operations exposed to the API layer.
//!
//! Each operation takes the acting [`Actor`] explicitly, asks the policy,
//! validates through the lifecycle manager and only then touches the store.
//! Errors are returned, never logged or retried here.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::account::{AccountSummary, Actor, Role};
use crate::store::{AccountStore, TaskStore};

use super::error::TaskError;
use super::input::{PatchKeys, TaskInput, TaskPatch};
use super::lifecycle;
use super::policy::{self, Action};
use super::task::Task;

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    accounts: Arc<dyn AccountStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { tasks, accounts }
    }

    /// Create a task. Managers only.
    pub async fn create_task(&self, actor: &Actor, input: &TaskInput) -> Result<Task, TaskError> {
        policy::decide(actor, Action::CreateTask).into_result()?;
        let task =
            lifecycle::validate_for_create(input, actor.id, self.accounts.as_ref(), Utc::now())
                .await?;
        self.tasks
            .create_task(&task)
            .await
            .map_err(TaskError::Store)?;
        Ok(task)
    }

    /// Apply a parsed patch to a task.
    ///
    /// The stored task is replaced only after the policy and every value
    /// check have passed.
    pub async fn update_task(
        &self,
        actor: &Actor,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, TaskError> {
        let existing = self.load(id).await?;
        let fields = patch.fields();
        policy::decide(
            actor,
            Action::UpdateTask {
                task: &existing,
                fields: &fields,
                unknown: &[],
            },
        )
        .into_result()?;
        self.apply(id, existing, patch).await
    }

    /// Apply a raw JSON update body to a task.
    ///
    /// The policy rules on the keys the body names before any value is
    /// type-checked.
    pub async fn update_from_json(
        &self,
        actor: &Actor,
        id: &str,
        body: &Value,
    ) -> Result<Task, TaskError> {
        let keys = PatchKeys::from_json(body)?;
        let existing = self.load(id).await?;
        policy::decide(
            actor,
            Action::UpdateTask {
                task: &existing,
                fields: &keys.fields,
                unknown: &keys.unknown,
            },
        )
        .into_result()?;
        let patch = TaskPatch::from_json(body)?;
        self.apply(id, existing, &patch).await
    }

    async fn apply(&self, id: &str, existing: Task, patch: &TaskPatch) -> Result<Task, TaskError> {
        if patch.is_empty() {
            return Ok(existing);
        }

        let updated =
            lifecycle::validate_for_update(&existing, patch, self.accounts.as_ref(), Utc::now())
                .await?;
        let replaced = self
            .tasks
            .replace_task(&updated)
            .await
            .map_err(TaskError::Store)?;
        if !replaced {
            return Err(TaskError::NotFound(id.to_string()));
        }
        Ok(updated)
    }

    /// Delete a task. Managers only.
    pub async fn delete_task(&self, actor: &Actor, id: &str) -> Result<(), TaskError> {
        policy::decide(actor, Action::DeleteTask).into_result()?;
        let uuid = parse_id(id)?;
        let deleted = self
            .tasks
            .delete_task(uuid)
            .await
            .map_err(TaskError::Store)?;
        if deleted == 0 {
            return Err(TaskError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Tasks visible to the actor, newest first.
    pub async fn list_tasks(&self, actor: &Actor) -> Result<Vec<Task>, TaskError> {
        let visibility = policy::visibility(actor)?;
        self.tasks
            .list_tasks(&visibility.filter())
            .await
            .map_err(TaskError::Store)
    }

    /// Employees that tasks can be assigned to. Managers only.
    pub async fn list_employees(&self, actor: &Actor) -> Result<Vec<AccountSummary>, TaskError> {
        policy::decide(actor, Action::ListEmployees).into_result()?;
        let employees = self
            .accounts
            .list_by_role(Role::Employee)
            .await
            .map_err(TaskError::Store)?;
        Ok(employees.iter().map(AccountSummary::from).collect())
    }

    async fn load(&self, id: &str) -> Result<Task, TaskError> {
        let uuid = parse_id(id)?;
        self.tasks
            .get_task(uuid)
            .await
            .map_err(TaskError::Store)?
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }
}

/// Ids that are not UUIDs cannot name a stored task.
fn parse_id(id: &str) -> Result<Uuid, TaskError> {
    Uuid::parse_str(id.trim()).map_err(|_| TaskError::NotFound(id.to_string()))
}
