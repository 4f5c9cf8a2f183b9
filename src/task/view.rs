//! Capability view model for clients.
//!
//! Clients decide which controls to render from these flags instead of
//! branching on role names, so the rules live only in [`super::policy`].

use serde::Serialize;

use crate::account::Actor;

use super::input::{FieldSet, TaskField};
use super::policy::{decide, Action};
use super::task::Task;

/// What an actor may do in general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_create_tasks: bool,
    pub can_delete_tasks: bool,
    pub can_edit_task_details: bool,
    pub can_list_employees: bool,
}

impl Capabilities {
    pub fn for_actor(actor: &Actor) -> Self {
        Self {
            can_create_tasks: decide(actor, Action::CreateTask).is_allowed(),
            can_delete_tasks: decide(actor, Action::DeleteTask).is_allowed(),
            // Managers may edit every task, so role alone decides this flag.
            can_edit_task_details: actor.is_manager(),
            can_list_employees: decide(actor, Action::ListEmployees).is_allowed(),
        }
    }
}

/// A task plus what the viewing actor may do with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub task: Task,
    pub can_edit: bool,
    pub can_toggle_completion: bool,
    pub can_delete: bool,
}

impl TaskView {
    pub fn new(actor: &Actor, task: Task) -> Self {
        let details = TaskField::details();
        let completion: FieldSet = [TaskField::Completed].into_iter().collect();
        let can_edit = decide(
            actor,
            Action::UpdateTask {
                task: &task,
                fields: &details,
                unknown: &[],
            },
        )
        .is_allowed();
        let can_toggle_completion = decide(
            actor,
            Action::UpdateTask {
                task: &task,
                fields: &completion,
                unknown: &[],
            },
        )
        .is_allowed();
        let can_delete = decide(actor, Action::DeleteTask).is_allowed();

        Self {
            task,
            can_edit,
            can_toggle_completion,
            can_delete,
        }
    }
}
