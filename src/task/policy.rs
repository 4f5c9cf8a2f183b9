//! Authorization policy.
//!
//! A pure decision function over (actor, action). It never touches a store
//! and never logs; callers turn a denial into a [`TaskError`].
//!
//! Rules, in order:
//! 1. Only managers create tasks.
//! 2. Managers list every task; employees list the tasks assigned to them.
//! 3. Only managers list employees.
//! 4. Managers update any field of any task. Employees update only tasks
//!    assigned to them, and only `completed`; a request naming any other
//!    key, including keys that are not task fields at all, is refused in full.
//! 5. Only managers delete tasks.
//!
//! An actor with an unrecognised role is refused everything.

use crate::account::{Actor, Role};
use crate::store::TaskFilter;

use super::error::TaskError;
use super::input::{FieldSet, TaskField};
use super::task::Task;

pub const CREATE_DENIED: &str = "not authorized to create tasks";
pub const UPDATE_DENIED: &str = "not authorized to update this task";
pub const DELETE_DENIED: &str = "only managers can delete tasks";
pub const LIST_EMPLOYEES_DENIED: &str = "only managers can view employees";
pub const UNKNOWN_ROLE_DENIED: &str = "unrecognised role";

/// An operation an actor wants to perform.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    CreateTask,
    ListTasks,
    ListEmployees,
    /// `unknown` holds request keys that name no mutable field.
    UpdateTask {
        task: &'a Task,
        fields: &'a FieldSet,
        unknown: &'a [String],
    },
    DeleteTask,
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Wrong role, or not the task's assignee.
    Unauthorized(&'static str),
    /// Employee named a key other than `completed`.
    FieldRestriction,
}

impl Denial {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized(reason) => reason,
            Self::FieldRestriction => "employees may only update completion status",
        }
    }
}

impl From<Denial> for TaskError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthorized(reason) => TaskError::Unauthorized(reason.to_string()),
            Denial::FieldRestriction => TaskError::FieldRestrictionViolation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Allowed. `fields` is the subset of the requested fields the actor may
    /// change (empty for actions that do not touch fields).
    Allow { fields: FieldSet },
    Deny(Denial),
}

impl Decision {
    fn allow() -> Self {
        Self::Allow {
            fields: FieldSet::new(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    pub fn allowed_fields(&self) -> Option<&FieldSet> {
        match self {
            Self::Allow { fields } => Some(fields),
            Self::Deny(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Allow { .. } => None,
            Self::Deny(denial) => Some(denial.reason()),
        }
    }

    pub fn into_result(self) -> Result<FieldSet, TaskError> {
        match self {
            Self::Allow { fields } => Ok(fields),
            Self::Deny(denial) => Err(denial.into()),
        }
    }
}

/// Decide whether `actor` may perform `action`.
pub fn decide(actor: &Actor, action: Action<'_>) -> Decision {
    match (actor.role, action) {
        (Role::Unknown, _) => Decision::Deny(Denial::Unauthorized(UNKNOWN_ROLE_DENIED)),

        (Role::Manager, Action::CreateTask) => Decision::allow(),
        (_, Action::CreateTask) => Decision::Deny(Denial::Unauthorized(CREATE_DENIED)),

        // Employees get a narrowed view rather than a denial; see `visibility`.
        (_, Action::ListTasks) => Decision::allow(),

        (Role::Manager, Action::ListEmployees) => Decision::allow(),
        (_, Action::ListEmployees) => Decision::Deny(Denial::Unauthorized(LIST_EMPLOYEES_DENIED)),

        (Role::Manager, Action::UpdateTask { fields, .. }) => Decision::Allow {
            fields: fields.clone(),
        },
        (
            Role::Employee,
            Action::UpdateTask {
                task,
                fields,
                unknown,
            },
        ) => {
            if !task.assigned_to.is(&actor.email) {
                return Decision::Deny(Denial::Unauthorized(UPDATE_DENIED));
            }
            if !unknown.is_empty() || fields.iter().any(|f| *f != TaskField::Completed) {
                return Decision::Deny(Denial::FieldRestriction);
            }
            Decision::Allow {
                fields: fields.clone(),
            }
        }

        (Role::Manager, Action::DeleteTask) => Decision::allow(),
        (_, Action::DeleteTask) => Decision::Deny(Denial::Unauthorized(DELETE_DENIED)),
    }
}

/// Which tasks an actor may see when listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    All,
    AssignedTo(String),
}

impl Visibility {
    /// Store filter implementing this visibility.
    pub fn filter(&self) -> TaskFilter {
        match self {
            Self::All => TaskFilter::all(),
            Self::AssignedTo(email) => TaskFilter::assigned_to(email),
        }
    }
}

/// Listing visibility for `actor`.
pub fn visibility(actor: &Actor) -> Result<Visibility, TaskError> {
    decide(actor, Action::ListTasks).into_result()?;
    match actor.role {
        Role::Manager => Ok(Visibility::All),
        _ => Ok(Visibility::AssignedTo(actor.email.clone())),
    }
}
