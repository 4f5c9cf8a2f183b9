//! Task module - the task model, access rules and lifecycle.
//!
//! - [`policy`] decides what an actor may do; it is the only place roles are
//!   interpreted.
//! - [`lifecycle`] validates create and update requests into complete tasks.
//! - [`query`] filters, sorts and summarises lists that were already scoped by
//!   the policy.
//! - [`service`] wires the three together over the stores.
//!
//! Policy, lifecycle and query are pure with respect to logging; errors are
//! returned to the caller.

pub mod task;
mod error;
mod input;
pub mod lifecycle;
pub mod policy;
pub mod query;
pub mod service;
pub mod view;

pub use error::{ErrorKind, TaskError};
pub use input::{FieldSet, PatchKeys, TaskField, TaskInput, TaskPatch};
pub use query::{SortOrder, StatusFilter, TaskQuery, TaskSummary};
pub use service::TaskService;
pub use task::{Assignee, Priority, Task, UNASSIGNED};
pub use view::{Capabilities, TaskView};
